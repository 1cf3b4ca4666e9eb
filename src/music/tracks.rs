use rand::Rng;

use super::error::ControllerError;

/// Cyclic, non-empty playlist. Indexes are always taken modulo its length.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackList {
    tracks: Vec<String>,
}

impl TrackList {
    pub fn new(tracks: Vec<String>) -> Result<Self, ControllerError> {
        if tracks.is_empty() {
            return Err(ControllerError::EmptyTrackList);
        }
        Ok(Self { tracks })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn get(&self, index: usize) -> &str {
        &self.tracks[index % self.tracks.len()]
    }

    pub fn next(&self, index: usize) -> usize {
        (index % self.tracks.len() + 1) % self.tracks.len()
    }

    pub fn random_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(0..self.tracks.len())
    }
}
