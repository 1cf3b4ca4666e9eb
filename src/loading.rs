//! Decides when the loading overlay may go away and the background music may start.

/// Readiness flags for the loading overlay. A video the page does not have
/// counts as ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingGate {
    page_loaded: bool,
    hero_ready: bool,
    expanding_ready: bool,
    finished: bool,
}

impl LoadingGate {
    pub fn new(has_hero: bool, has_expanding: bool) -> Self {
        Self {
            page_loaded: false,
            hero_ready: !has_hero,
            expanding_ready: !has_expanding,
            finished: false,
        }
    }

    pub fn mark_page_loaded(&mut self) {
        self.page_loaded = true;
    }

    pub fn mark_hero_ready(&mut self) {
        self.hero_ready = true;
    }

    pub fn mark_expanding_ready(&mut self) {
        self.expanding_ready = true;
    }

    pub fn videos_ready(&self) -> bool {
        self.hero_ready && self.expanding_ready
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Periodic check. Returns `true` exactly once, when the page and its
    /// videos are ready.
    pub fn poll(&mut self) -> bool {
        if self.finished || !(self.page_loaded && self.videos_ready()) {
            return false;
        }
        self.finished = true;
        true
    }

    /// Gives up waiting. Returns `true` unless the gate already finished.
    pub fn fallback(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waits_for_page_and_both_videos() {
        let mut gate = LoadingGate::new(true, true);
        gate.mark_page_loaded();
        assert!(!gate.poll());
        gate.mark_hero_ready();
        assert!(!gate.poll());
        gate.mark_expanding_ready();
        assert!(gate.poll());
        assert!(gate.is_finished());
    }

    #[test]
    fn missing_videos_count_as_ready() {
        let mut gate = LoadingGate::new(false, false);
        assert!(gate.videos_ready());
        assert!(!gate.poll());
        gate.mark_page_loaded();
        assert!(gate.poll());
    }

    #[test]
    fn finishes_only_once() {
        let mut gate = LoadingGate::new(false, false);
        gate.mark_page_loaded();
        assert!(gate.poll());
        assert!(!gate.poll());
        assert!(!gate.fallback());
    }

    #[test]
    fn fallback_ends_a_stuck_load() {
        let mut gate = LoadingGate::new(true, false);
        gate.mark_page_loaded();
        assert!(!gate.poll());
        assert!(gate.fallback());
        assert!(!gate.poll());
    }
}
