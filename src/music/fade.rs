//! Stepped linear volume ramps.
//!
//! A ramp knows nothing about timers. Whoever drives it calls [`FadeRamp::advance`]
//! once per tick and applies the returned volume.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeSettings {
    pub duration: Duration,
    pub tick: Duration,
}

impl FadeSettings {
    pub fn new(duration: Duration, tick: Duration) -> Self {
        Self { duration, tick }
    }

    /// Number of ticks until the ramp lands on its target.
    pub fn steps(&self) -> u64 {
        let tick = self.tick.as_millis() as u64;
        if tick == 0 {
            return 0;
        }
        let duration = self.duration.as_millis() as u64;
        duration.div_ceil(tick)
    }
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_millis(50))
    }
}

/// Identifies one fade timer. A tick carrying any ticket but the live one is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FadeTicket(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeStep {
    Continue(f64),
    Done(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FadeRamp {
    start: f64,
    target: f64,
    increment: f64,
    elapsed_ms: u64,
    duration_ms: u64,
    tick_ms: u64,
}

impl FadeRamp {
    pub fn new(start: f64, target: f64, settings: FadeSettings) -> Self {
        let duration_ms = settings.duration.as_millis() as u64;
        let tick_ms = settings.tick.as_millis() as u64;
        let increment = if duration_ms == 0 || tick_ms == 0 {
            target - start
        } else {
            (target - start) / (duration_ms as f64 / tick_ms as f64)
        };
        Self {
            start,
            target,
            increment,
            elapsed_ms: 0,
            duration_ms,
            tick_ms,
        }
    }

    pub fn is_instant(&self) -> bool {
        self.duration_ms == 0 || self.tick_ms == 0
    }

    pub fn advance(&mut self) -> FadeStep {
        self.elapsed_ms = self.elapsed_ms.saturating_add(self.tick_ms);
        if self.is_instant() || self.elapsed_ms >= self.duration_ms {
            return FadeStep::Done(self.target);
        }

        let ticks = (self.elapsed_ms / self.tick_ms) as f64;
        let raw = self.start + self.increment * ticks;
        let volume = if self.target >= self.start {
            raw.min(self.target)
        } else {
            raw.max(self.target)
        };
        FadeStep::Continue(volume.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(ramp: &mut FadeRamp) -> (Vec<f64>, f64) {
        let mut seen = Vec::new();
        loop {
            match ramp.advance() {
                FadeStep::Continue(v) => seen.push(v),
                FadeStep::Done(v) => return (seen, v),
            }
        }
    }

    #[test]
    fn fade_in_takes_ten_ticks_at_default_settings() {
        let mut ramp = FadeRamp::new(0.0, 0.5, FadeSettings::default());
        let (steps, last) = run(&mut ramp);
        assert_eq!(steps.len(), 9);
        assert_eq!(last, 0.5);
        assert!((steps[4] - 0.25).abs() < 1e-9);
        assert!(steps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn fade_out_descends_and_snaps_to_zero() {
        let mut ramp = FadeRamp::new(0.5, 0.0, FadeSettings::default());
        let (steps, last) = run(&mut ramp);
        assert_eq!(last, 0.0);
        assert!(steps.windows(2).all(|w| w[0] > w[1]));
        assert!(steps.iter().all(|v| *v > 0.0 && *v < 0.5));
    }

    #[test]
    fn partial_start_volume_ramps_from_where_it_is() {
        let mut ramp = FadeRamp::new(0.2, 0.0, FadeSettings::default());
        match ramp.advance() {
            FadeStep::Continue(v) => assert!((v - 0.18).abs() < 1e-9),
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn uneven_duration_rounds_step_count_up() {
        let settings = FadeSettings::new(Duration::from_millis(500), Duration::from_millis(30));
        assert_eq!(settings.steps(), 17);
        let mut ramp = FadeRamp::new(0.0, 1.0, settings);
        let (steps, last) = run(&mut ramp);
        assert_eq!(steps.len() as u64 + 1, settings.steps());
        assert_eq!(last, 1.0);
    }

    #[test]
    fn zero_duration_is_instant() {
        let settings = FadeSettings::new(Duration::ZERO, Duration::from_millis(50));
        let mut ramp = FadeRamp::new(0.0, 0.5, settings);
        assert!(ramp.is_instant());
        assert_eq!(ramp.advance(), FadeStep::Done(0.5));
    }
}
