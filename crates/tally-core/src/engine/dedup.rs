//! Time-window de-duplication of repeated reads.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Suppresses repeat reads of the same payload within a forget window.
///
/// A payload is reported the first time it is seen, then suppressed for as long as
/// it keeps being seen with gaps shorter than the window. Every sighting, reported or
/// not, restarts that payload's window; a barcode held in front of the camera is
/// therefore counted once.
#[derive(Debug)]
pub struct DuplicateFilter {
    window: Duration,
    last_seen: HashMap<String, Instant>,
}

impl DuplicateFilter {
    /// Creates a filter. A zero window disables suppression.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a sighting at the current instant. Returns `true` if it is unique.
    pub fn observe(&mut self, code: &str) -> bool {
        self.observe_at(code, Instant::now())
    }

    /// Records a sighting at `now`. Returns `true` if it is unique.
    pub fn observe_at(&mut self, code: &str, now: Instant) -> bool {
        if self.window.is_zero() {
            return true;
        }

        let unique = match self.last_seen.get(code) {
            Some(previous) => now.saturating_duration_since(*previous) >= self.window,
            None => true,
        };
        self.last_seen.insert(code.to_string(), now);

        if self.last_seen.len() > 256 {
            self.forget_expired(now);
        }

        unique
    }

    /// Drops entries whose window has elapsed.
    pub fn forget_expired(&mut self, now: Instant) {
        let window = self.window;
        self.last_seen
            .retain(|_, seen| now.saturating_duration_since(*seen) < window);
    }

    pub fn clear(&mut self) {
        self.last_seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(2000);

    #[test]
    fn test_first_sighting_is_unique() {
        let mut filter = DuplicateFilter::new(WINDOW);
        let t0 = Instant::now();
        assert!(filter.observe_at("A", t0));
        assert!(filter.observe_at("B", t0));
    }

    #[test]
    fn test_repeat_inside_window_is_suppressed() {
        let mut filter = DuplicateFilter::new(WINDOW);
        let t0 = Instant::now();
        assert!(filter.observe_at("A", t0));
        assert!(!filter.observe_at("A", t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_repeat_after_window_is_unique() {
        let mut filter = DuplicateFilter::new(WINDOW);
        let t0 = Instant::now();
        assert!(filter.observe_at("A", t0));
        assert!(filter.observe_at("A", t0 + WINDOW));
    }

    #[test]
    fn test_continuous_sightings_extend_window() {
        let mut filter = DuplicateFilter::new(WINDOW);
        let t0 = Instant::now();
        assert!(filter.observe_at("A", t0));
        assert!(!filter.observe_at("A", t0 + Duration::from_millis(1500)));
        // 3s after the first read, but only 1.5s after the last one.
        assert!(!filter.observe_at("A", t0 + Duration::from_millis(3000)));
    }

    #[test]
    fn test_zero_window_reports_everything() {
        let mut filter = DuplicateFilter::new(Duration::ZERO);
        let t0 = Instant::now();
        assert!(filter.observe_at("A", t0));
        assert!(filter.observe_at("A", t0));
    }

    #[test]
    fn test_forget_expired() {
        let mut filter = DuplicateFilter::new(WINDOW);
        let t0 = Instant::now();
        filter.observe_at("A", t0);
        filter.observe_at("B", t0 + Duration::from_millis(1900));
        filter.forget_expired(t0 + Duration::from_millis(2500));
        assert!(filter.observe_at("A", t0 + Duration::from_millis(2500)));
        assert!(!filter.observe_at("B", t0 + Duration::from_millis(2500)));
    }
}
