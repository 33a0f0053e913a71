//! Best score tracking
//!
//! A single integer persisted to LocalStorage under a fixed key.

/// Best score across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScore {
    pub best: u64,
}

impl HighScore {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "rr_hi";

    pub fn new(best: u64) -> Self {
        Self { best }
    }

    /// Record a finished session. Returns true only if `score` strictly beats the best.
    pub fn submit(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Parse a stored value; anything unreadable counts as zero
    pub fn parse(raw: Option<&str>) -> Self {
        let best = raw
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0);
        Self { best }
    }

    /// Load the best score from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let raw = crate::platform::storage::get_item(Self::STORAGE_KEY);
        let score = Self::parse(raw.as_deref());
        log::info!("Loaded best score: {}", score.best);
        score
    }

    /// Save the best score to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        if crate::platform::storage::set_item(Self::STORAGE_KEY, &self.best.to_string()) {
            log::info!("Best score saved ({})", self.best);
        } else {
            log::warn!("Could not persist best score");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_requires_strictly_greater() {
        let mut hs = HighScore::new(100);
        assert!(!hs.submit(50));
        assert!(!hs.submit(100));
        assert_eq!(hs.best, 100);
        assert!(hs.submit(101));
        assert_eq!(hs.best, 101);
    }

    #[test]
    fn test_zero_never_qualifies() {
        let mut hs = HighScore::default();
        assert!(!hs.submit(0));
    }

    #[test]
    fn test_parse_defaults_to_zero() {
        assert_eq!(HighScore::parse(None).best, 0);
        assert_eq!(HighScore::parse(Some("garbage")).best, 0);
        assert_eq!(HighScore::parse(Some("-5")).best, 0);
        assert_eq!(HighScore::parse(Some(" 420 ")).best, 420);
    }
}
