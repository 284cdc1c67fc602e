//! Live toggles and the per-frame snapshot taken from them.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Immutable toggle values captured once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Ask the capture side to fill sensor holes.
    pub filter_enabled: bool,
    /// Process the disparity representation instead of depth.
    pub use_disparity: bool,
    /// Histogram-equalize before display and statistics.
    pub apply_equalization: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            filter_enabled: true,
            use_disparity: true,
            apply_equalization: true,
        }
    }
}

/// Toggle state shared between the UI side and the capture callback.
///
/// Writers flip individual flags; readers take a whole [`FrameConfig`] under
/// the same lock so a frame never sees a half-applied change.
#[derive(Debug, Default)]
pub struct LiveToggles {
    state: Mutex<FrameConfig>,
}

impl LiveToggles {
    pub fn new(initial: FrameConfig) -> Self {
        Self {
            state: Mutex::new(initial),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrameConfig> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Consistent copy of all flags.
    pub fn snapshot(&self) -> FrameConfig {
        *self.lock()
    }

    pub fn set_filter_enabled(&self, enabled: bool) {
        self.lock().filter_enabled = enabled;
        debug!("filter_enabled = {}", enabled);
    }

    pub fn set_use_disparity(&self, enabled: bool) {
        self.lock().use_disparity = enabled;
        debug!("use_disparity = {}", enabled);
    }

    pub fn set_apply_equalization(&self, enabled: bool) {
        self.lock().apply_equalization = enabled;
        debug!("apply_equalization = {}", enabled);
    }

    /// Replace every flag at once.
    pub fn set(&self, config: FrameConfig) {
        *self.lock() = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_snapshot_reflects_setters() {
        let toggles = LiveToggles::default();
        assert_eq!(toggles.snapshot(), FrameConfig::default());

        toggles.set_use_disparity(false);
        toggles.set_apply_equalization(false);
        let snapshot = toggles.snapshot();
        assert!(snapshot.filter_enabled);
        assert!(!snapshot.use_disparity);
        assert!(!snapshot.apply_equalization);
    }

    #[test]
    fn test_snapshot_is_never_half_applied() {
        let on = FrameConfig::default();
        let off = FrameConfig {
            filter_enabled: false,
            use_disparity: false,
            apply_equalization: false,
        };
        let toggles = Arc::new(LiveToggles::new(on));

        let writer = {
            let toggles = toggles.clone();
            thread::spawn(move || {
                for i in 0..2000 {
                    toggles.set(if i % 2 == 0 { off } else { on });
                }
            })
        };
        for _ in 0..2000 {
            let snapshot = toggles.snapshot();
            assert!(snapshot == on || snapshot == off);
        }
        writer.join().unwrap();
    }
}
