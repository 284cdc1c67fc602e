//! Alert side effects.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{info, warn};

/// Receives threshold alerts.
///
/// `play_cue` is fire-and-forget: it must return promptly and may be called
/// again while a previous cue is still playing.
pub trait AlertSink: Send + Sync {
    fn play_cue(&self, average: f32);
}

/// Logs every alert.
#[derive(Debug, Default)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn play_cue(&self, average: f32) {
        warn!("Proximity alert: ROI average {:.1}", average);
    }
}

/// Counts alerts; handy when no audio device is present.
#[derive(Debug, Default)]
pub struct CountingAlertSink {
    count: AtomicU64,
}

impl CountingAlertSink {
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }
}

impl AlertSink for CountingAlertSink {
    fn play_cue(&self, average: f32) {
        let n = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        info!("Alert #{} (average {:.1})", n, average);
    }
}
