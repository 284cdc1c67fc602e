//! Single-slot, last-value-wins image handoff to the render side.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use image::GrayImage;

/// A processed image as handed to the renderer.
#[derive(Debug)]
pub struct PublishedImage {
    pub image: GrayImage,
    /// Increases by one with every publish.
    pub generation: u64,
    /// Capture timestamp of the frame the image came from.
    pub timestamp: f64,
}

/// Holds the most recently published image.
///
/// Publishing replaces the previous value; it is never queued. Readers get
/// an `Arc` to a complete image, so a publish can never be observed half
/// written. The renderer owns its `Arc` until it asks for the next one.
#[derive(Debug, Default)]
pub struct LatestImage {
    current: Mutex<Option<Arc<PublishedImage>>>,
    generation: AtomicU64,
}

impl LatestImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current image. Returns its generation.
    pub fn publish(&self, image: GrayImage, timestamp: f64) -> u64 {
        let mut current = self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *current = Some(Arc::new(PublishedImage {
            image,
            generation,
            timestamp,
        }));
        generation
    }

    /// The latest image, if anything has been published.
    pub fn latest(&self) -> Option<Arc<PublishedImage>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// The latest image only if it is newer than `seen`.
    pub fn newer_than(&self, seen: u64) -> Option<Arc<PublishedImage>> {
        self.latest().filter(|image| image.generation > seen)
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
