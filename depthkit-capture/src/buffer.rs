//! Raw sensor depth buffers with scoped base-address locking.

use std::ops::Deref;
use std::sync::{Mutex, MutexGuard};

use crate::format::PixelFormat;

/// A width × height plane of depth or disparity samples in sensor encoding.
///
/// The backing bytes are only reachable through [`DepthBuffer::lock_base_address`],
/// which hands out exclusive access for the lifetime of the returned guard.
#[derive(Debug)]
pub struct DepthBuffer {
    width: usize,
    height: usize,
    fourcc: u32,
    data: Mutex<Vec<u8>>,
}

impl DepthBuffer {
    /// Wrap raw bytes tagged with an arbitrary format code.
    ///
    /// The tag is not validated here; decoding rejects unknown tags.
    pub fn new(width: usize, height: usize, fourcc: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            fourcc,
            data: Mutex::new(data),
        }
    }

    /// Build a 32-bit buffer from single precision samples.
    pub fn from_f32(width: usize, height: usize, format: PixelFormat, samples: &[f32]) -> Self {
        debug_assert_eq!(format.bytes_per_sample(), 4);
        let bytes = bytemuck::cast_slice::<f32, u8>(samples).to_vec();
        Self::new(width, height, format.fourcc(), bytes)
    }

    /// Build a 16-bit buffer from raw half precision bit patterns.
    pub fn from_f16_bits(width: usize, height: usize, format: PixelFormat, samples: &[u16]) -> Self {
        debug_assert_eq!(format.bytes_per_sample(), 2);
        let bytes = bytemuck::cast_slice::<u16, u8>(samples).to_vec();
        Self::new(width, height, format.fourcc(), bytes)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Raw four-character format tag.
    pub fn fourcc(&self) -> u32 {
        self.fourcc
    }

    /// Acquire exclusive access to the backing memory.
    ///
    /// The lock is released when the guard drops, on every exit path.
    pub fn lock_base_address(&self) -> BaseAddressGuard<'_> {
        let guard = self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        BaseAddressGuard { guard }
    }

    /// Non-blocking variant of [`lock_base_address`](Self::lock_base_address).
    pub fn try_lock_base_address(&self) -> Option<BaseAddressGuard<'_>> {
        match self.data.try_lock() {
            Ok(guard) => Some(BaseAddressGuard { guard }),
            Err(std::sync::TryLockError::Poisoned(poisoned)) => Some(BaseAddressGuard {
                guard: poisoned.into_inner(),
            }),
            Err(std::sync::TryLockError::WouldBlock) => None,
        }
    }
}

impl Clone for DepthBuffer {
    fn clone(&self) -> Self {
        let bytes = self.lock_base_address().to_vec();
        Self::new(self.width, self.height, self.fourcc, bytes)
    }
}

/// Scoped read access to a [`DepthBuffer`]'s bytes.
pub struct BaseAddressGuard<'a> {
    guard: MutexGuard<'a, Vec<u8>>,
}

impl Deref for BaseAddressGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_is_released_when_guard_drops() {
        let buffer = DepthBuffer::from_f32(2, 1, PixelFormat::DepthFloat32, &[1.0, 2.0]);
        {
            let guard = buffer.lock_base_address();
            assert_eq!(guard.len(), 8);
            assert!(buffer.try_lock_base_address().is_none());
        }
        assert!(buffer.try_lock_base_address().is_some());
    }

    #[test]
    fn test_clone_copies_bytes() {
        let buffer = DepthBuffer::from_f16_bits(1, 1, PixelFormat::DepthFloat16, &[0x3c00]);
        let copy = buffer.clone();
        assert_eq!(&*copy.lock_base_address(), &*buffer.lock_base_address());
        assert_eq!(copy.fourcc(), PixelFormat::DEPTH_FLOAT16);
    }
}
