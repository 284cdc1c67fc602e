//! Depth buffer pixel encodings.

use crate::decode::DecodeError;

/// Builds a big-endian four-character code, e.g. `fourcc(b"hdep")`.
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    ((code[0] as u32) << 24) | ((code[1] as u32) << 16) | ((code[2] as u32) << 8) | code[3] as u32
}

/// The four sample encodings a depth-capable sensor can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Half precision distance in meters (`hdep`).
    DepthFloat16,
    /// Half precision disparity (`hdis`).
    DisparityFloat16,
    /// Single precision distance in meters (`fdep`).
    DepthFloat32,
    /// Single precision disparity (`fdis`).
    DisparityFloat32,
}

impl PixelFormat {
    pub const DEPTH_FLOAT16: u32 = fourcc(b"hdep");
    pub const DISPARITY_FLOAT16: u32 = fourcc(b"hdis");
    pub const DEPTH_FLOAT32: u32 = fourcc(b"fdep");
    pub const DISPARITY_FLOAT32: u32 = fourcc(b"fdis");

    /// Resolve a raw format tag.
    ///
    /// There is no generic fallback: any tag outside the four depth encodings
    /// is [`DecodeError::UnsupportedFormat`].
    pub fn from_fourcc(code: u32) -> Result<Self, DecodeError> {
        match code {
            Self::DEPTH_FLOAT16 => Ok(Self::DepthFloat16),
            Self::DISPARITY_FLOAT16 => Ok(Self::DisparityFloat16),
            Self::DEPTH_FLOAT32 => Ok(Self::DepthFloat32),
            Self::DISPARITY_FLOAT32 => Ok(Self::DisparityFloat32),
            other => Err(DecodeError::UnsupportedFormat { fourcc: other }),
        }
    }

    /// The raw format tag for this encoding.
    pub fn fourcc(self) -> u32 {
        match self {
            Self::DepthFloat16 => Self::DEPTH_FLOAT16,
            Self::DisparityFloat16 => Self::DISPARITY_FLOAT16,
            Self::DepthFloat32 => Self::DEPTH_FLOAT32,
            Self::DisparityFloat32 => Self::DISPARITY_FLOAT32,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            Self::DepthFloat16 | Self::DisparityFloat16 => 2,
            Self::DepthFloat32 | Self::DisparityFloat32 => 4,
        }
    }

    pub fn is_disparity(self) -> bool {
        matches!(self, Self::DisparityFloat16 | Self::DisparityFloat32)
    }
}

/// Printable form of a four-character code, falling back to hex.
pub fn fourcc_to_string(code: u32) -> String {
    let bytes = code.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        bytes.iter().map(|&b| b as char).collect()
    } else {
        format!("{code:#010x}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_round_trip_for_known_formats() {
        for format in [
            PixelFormat::DepthFloat16,
            PixelFormat::DisparityFloat16,
            PixelFormat::DepthFloat32,
            PixelFormat::DisparityFloat32,
        ] {
            assert_eq!(PixelFormat::from_fourcc(format.fourcc()).unwrap(), format);
        }
    }

    #[test]
    fn test_unknown_fourcc_is_unsupported() {
        let bgra = fourcc(b"BGRA");
        match PixelFormat::from_fourcc(bgra) {
            Err(DecodeError::UnsupportedFormat { fourcc }) => assert_eq!(fourcc, bgra),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_fourcc_display() {
        assert_eq!(fourcc_to_string(PixelFormat::DEPTH_FLOAT32), "fdep");
        assert_eq!(fourcc_to_string(0x0000_0001), "0x00000001");
    }
}
