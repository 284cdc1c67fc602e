//! Conversion of sensor depth buffers to uniform `f32` samples.

use thiserror::Error;
use tracing::trace;

use crate::buffer::DepthBuffer;
use crate::format::{PixelFormat, fourcc_to_string};

/// Errors that can occur while decoding a depth buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Unsupported pixel format: {}", format_name(.fourcc))]
    UnsupportedFormat { fourcc: u32 },

    #[error("Buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

fn format_name(code: &u32) -> String {
    fourcc_to_string(*code)
}

/// Decode a depth buffer into row-major `f32` samples.
///
/// Half precision encodings are widened exactly; single precision encodings
/// are copied as-is. The buffer stays locked for the whole decode.
#[tracing::instrument(level = "trace", skip_all, fields(width = buffer.width(), height = buffer.height()))]
pub fn decode(buffer: &DepthBuffer) -> Result<Vec<f32>, DecodeError> {
    let format = PixelFormat::from_fourcc(buffer.fourcc())?;
    let (width, height) = buffer.dimensions();
    let count = width * height;
    let expected = count * format.bytes_per_sample();

    let bytes = buffer.lock_base_address();
    if bytes.len() != expected {
        return Err(DecodeError::SizeMismatch {
            width,
            height,
            expected,
            actual: bytes.len(),
        });
    }

    let samples = match format {
        PixelFormat::DepthFloat16 | PixelFormat::DisparityFloat16 => {
            let halves: Vec<u16> = bytemuck::pod_collect_to_vec(&bytes[..]);
            halves.into_iter().map(f16_to_f32).collect()
        }
        PixelFormat::DepthFloat32 | PixelFormat::DisparityFloat32 => {
            bytemuck::pod_collect_to_vec::<u8, f32>(&bytes[..])
        }
    };
    drop(bytes);

    trace!("Decoded {} samples as {:?}", samples.len(), format);
    Ok(samples)
}

/// Widen an IEEE-754 binary16 bit pattern to `f32` without loss.
pub fn f16_to_f32(bits: u16) -> f32 {
    let sign = ((bits & 0x8000) as u32) << 16;
    let exponent = ((bits >> 10) & 0x1f) as u32;
    let mantissa = (bits & 0x03ff) as u32;

    let out = match (exponent, mantissa) {
        (0, 0) => sign,
        (0, m) => {
            // Subnormal half: renormalise so the leading one lands on bit 10.
            let shift = m.leading_zeros() - 21;
            sign | ((113 - shift) << 23) | (((m << shift) & 0x03ff) << 13)
        }
        (0x1f, 0) => sign | 0x7f80_0000,
        (0x1f, m) => sign | 0x7f80_0000 | (m << 13),
        (e, m) => sign | ((e + 112) << 23) | (m << 13),
    };
    f32::from_bits(out)
}

/// Narrow an `f32` to binary16 bits, rounding to nearest even.
pub fn f32_to_f16(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exponent = ((bits >> 23) & 0xff) as i32;
    let mantissa = bits & 0x007f_ffff;

    if exponent == 0xff {
        let nan = if mantissa != 0 { 0x0200 } else { 0 };
        return sign | 0x7c00 | nan;
    }

    let half_exponent = exponent - 127 + 15;
    if half_exponent >= 0x1f {
        return sign | 0x7c00;
    }

    if half_exponent <= 0 {
        if half_exponent < -10 {
            return sign;
        }
        let m = mantissa | 0x0080_0000;
        let shift = (14 - half_exponent) as u32;
        let truncated = m >> shift;
        let remainder = m & ((1 << shift) - 1);
        let halfway = 1 << (shift - 1);
        let rounded = if remainder > halfway || (remainder == halfway && truncated & 1 == 1) {
            truncated + 1
        } else {
            truncated
        };
        return sign | rounded as u16;
    }

    let truncated = mantissa >> 13;
    let remainder = mantissa & 0x1fff;
    let mut out = ((half_exponent as u32) << 10) | truncated;
    // A carry out of the mantissa correctly bumps the exponent.
    if remainder > 0x1000 || (remainder == 0x1000 && truncated & 1 == 1) {
        out += 1;
    }
    sign | out as u16
}
