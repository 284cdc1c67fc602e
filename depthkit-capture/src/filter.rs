//! Sensor-side depth filtering.

/// A sample the sensor could not measure.
#[inline]
pub fn is_hole(sample: f32) -> bool {
    !sample.is_finite() || sample <= 0.0
}

/// Fill holes from the nearest valid sample on the same row.
///
/// Holes at the start of a row take the first valid sample to their right.
/// Rows without any valid sample are left untouched. Returns the number of
/// samples that were filled.
pub fn fill_holes(samples: &mut [f32], width: usize) -> usize {
    if width == 0 {
        return 0;
    }

    let mut filled = 0;
    for row in samples.chunks_mut(width) {
        let Some(first_valid) = row.iter().copied().find(|s| !is_hole(*s)) else {
            continue;
        };

        let mut last_valid = first_valid;
        for sample in row.iter_mut() {
            if is_hole(*sample) {
                *sample = last_valid;
                filled += 1;
            } else {
                last_valid = *sample;
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_holes_from_left_neighbour() {
        let mut samples = vec![1.0, f32::NAN, 0.0, 2.0, 3.0, -1.0];
        let filled = fill_holes(&mut samples, 3);
        assert_eq!(filled, 3);
        assert_eq!(samples, vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_leading_holes_take_first_valid() {
        let mut samples = vec![f32::INFINITY, f32::NAN, 4.0, 5.0];
        fill_holes(&mut samples, 4);
        assert_eq!(samples, vec![4.0, 4.0, 4.0, 5.0]);
    }

    #[test]
    fn test_rows_without_valid_samples_are_untouched() {
        let mut samples = vec![0.0, 0.0, 1.0, 2.0];
        let filled = fill_holes(&mut samples, 2);
        assert_eq!(filled, 0);
        assert_eq!(samples, vec![0.0, 0.0, 1.0, 2.0]);
    }
}
