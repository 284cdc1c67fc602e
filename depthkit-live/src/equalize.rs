//! Histogram equalization for 8-bit grayscale images.

use image::GrayImage;

/// 256-bin intensity histogram.
pub fn histogram(image: &GrayImage) -> [u64; 256] {
    let mut bins = [0u64; 256];
    for &value in image.as_raw() {
        bins[value as usize] += 1;
    }
    bins
}

/// Spread intensities so the cumulative distribution is roughly linear.
///
/// Uses the classic `(cdf(v) - cdf_min) / (total - cdf_min)` mapping. Images
/// with a single intensity level come back unchanged.
pub fn equalize(image: &GrayImage) -> GrayImage {
    let bins = histogram(image);
    let total: u64 = bins.iter().sum();

    let mut cdf = [0u64; 256];
    let mut running = 0;
    for (slot, &count) in cdf.iter_mut().zip(bins.iter()) {
        running += count;
        *slot = running;
    }

    let cdf_min = cdf.iter().copied().find(|&c| c > 0).unwrap_or(0);
    let range = total - cdf_min;
    if range == 0 {
        return image.clone();
    }

    let lut: Vec<u8> = cdf
        .iter()
        .map(|&c| {
            let scaled = c.saturating_sub(cdf_min) as f64 * 255.0 / range as f64;
            scaled.round() as u8
        })
        .collect();

    let mut out = image.clone();
    for value in out.iter_mut() {
        *value = lut[*value as usize];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_histogram_counts() {
        let image = GrayImage::from_raw(4, 1, vec![0, 5, 5, 255]).unwrap();
        let bins = histogram(&image);
        assert_eq!(bins[0], 1);
        assert_eq!(bins[5], 2);
        assert_eq!(bins[255], 1);
        assert_eq!(bins.iter().sum::<u64>(), 4);
    }

    #[test]
    fn test_equalize_stretches_narrow_range() {
        let image = GrayImage::from_raw(4, 1, vec![100, 101, 102, 103]).unwrap();
        let equalized = equalize(&image);
        assert_eq!(equalized.as_raw(), &vec![0, 85, 170, 255]);
    }

    #[test]
    fn test_equalize_constant_image_unchanged() {
        let image = GrayImage::from_pixel(3, 3, Luma([42]));
        assert_eq!(equalize(&image), image);
    }

    #[test]
    fn test_equalize_preserves_order() {
        let image = GrayImage::from_fn(16, 16, |x, y| Luma([((x * 3 + y) % 64) as u8 + 90]));
        let equalized = equalize(&image);
        let mut pairs: Vec<(u8, u8)> = image
            .as_raw()
            .iter()
            .copied()
            .zip(equalized.as_raw().iter().copied())
            .collect();
        pairs.sort();
        assert!(pairs.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(pairs.last().map(|p| p.1), Some(255));
    }
}
