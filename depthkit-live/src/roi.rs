//! Region-of-interest statistics.

use image::DynamicImage;
use tracing::trace;

use crate::config::Roi;
use crate::equalize::histogram;

/// Mean 8-bit intensity inside `roi`.
///
/// The crop is converted to single-channel luma and averaged through a
/// 256-bin histogram, `Σ(bin × count) / total`. The rectangle is clipped to
/// the image; `None` when nothing of it remains.
pub fn mean_intensity(image: &DynamicImage, roi: Roi) -> Option<f32> {
    if roi.x >= image.width() || roi.y >= image.height() {
        return None;
    }
    let crop = image.crop_imm(roi.x, roi.y, roi.width, roi.height);
    if crop.width() == 0 || crop.height() == 0 {
        return None;
    }

    let luma = crop.to_luma8();
    let bins = histogram(&luma);
    let total: u64 = bins.iter().sum();
    if total == 0 {
        return None;
    }
    let weighted: u64 = bins.iter().enumerate().map(|(value, &count)| value as u64 * count).sum();
    let mean = (weighted as f64 / total as f64) as f32;
    trace!("ROI mean {:.2} over {} pixels", mean, total);
    Some(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn gray(image: GrayImage) -> DynamicImage {
        DynamicImage::ImageLuma8(image)
    }

    #[test]
    fn test_constant_crop_returns_exact_value() {
        for value in [0u8, 1, 127, 200, 254, 255] {
            let image = gray(GrayImage::from_pixel(20, 20, Luma([value])));
            assert_eq!(mean_intensity(&image, Roi::new(5, 5, 10, 10)), Some(value as f32));
        }
    }

    #[test]
    fn test_mean_matches_arithmetic_mean() {
        let image = gray(GrayImage::from_fn(10, 10, |x, y| Luma([(x * 10 + y) as u8])));
        let roi = Roi::new(2, 3, 4, 5);
        let mut sum = 0u32;
        for y in 3..8 {
            for x in 2..6 {
                sum += x * 10 + y;
            }
        }
        let expected = sum as f32 / 20.0;
        assert!((mean_intensity(&image, roi).unwrap() - expected).abs() < 1e-4);
    }

    #[test]
    fn test_roi_only_counts_cropped_pixels() {
        let image = gray(GrayImage::from_fn(8, 8, |x, _| Luma([if x < 4 { 0 } else { 255 }])));
        assert_eq!(mean_intensity(&image, Roi::new(4, 0, 4, 8)), Some(255.0));
        assert_eq!(mean_intensity(&image, Roi::new(0, 0, 4, 8)), Some(0.0));
    }

    #[test]
    fn test_roi_is_clipped_to_image() {
        let image = gray(GrayImage::from_pixel(10, 10, Luma([9])));
        assert_eq!(mean_intensity(&image, Roi::new(8, 8, 100, 100)), Some(9.0));
        assert_eq!(mean_intensity(&image, Roi::new(10, 0, 5, 5)), None);
    }

    #[test]
    fn test_rgba_input_is_converted_to_luma() {
        let image = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(4, 4, image::Rgba([50, 50, 50, 255])));
        assert_eq!(mean_intensity(&image, Roi::new(0, 0, 4, 4)), Some(50.0));
    }
}
