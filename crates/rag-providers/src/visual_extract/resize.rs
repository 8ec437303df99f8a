//! Resize a rendered page into the visual lane's edge bounds (§4.6 step 2):
//! both edges within `[VISUAL_EDGE_MIN_PX, VISUAL_EDGE_MAX_PX]`, and the
//! short edge additionally capped at `VISUAL_SHORT_EDGE_MAX_PX`.

use image::imageops::FilterType;
use image::DynamicImage;
use rag_domain::constants::{VISUAL_EDGE_MAX_PX, VISUAL_EDGE_MIN_PX, VISUAL_SHORT_EDGE_MAX_PX};

pub fn resize_to_bounds(image: DynamicImage) -> DynamicImage {
    let (w, h) = (image.width(), image.height());
    let short_edge = w.min(h);
    let long_edge = w.max(h);

    let mut target_short = short_edge.clamp(VISUAL_EDGE_MIN_PX, VISUAL_SHORT_EDGE_MAX_PX);
    let mut scale = target_short as f64 / short_edge as f64;
    let mut target_long = (long_edge as f64 * scale).round() as u32;

    if target_long > VISUAL_EDGE_MAX_PX {
        scale = VISUAL_EDGE_MAX_PX as f64 / long_edge as f64;
        target_long = VISUAL_EDGE_MAX_PX;
        target_short = (short_edge as f64 * scale).round() as u32;
    }

    let (target_w, target_h) = if w >= h {
        (target_long, target_short)
    } else {
        (target_short, target_long)
    };

    if target_w == w && target_h == h {
        return image;
    }
    image.resize_exact(target_w.max(1), target_h.max(1), FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_square_shrinks_to_the_long_edge_bound() {
        let image = DynamicImage::new_rgb8(4000, 4000);
        let resized = resize_to_bounds(image);
        assert!(resized.width() <= VISUAL_EDGE_MAX_PX);
        assert!(resized.height() <= VISUAL_EDGE_MAX_PX);
    }

    #[test]
    fn undersized_image_grows_to_the_minimum_edge() {
        let image = DynamicImage::new_rgb8(50, 50);
        let resized = resize_to_bounds(image);
        assert!(resized.width() >= VISUAL_EDGE_MIN_PX);
        assert!(resized.height() >= VISUAL_EDGE_MIN_PX);
    }

    #[test]
    fn wide_image_caps_short_edge_even_within_bounds() {
        let image = DynamicImage::new_rgb8(1500, 300);
        let resized = resize_to_bounds(image);
        assert!(resized.height() <= VISUAL_SHORT_EDGE_MAX_PX);
    }
}
