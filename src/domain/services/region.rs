use crate::domain::model::GuideRegion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Maps the on-screen guide rectangle onto the captured image, scaling each
/// axis independently and clamping to the image bounds.
pub fn map_guide_to_image(guide: &GuideRegion, image_width: u32, image_height: u32) -> Option<PixelRect> {
    if guide.preview_width <= 0.0 || guide.preview_height <= 0.0 {
        return None;
    }

    let scale_x = image_width as f32 / guide.preview_width;
    let scale_y = image_height as f32 / guide.preview_height;

    let left = ((guide.left * scale_x) as i64).max(0);
    let top = ((guide.top * scale_y) as i64).max(0);
    let right = (((guide.left + guide.width) * scale_x) as i64).min(image_width as i64);
    let bottom = (((guide.top + guide.height) * scale_y) as i64).min(image_height as i64);

    if right <= left || bottom <= top {
        return None;
    }

    Some(PixelRect {
        x: left as u32,
        y: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guide(left: f32, top: f32, width: f32, height: f32) -> GuideRegion {
        GuideRegion {
            left,
            top,
            width,
            height,
            preview_width: 1080.0,
            preview_height: 1920.0,
        }
    }

    #[test]
    fn test_scales_per_axis() {
        let rect = map_guide_to_image(&guide(40.0, 1200.0, 1000.0, 300.0), 1920, 1080).unwrap();
        // 1920/1080 horizontally, 1080/1920 vertically.
        assert_eq!(rect.x, 71);
        assert_eq!(rect.y, 675);
        assert_eq!(rect.width, 1848 - 71);
        assert_eq!(rect.height, 843 - 675);
    }

    #[test]
    fn test_clamps_to_image() {
        let rect = map_guide_to_image(&guide(-100.0, 1800.0, 2000.0, 500.0), 1080, 1920).unwrap();
        assert_eq!(rect.x, 0);
        assert_eq!(rect.width, 1080);
        assert_eq!(rect.y + rect.height, 1920);
    }

    #[test]
    fn test_empty_or_degenerate() {
        assert!(map_guide_to_image(&guide(2000.0, 0.0, 10.0, 10.0), 1080, 1920).is_none());
        let mut zero = guide(0.0, 0.0, 10.0, 10.0);
        zero.preview_width = 0.0;
        assert!(map_guide_to_image(&zero, 1080, 1920).is_none());
    }
}
