use basic_framebuffer::{copy_region, paste_region, FrameBuffer};
use proptest::prelude::*;

proptest! {
    #[test]
    fn draw_line_touches_the_same_pixels_either_direction(
        x1 in 0i32..48, y1 in 0i32..48, x2 in 0i32..48, y2 in 0i32..48,
    ) {
        let mut a = FrameBuffer::new(48, 48);
        a.draw_line(x1, y1, x2, y2, 12);
        let mut b = FrameBuffer::new(48, 48);
        b.draw_line(x2, y2, x1, y1, 12);
        prop_assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn set_pixel_round_trips_for_any_injective_palette_index(index in 0u8..=255) {
        let mut fb = FrameBuffer::new(8, 8);
        fb.set_pixel(3, 3, index as u32);
        prop_assert_eq!(fb.get_pixel(3, 3), fb.palette().bgra(index));
    }

    #[test]
    fn get_put_region_round_trips_palette_colors(index in 0u8..=255) {
        let mut fb = FrameBuffer::new(16, 16);
        fb.draw_box(2, 2, 9, 9, index, true);
        let bytes = copy_region(&fb, 2, 2, 9, 9);
        let mut dest = FrameBuffer::new(16, 16);
        paste_region(&mut dest, 2, 2, &bytes, None);
        prop_assert_eq!(dest.get_pixel(5, 5), fb.palette().bgra(index));
    }
}
