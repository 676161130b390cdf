//! Screen-mode façade: two pages, mode switching, text-in-graphics cursor
//! (spec.md §4.E, component E). Forwards all actual drawing to
//! `basic-framebuffer`.

mod font;
mod modes;

use basic_framebuffer::FrameBuffer;
pub use modes::{mode_info, ModeInfo};
use tracing::debug;

/// Owns both pages of a double-buffered screen plus the text-in-graphics
/// cursor. `active_page` is drawn to; `visual_page` is presented.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    pages: [FrameBuffer; 2],
    active_page: usize,
    visual_page: usize,
    mode: u32,
    cursor_row: u32,
    cursor_col: u32,
    text_fg: u32,
    text_bg: u32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GraphicsState {
    pub fn new(mode: u32) -> Self {
        let info = mode_info(mode).unwrap_or_else(|| mode_info(0).unwrap());
        GraphicsState {
            pages: [
                FrameBuffer::new(info.width, info.height),
                FrameBuffer::new(info.width, info.height),
            ],
            active_page: 0,
            visual_page: 0,
            mode,
            cursor_row: 0,
            cursor_col: 0,
            text_fg: 15,
            text_bg: 0,
        }
    }

    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn active_page(&self) -> &FrameBuffer {
        &self.pages[self.active_page]
    }

    pub fn active_page_mut(&mut self) -> &mut FrameBuffer {
        &mut self.pages[self.active_page]
    }

    pub fn visual_page(&self) -> &FrameBuffer {
        &self.pages[self.visual_page]
    }

    pub fn cursor(&self) -> (u32, u32) {
        (self.cursor_row, self.cursor_col)
    }

    pub fn set_cursor(&mut self, row: u32, col: u32) {
        self.cursor_row = row;
        self.cursor_col = col;
    }

    pub fn set_text_colors(&mut self, fg: Option<u32>, bg: Option<u32>) {
        if let Some(f) = fg {
            self.text_fg = f;
        }
        if let Some(b) = bg {
            self.text_bg = b;
        }
    }

    /// `SCREEN mode, active?, visual?` (spec.md §4.E). Reallocates both
    /// pages (and clears them) only when the mode's resolution actually
    /// changes; switching only `active`/`visual` is a cheap page flip.
    pub fn set_screen(&mut self, mode: u32, active: Option<u32>, visual: Option<u32>) {
        let info = mode_info(mode).unwrap_or_else(|| mode_info(0).unwrap());
        if mode != self.mode
            || self.pages[0].width() != info.width
            || self.pages[0].height() != info.height
        {
            debug!(mode, width = info.width, height = info.height, "screen_mode_reallocate");
            self.pages = [
                FrameBuffer::new(info.width, info.height),
                FrameBuffer::new(info.width, info.height),
            ];
            self.mode = mode;
            self.cursor_row = 0;
            self.cursor_col = 0;
        }
        if let Some(a) = active {
            self.active_page = (a as usize) & 1;
        }
        if let Some(v) = visual {
            self.visual_page = (v as usize) & 1;
        }
    }

    /// `CLS` — clears the active page only.
    pub fn cls(&mut self) {
        self.active_page_mut().clear(0);
        self.cursor_row = 0;
        self.cursor_col = 0;
    }

    /// Character cell height for the active mode (spec.md §4.E: mode 9 is
    /// 14px, mode 12 is 16px, else 8px).
    fn char_height(&self) -> u32 {
        match self.mode {
            9 => 14,
            12 => 16,
            _ => 8,
        }
    }

    /// Rasterizes `s` at the text cursor using the embedded 8x8 font,
    /// advancing and wrapping/scrolling the cursor (spec.md §4.E).
    pub fn print_text(&mut self, s: &str) {
        let cell_w = 8u32;
        let cell_h = self.char_height();
        let fg = self.text_fg;
        let (width, height) = {
            let p = self.active_page();
            (p.width(), p.height())
        };
        let cols = (width / cell_w).max(1);
        let rows = (height / cell_h).max(1);
        for ch in s.chars() {
            if ch == '\n' {
                self.cursor_col = 0;
                self.cursor_row += 1;
            } else {
                let byte = if ch.is_ascii() { ch as u8 } else { 0 };
                let glyph = font::glyph(byte);
                let ox = self.cursor_col * cell_w;
                let oy = self.cursor_row * cell_h;
                for (row, bits) in glyph.iter().enumerate() {
                    for col in 0..5u32 {
                        if (bits >> (4 - col)) & 1 == 1 {
                            self.active_page_mut()
                                .set_pixel((ox + col) as i32, (oy + row as u32) as i32, fg);
                        }
                    }
                }
                self.cursor_col += 1;
                if self.cursor_col >= cols {
                    self.cursor_col = 0;
                    self.cursor_row += 1;
                }
            }
            if self.cursor_row >= rows {
                self.scroll_up();
                self.cursor_row = rows.saturating_sub(1);
            }
        }
    }

    /// Trivial scroll: shifts the active page's text rows up by one cell,
    /// clearing the newly exposed bottom row.
    fn scroll_up(&mut self) {
        let cell_h = self.char_height();
        let (width, height) = {
            let p = self.active_page();
            (p.width(), p.height())
        };
        let page = self.active_page_mut();
        for y in cell_h..height {
            for x in 0..width {
                let px = page.get_pixel(x as i32, y as i32);
                page.set_pixel_raw(x as i32, (y - cell_h) as i32, px);
            }
        }
        for y in (height - cell_h)..height {
            for x in 0..width {
                page.set_pixel_raw(x as i32, y as i32, [0, 0, 0, 0xFF]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_change_reallocates_and_clears_both_pages() {
        let mut g = GraphicsState::new(0);
        g.active_page_mut().set_pixel(1, 1, 1);
        g.set_screen(13, None, None);
        assert_eq!(g.active_page().width(), 320);
        assert_eq!(g.active_page().height(), 200);
        assert_eq!(g.active_page().get_pixel(1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn repeating_the_same_mode_is_a_fast_page_flip_not_a_realloc() {
        let mut g = GraphicsState::new(13);
        g.active_page_mut().set_pixel(5, 5, 9);
        g.set_screen(13, None, None);
        // Same mode+resolution: no reallocation, pixel survives.
        assert_eq!(g.active_page().get_pixel(5, 5), g.active_page().palette().bgra(9));
    }

    #[test]
    fn active_and_visual_pages_can_diverge_for_double_buffering() {
        let mut g = GraphicsState::new(13);
        g.set_screen(13, Some(1), Some(0));
        g.active_page_mut().set_pixel(0, 0, 4);
        assert_ne!(g.active_page().get_pixel(0, 0), g.visual_page().get_pixel(0, 0));
    }

    #[test]
    fn cls_clears_only_the_active_page() {
        let mut g = GraphicsState::new(13);
        g.set_screen(13, Some(1), Some(0));
        g.visual_page().palette(); // keep visual reachable in this scenario
        g.active_page_mut().set_pixel(2, 2, 4);
        g.cls();
        assert_eq!(g.active_page().get_pixel(2, 2), [0, 0, 0, 0]);
    }
}
