//! `GET`/`PUT` sprite region codec (spec.md §4.D).
//!
//! On-wire form: two little-endian `u16` header fields (width, height)
//! followed by one palette-index byte per pixel, row-major.

use crate::buffer::FrameBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterOp {
    Pset,
    Preset,
    And,
    Or,
    Xor,
}

/// Nearest palette index for a BGRA pixel, by squared-distance search.
/// Exact palette hits (the overwhelmingly common case for BASIC-drawn
/// pixels) resolve in the first comparison.
fn nearest_index(fb: &FrameBuffer, bgra: [u8; 4]) -> u8 {
    let mut best = 0u8;
    let mut best_dist = u32::MAX;
    for i in 0..=255u8 {
        let candidate = fb.palette().bgra(i);
        if candidate == bgra {
            return i;
        }
        let dist = (0..3)
            .map(|k| {
                let d = candidate[k] as i32 - bgra[k] as i32;
                (d * d) as u32
            })
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

/// `copy_region(x1,y1,x2,y2) -> bytes` (spec.md §4.D).
pub fn copy_region(fb: &FrameBuffer, x1: i32, y1: i32, x2: i32, y2: i32) -> Vec<u8> {
    let (lo_x, hi_x) = (x1.min(x2), x1.max(x2));
    let (lo_y, hi_y) = (y1.min(y2), y1.max(y2));
    let width = (hi_x - lo_x + 1).max(0) as u16;
    let height = (hi_y - lo_y + 1).max(0) as u16;
    let mut out = Vec::with_capacity(4 + width as usize * height as usize);
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    for y in lo_y..=hi_y {
        for x in lo_x..=hi_x {
            out.push(nearest_index(fb, fb.get_pixel(x, y)));
        }
    }
    out
}

/// `paste_region(x,y,bytes,action)` (spec.md §4.D). Silently ignores a
/// malformed or truncated buffer (fewer bytes than the header promises).
pub fn paste_region(fb: &mut FrameBuffer, x: i32, y: i32, bytes: &[u8], action: Option<RasterOp>) {
    if bytes.len() < 4 {
        return;
    }
    let width = u16::from_le_bytes([bytes[0], bytes[1]]) as i32;
    let height = u16::from_le_bytes([bytes[2], bytes[3]]) as i32;
    let body = &bytes[4..];
    if body.len() < (width * height) as usize {
        return;
    }
    let palette = fb.palette().clone();
    for row in 0..height {
        for col in 0..width {
            let idx = body[(row * width + col) as usize];
            let src = palette.bgra(idx);
            let (px, py) = (x + col, y + row);
            match action {
                None | Some(RasterOp::Pset) => fb.set_pixel(px, py, idx as u32),
                Some(RasterOp::Preset) => {
                    let inverted = [!src[0], !src[1], !src[2], src[3]];
                    let resolved = nearest_index(fb, inverted);
                    fb.set_pixel(px, py, resolved as u32);
                }
                Some(op) => {
                    let dst = fb.get_pixel(px, py);
                    let mut out = [0u8; 4];
                    for k in 0..4 {
                        out[k] = match op {
                            RasterOp::And => dst[k] & src[k],
                            RasterOp::Or => dst[k] | src[k],
                            RasterOp::Xor => dst[k] ^ src[k],
                            RasterOp::Pset | RasterOp::Preset => src[k],
                        };
                    }
                    fb.set_pixel_raw(px, py, out);
                }
            }
        }
    }
}
