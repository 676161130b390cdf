//! `SCREEN` mode table (spec.md §6).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeInfo {
    pub width: u32,
    pub height: u32,
    /// Number of addressable colors; `None` marks direct 24-bit RGB modes.
    pub colors: Option<u32>,
}

/// Resolution/color-space lookup for a `SCREEN` mode number, or `None` for
/// an unrecognized mode (the evaluator raises `Illegal function call` in
/// that case).
pub fn mode_info(mode: u32) -> Option<ModeInfo> {
    let (width, height, colors) = match mode {
        0 => (640, 200, Some(16)),
        1 => (320, 200, Some(4)),
        2 => (640, 200, Some(2)),
        7 => (320, 200, Some(16)),
        8 => (640, 200, Some(16)),
        9 => (640, 350, Some(16)),
        12 => (640, 480, Some(16)),
        13 => (320, 200, Some(256)),
        14 => (640, 480, Some(256)),
        15 => (640, 480, None),
        16 => (800, 600, Some(256)),
        17 => (800, 600, None),
        18 => (1024, 768, Some(256)),
        19 => (1024, 768, None),
        _ => return None,
    };
    Some(ModeInfo {
        width,
        height,
        colors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_13_is_the_classic_mode_13h_resolution() {
        assert_eq!(
            mode_info(13),
            Some(ModeInfo {
                width: 320,
                height: 200,
                colors: Some(256)
            })
        );
    }

    #[test]
    fn unknown_mode_returns_none() {
        assert_eq!(mode_info(42), None);
    }
}
