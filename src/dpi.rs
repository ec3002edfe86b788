// ── DPI scaling ───────────────────────────────────────────────────────────────
//
// Requested window sizes are expressed at 96 DPI and scaled by the factors a
// renderer reports.  Pure arithmetic; the Win32 awareness switch lives in
// `platform::win32::dpi`.

/// The reference DPI at which sizes are expressed.
pub const BASE_DPI: f32 = 96.0;

/// Scale a pixel value defined at 96 DPI to `dpi`, rounding up.
///
/// A DPI that is not a positive finite number is treated as `BASE_DPI`.
pub fn scale(px: i32, dpi: f32) -> i32 {
    let dpi = if dpi.is_finite() && dpi > 0.0 {
        dpi
    } else {
        BASE_DPI
    };
    (f64::from(px) * f64::from(dpi) / f64::from(BASE_DPI)).ceil() as i32
}

/// Scale a `width` x `height` pair by per-axis DPI values.
pub fn scale_size(width: i32, height: i32, (dpi_x, dpi_y): (f32, f32)) -> (i32, i32) {
    (scale(width, dpi_x), scale(height, dpi_y))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dpi_is_identity() {
        assert_eq!(scale_size(640, 480, (96.0, 96.0)), (640, 480));
    }

    #[test]
    fn scales_each_axis_independently() {
        assert_eq!(scale_size(640, 480, (144.0, 120.0)), (960, 600));
    }

    #[test]
    fn rounds_up_fractional_pixels() {
        // 641 * 120 / 96 = 801.25
        assert_eq!(scale(641, 120.0), 802);
        // 1 * 97 / 96 = 1.01
        assert_eq!(scale(1, 97.0), 2);
    }

    #[test]
    fn degenerate_dpi_falls_back_to_base() {
        assert_eq!(scale(640, 0.0), 640);
        assert_eq!(scale(640, -96.0), 640);
        assert_eq!(scale(640, f32::NAN), 640);
        assert_eq!(scale(640, f32::INFINITY), 640);
    }
}
