//! Time <-> pixel mapping shared by rendering and hit-testing

/// Snapshot of zoom and scroll used to convert between seconds and viewport pixels.
///
/// `x` is measured from the left edge of the track area, so `x = 0` is the first
/// visible pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    pub pixels_per_second: f64,
    pub scroll_offset: f64,
}

impl CoordinateMapper {
    pub fn new(pixels_per_second: f64, scroll_offset: f64) -> Self {
        Self {
            pixels_per_second,
            scroll_offset,
        }
    }

    pub fn time_to_pixel(&self, time: f64) -> f64 {
        time * self.pixels_per_second - self.scroll_offset
    }

    pub fn pixel_to_time(&self, x: f64) -> f64 {
        (x + self.scroll_offset) / self.pixels_per_second
    }

    /// Convert a pixel distance into seconds at the current zoom
    pub fn pixels_to_seconds(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_second
    }

    /// Time window covered by a viewport of `width` pixels
    pub fn visible_range(&self, width: f64) -> (f64, f64) {
        (self.pixel_to_time(0.0), self.pixel_to_time(width))
    }

    pub fn is_visible(&self, x: f64, width: f64) -> bool {
        (0.0..=width).contains(&x)
    }
}

/// Largest legal scroll offset for the given zoom
pub fn max_scroll(duration: f64, pixels_per_second: f64, viewport_width: f64) -> f64 {
    (duration * pixels_per_second - viewport_width).max(0.0)
}

/// Clamp a scroll offset into `[0, max(0, duration * pps - width)]`
pub fn clamp_scroll(value: f64, duration: f64, pixels_per_second: f64, viewport_width: f64) -> f64 {
    let max = max_scroll(duration, pixels_per_second, viewport_width);
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}
