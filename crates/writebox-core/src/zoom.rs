//! Editor zoom level.

/// Smallest zoom factor.
pub const MIN_ZOOM: f32 = 0.08;
/// Largest zoom factor.
pub const MAX_ZOOM: f32 = 4.0;
/// Change applied by one zoom-in/zoom-out step.
pub const ZOOM_STEP: f32 = 0.1;

/// A zoom factor clamped to `[MIN_ZOOM, MAX_ZOOM]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    level: f32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self { level: 1.0 }
    }
}

impl Zoom {
    /// A zoom at `level`, clamped.
    pub fn new(level: f32) -> Self {
        let mut zoom = Self::default();
        zoom.set(level);
        zoom
    }

    /// Current factor.
    pub fn level(self) -> f32 {
        self.level
    }

    /// Set the factor, clamping it into range. NaN resets to 1.0.
    pub fn set(&mut self, level: f32) {
        self.level = if level.is_nan() {
            1.0
        } else {
            level.clamp(MIN_ZOOM, MAX_ZOOM)
        };
    }

    /// One step larger.
    pub fn zoom_in(&mut self) -> f32 {
        self.set(self.level + ZOOM_STEP);
        self.level
    }

    /// One step smaller.
    pub fn zoom_out(&mut self) -> f32 {
        self.set(self.level - ZOOM_STEP);
        self.level
    }

    /// Back to 100%.
    pub fn reset(&mut self) {
        self.level = 1.0;
    }

    /// The font size to render at for a `base` size in points.
    pub fn font_size(self, base: f32) -> f32 {
        base * self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped() {
        let mut zoom = Zoom::new(3.95);
        assert_eq!(zoom.zoom_in(), MAX_ZOOM);
        assert_eq!(zoom.zoom_in(), MAX_ZOOM);

        let mut zoom = Zoom::new(0.1);
        assert_eq!(zoom.zoom_out(), MIN_ZOOM);
        assert_eq!(Zoom::new(-2.0).level(), MIN_ZOOM);
    }

    #[test]
    fn font_size_scales_with_level() {
        let mut zoom = Zoom::default();
        zoom.set(2.0);
        assert_eq!(zoom.font_size(11.0), 22.0);
        zoom.reset();
        assert_eq!(zoom.font_size(11.0), 11.0);
    }
}
