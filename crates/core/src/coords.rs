//! Fraction coordinates and their projection into rendered pixel space.
//!
//! A hotspot's position is stored as a fraction of the image's width and
//! height, never in pixels, so it stays anchored no matter how large the
//! image is drawn. Pixel positions only exist for the box the image
//! currently occupies on screen.
//!
//! Two pixel spaces are involved:
//!
//! - **image space**: origin at the image's own top-left corner. Fractions
//!   are always computed here.
//! - **container space**: origin at the positioning container the markers
//!   are drawn in. Render positions add the image's offset within it.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Smallest valid fraction (left / top edge of the image).
pub const MIN_FRACTION: f64 = 0.0;

/// Largest valid fraction (right / bottom edge of the image).
pub const MAX_FRACTION: f64 = 1.0;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A position expressed as fractions of the image's width and height.
///
/// Both components are finite and within `[0, 1]`; construct through
/// [`Fraction::new`] to uphold that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fraction {
    pub x: f64,
    pub y: f64,
}

impl Fraction {
    /// Build a fraction, rejecting non-finite or out-of-range components.
    pub fn new(x: f64, y: f64) -> Result<Self, CoreError> {
        validate_fraction("x_pct", x)?;
        validate_fraction("y_pct", y)?;
        Ok(Self { x, y })
    }
}

/// A point in pixel space (image or container, depending on context).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The box the image currently occupies, measured in container space.
///
/// `offset_x` / `offset_y` are the image's top-left corner relative to the
/// positioning container; `width` / `height` are its rendered size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderedBox {
    pub offset_x: f64,
    pub offset_y: f64,
    pub width: f64,
    pub height: f64,
}

impl RenderedBox {
    pub fn new(offset_x: f64, offset_y: f64, width: f64, height: f64) -> Self {
        Self {
            offset_x,
            offset_y,
            width,
            height,
        }
    }

    /// An image drawn at the container's origin.
    pub fn at_origin(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Whether anything can be projected into this box.
    ///
    /// False while the image has not loaded (zero size) or when the
    /// measurement is garbage.
    pub fn is_renderable(&self) -> bool {
        has_area(self.width, self.height) && self.offset_x.is_finite() && self.offset_y.is_finite()
    }

    /// Container-space position for a stored fraction.
    ///
    /// Returns `None` when the box is not renderable.
    pub fn project(&self, fraction: Fraction) -> Option<PixelPoint> {
        if !self.is_renderable() {
            return None;
        }
        let (px, py) = to_pixel(fraction.x, fraction.y, self.width, self.height)?;
        Some(PixelPoint::new(px + self.offset_x, py + self.offset_y))
    }

    /// Fraction for a container-space point, relative to the image's own box.
    ///
    /// Returns `None` when the point falls outside the image or the box is
    /// not renderable. The point is never clamped onto the image.
    pub fn locate(&self, point: PixelPoint) -> Option<Fraction> {
        if !self.is_renderable() {
            return None;
        }
        let (fx, fy) = to_fraction(
            point.x - self.offset_x,
            point.y - self.offset_y,
            self.width,
            self.height,
        )?;
        Some(Fraction { x: fx, y: fy })
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Image-space pixel position for a fraction.
///
/// `None` when the rendered size has no area (image not loaded yet), so a
/// caller can never end up placing a marker at NaN or infinity.
pub fn to_pixel(
    frac_x: f64,
    frac_y: f64,
    rendered_width: f64,
    rendered_height: f64,
) -> Option<(f64, f64)> {
    if !has_area(rendered_width, rendered_height) || !frac_x.is_finite() || !frac_y.is_finite() {
        return None;
    }
    Some((frac_x * rendered_width, frac_y * rendered_height))
}

/// Fraction for an image-space pixel position.
///
/// `None` when the pixel lies outside `[0, width] x [0, height]`, when the
/// rendered size has no area, or when any input is not finite. Callers must
/// treat `None` as "reject the click".
pub fn to_fraction(
    pixel_x: f64,
    pixel_y: f64,
    rendered_width: f64,
    rendered_height: f64,
) -> Option<(f64, f64)> {
    if !has_area(rendered_width, rendered_height) || !pixel_x.is_finite() || !pixel_y.is_finite()
    {
        return None;
    }
    let fx = pixel_x / rendered_width;
    let fy = pixel_y / rendered_height;
    if !in_unit_range(fx) || !in_unit_range(fy) {
        return None;
    }
    Some((fx, fy))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a single fraction component received from a client.
pub fn validate_fraction(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() {
        return Err(CoreError::Validation(format!(
            "{field} must be a finite number"
        )));
    }
    if !in_unit_range(value) {
        return Err(CoreError::Validation(format!(
            "{field} must be between {MIN_FRACTION} and {MAX_FRACTION}, got {value}"
        )));
    }
    Ok(())
}

fn in_unit_range(value: f64) -> bool {
    (MIN_FRACTION..=MAX_FRACTION).contains(&value)
}

fn has_area(width: f64, height: f64) -> bool {
    width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const EPS: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    // -- to_pixel / to_fraction ---------------------------------------------

    #[test]
    fn to_pixel_scales_by_rendered_size() {
        assert_eq!(to_pixel(0.25, 0.5, 800.0, 600.0), Some((200.0, 300.0)));
    }

    #[test]
    fn to_pixel_zero_size_renders_nothing() {
        assert_eq!(to_pixel(0.5, 0.5, 0.0, 600.0), None);
        assert_eq!(to_pixel(0.5, 0.5, 800.0, 0.0), None);
    }

    #[test]
    fn round_trip_over_grid() {
        let sizes = [(1.0, 1.0), (37.0, 913.0), (1920.0, 1080.0), (333.3, 0.7)];
        for &(w, h) in &sizes {
            for i in 0..=20 {
                for j in 0..=20 {
                    let fx = f64::from(i) / 20.0;
                    let fy = f64::from(j) / 20.0;
                    let (px, py) = to_pixel(fx, fy, w, h).unwrap();
                    let (rx, ry) = to_fraction(px, py, w, h).unwrap();
                    assert!(approx(rx, fx) && approx(ry, fy), "({fx},{fy}) at {w}x{h}");
                }
            }
        }
    }

    #[test]
    fn edges_are_valid() {
        assert_eq!(to_fraction(0.0, 0.0, 400.0, 200.0), Some((0.0, 0.0)));
        assert_eq!(to_fraction(400.0, 200.0, 400.0, 200.0), Some((1.0, 1.0)));
    }

    #[test]
    fn out_of_bounds_pixels_are_rejected() {
        assert_eq!(to_fraction(-1.0, 10.0, 400.0, 200.0), None);
        assert_eq!(to_fraction(401.0, 200.0, 400.0, 200.0), None);
        assert_eq!(to_fraction(10.0, 200.5, 400.0, 200.0), None);
    }

    #[test]
    fn non_finite_pixels_are_rejected() {
        assert_eq!(to_fraction(f64::NAN, 1.0, 400.0, 200.0), None);
        assert_eq!(to_fraction(1.0, f64::INFINITY, 400.0, 200.0), None);
    }

    #[test]
    fn unloaded_image_rejects_clicks() {
        assert_eq!(to_fraction(0.0, 0.0, 0.0, 0.0), None);
    }

    // -- RenderedBox ----------------------------------------------------------

    #[test]
    fn project_adds_container_offset() {
        let image = RenderedBox::new(100.0, 20.0, 400.0, 200.0);
        let point = image.project(Fraction::new(0.5, 0.5).unwrap()).unwrap();
        assert_eq!(point, PixelPoint::new(300.0, 120.0));
    }

    #[test]
    fn locate_is_relative_to_image_not_container() {
        let image = RenderedBox::new(100.0, 20.0, 400.0, 200.0);
        let fraction = image.locate(PixelPoint::new(200.0, 70.0)).unwrap();
        assert!(approx(fraction.x, 0.25));
        assert!(approx(fraction.y, 0.25));
    }

    #[test]
    fn locate_rejects_clicks_in_container_padding() {
        let image = RenderedBox::new(100.0, 20.0, 400.0, 200.0);
        assert_eq!(image.locate(PixelPoint::new(50.0, 70.0)), None);
        assert_eq!(image.locate(PixelPoint::new(501.0, 70.0)), None);
    }

    #[test]
    fn stored_fraction_survives_layout_change() {
        let before = RenderedBox::new(0.0, 0.0, 800.0, 400.0);
        let fraction = before.locate(PixelPoint::new(600.0, 100.0)).unwrap();

        // Container padding grows and the image shrinks.
        let after = RenderedBox::new(50.0, 30.0, 400.0, 200.0);
        let point = after.project(fraction).unwrap();
        assert!(approx(point.x, 50.0 + 300.0));
        assert!(approx(point.y, 30.0 + 50.0));
    }

    #[test]
    fn zero_size_box_projects_nothing() {
        let image = RenderedBox::default();
        assert!(!image.is_renderable());
        assert_eq!(image.project(Fraction::new(0.5, 0.5).unwrap()), None);
    }

    // -- Fraction::new ----------------------------------------------------------

    #[test]
    fn fraction_rejects_out_of_range() {
        assert_matches!(Fraction::new(1.01, 0.5), Err(CoreError::Validation(_)));
        assert_matches!(Fraction::new(0.5, -0.01), Err(CoreError::Validation(_)));
        assert_matches!(Fraction::new(f64::NAN, 0.5), Err(CoreError::Validation(_)));
    }

    #[test]
    fn fraction_accepts_bounds() {
        assert!(Fraction::new(0.0, 1.0).is_ok());
    }
}
