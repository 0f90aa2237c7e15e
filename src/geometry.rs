//! Geometric primitives and the logical-to-pixel mapping.
//! Primitives géométriques et correspondance logique / pixel.
//!
//! Logical coordinates are device-independent points. Multiplying by the scale
//! factor gives physical pixel coordinates, which are rounded
//! half-away-from-zero everywhere (`f64::round`).

// =============================================================================
// POINT ET TAILLE
// POINT AND SIZE
// =============================================================================

/// Point 2D en coordonnées logiques / 2D point in logical coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translation de ce point / Translated copy of this point
    #[inline]
    pub fn offset(self, delta: Point) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }

    /// Conversion en pixels physiques (non arrondie)
    /// Conversion to physical pixels (not rounded)
    #[inline]
    pub fn scaled(self, scale: f64) -> Self {
        Self::new(self.x * scale, self.y * scale)
    }
}

/// Taille 2D / 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// =============================================================================
// RECTANGLE
// =============================================================================

/// Rectangle (origine + taille) / Rectangle (origin + size)
///
/// Always standardized: width and height are never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let (x, width) = if width < 0.0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0.0 { (y + height, -height) } else { (y, height) };
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Rectangle centré sur un point / Rectangle centered on a point
    pub fn centered(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width / 2.0,
            center.y - size.height / 2.0,
            size.width,
            size.height,
        )
    }

    /// Étendue en pixels physiques, arrondie vers l'extérieur
    /// Extent in physical pixels, rounded outward
    pub fn pixel_extent(&self, scale: f64) -> (usize, usize) {
        let width = (self.size.width * scale).ceil();
        let height = (self.size.height * scale).ceil();
        (width.max(0.0) as usize, height.max(0.0) as usize)
    }
}

// =============================================================================
// RECTANGLE EN PIXELS
// PIXEL RECTANGLE
// =============================================================================

/// Rectangle en pixels physiques, semi-ouvert [x0, x1) × [y0, y1)
/// Rectangle in physical pixels, half-open [x0, x1) × [y0, y1)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl PixelRect {
    pub const fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[inline]
    pub const fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Intersection de deux rectangles (peut être vide)
    /// Intersection of two rectangles (may be empty)
    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        PixelRect::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        )
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

// =============================================================================
// RÉGION ACTIVE
// ACTIVE REGION
// =============================================================================

/// Zone où le point focal peut se déplacer, en coordonnées logiques
/// Area the focal point may travel in, in logical coordinates
///
/// Uses the same coordinate space as the captured surface (pre-scale units,
/// origin at the top-left of the surface).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveRegion {
    rect: Rect,
}

impl ActiveRegion {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Contraint un point à la région puis l'aligne sur la grille de pixels
    /// Clamps a point to the region then aligns it on the pixel grid
    ///
    /// Both axes are handled independently. The result is inside the region
    /// and satisfies `round(v * scale) / scale == v`, unless the region is
    /// narrower than one device pixel on that axis.
    pub fn clamp_and_snap(&self, point: Point, scale: f64) -> Point {
        Point::new(
            clamp_snap_axis(point.x, self.rect.min_x(), self.rect.max_x(), scale),
            clamp_snap_axis(point.y, self.rect.min_y(), self.rect.max_y(), scale),
        )
    }

    /// La région en pixels physiques / The region in physical pixels
    pub fn to_pixels(&self, scale: f64) -> PixelRect {
        PixelRect::new(
            round_to_pixel(self.rect.min_x() * scale),
            round_to_pixel(self.rect.min_y() * scale),
            round_to_pixel(self.rect.max_x() * scale),
            round_to_pixel(self.rect.max_y() * scale),
        )
    }
}

// =============================================================================
// ARRONDI
// ROUNDING
// =============================================================================

/// Arrondi d'une coordonnée pixel (demi loin de zéro)
/// Rounds a pixel coordinate (half away from zero)
#[inline]
pub fn round_to_pixel(value: f64) -> i64 {
    value.round() as i64
}

/// Aligne une valeur logique sur la grille de pixels physiques
/// Aligns a logical value on the physical pixel grid
#[inline]
pub fn snap_to_pixel_grid(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale
}

fn clamp_snap_axis(value: f64, min: f64, max: f64, scale: f64) -> f64 {
    let value = if value.is_nan() { min } else { value.clamp(min, max) };

    // Pixel indices that stay inside [min, max] once divided back
    let lowest = (min * scale).ceil();
    let highest = (max * scale).floor();
    let mut index = (value * scale).round();
    if lowest <= highest {
        index = index.clamp(lowest, highest);
    }
    index / scale
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_standardizes_negative_size() {
        let rect = Rect::new(10.0, 10.0, -4.0, -6.0);
        assert_eq!(rect.min_x(), 6.0);
        assert_eq!(rect.min_y(), 4.0);
        assert_eq!(rect.max_x(), 10.0);
        assert_eq!(rect.max_y(), 10.0);
    }

    #[test]
    fn test_clamp_to_region() {
        let region = ActiveRegion::new(Rect::new(0.0, 0.0, 100.0, 50.0));
        let p = region.clamp_and_snap(Point::new(-20.0, 80.0), 1.0);
        assert_eq!(p, Point::new(0.0, 50.0));
    }

    #[test]
    fn test_snap_on_retina() {
        let region = ActiveRegion::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        // 10.3 * 2 = 20.6 -> 21 -> 10.5
        let p = region.clamp_and_snap(Point::new(10.3, 10.2), 2.0);
        assert_eq!(p, Point::new(10.5, 10.0));
    }

    #[test]
    fn test_snap_half_rounds_away_from_zero() {
        assert_eq!(snap_to_pixel_grid(2.5, 1.0), 3.0);
        assert_eq!(snap_to_pixel_grid(-2.5, 1.0), -3.0);
        assert_eq!(round_to_pixel(0.5), 1);
    }

    #[test]
    fn test_snap_stays_inside_unaligned_region() {
        // max 10.6 : arrondi simple donnerait 11 / plain rounding would give 11
        let region = ActiveRegion::new(Rect::new(0.4, 0.0, 10.2, 5.0));
        let p = region.clamp_and_snap(Point::new(50.0, 2.0), 1.0);
        assert_eq!(p.x, 10.0);
        let p = region.clamp_and_snap(Point::new(-50.0, 2.0), 1.0);
        assert_eq!(p.x, 1.0);
    }

    #[test]
    fn test_nan_goes_to_min() {
        let region = ActiveRegion::new(Rect::new(3.0, 4.0, 10.0, 10.0));
        let p = region.clamp_and_snap(Point::new(f64::NAN, f64::NAN), 1.0);
        assert_eq!(p, Point::new(3.0, 4.0));
    }

    #[test]
    fn test_region_to_pixels() {
        let region = ActiveRegion::new(Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(region.to_pixels(2.0), PixelRect::new(2, 4, 8, 12));
    }

    #[test]
    fn test_pixel_rect_intersect() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(5, -5, 20, 3);
        assert_eq!(a.intersect(&b), PixelRect::new(5, 0, 10, 3));
        assert!(PixelRect::new(0, 0, 0, 5).is_empty());
    }

    #[test]
    fn test_pixel_extent_rounds_up() {
        assert_eq!(Rect::new(0.0, 0.0, 10.25, 3.0).pixel_extent(2.0), (21, 6));
    }
}
