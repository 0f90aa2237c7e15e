// =============================================================================
// capture/mod.rs - Capture d'une surface rendue / Capturing a rendered surface
// =============================================================================
//
// L'hôte fournit une source qui sait se dessiner dans un buffer hors écran.
// La capture a lieu une seule fois par session.
// The host supplies a source that can draw itself into an off-screen buffer.
// Capture happens once per session.

use tracing::debug;

use crate::common::Color;
use crate::config::MAX_SURFACE_PIXELS;
use crate::error::{CaptureError, Result};
use crate::geometry::Rect;
use crate::surface::{AlphaMode, ChannelOrder, PixelSurface};

/// Implémentation macOS (Core Graphics)
/// macOS implementation (Core Graphics)
#[cfg(target_os = "macos")]
pub mod macos;

/// Implémentation Windows (GDI)
/// Windows implementation (GDI)
#[cfg(target_os = "windows")]
pub mod windows;

// =============================================================================
// SOURCE
// =============================================================================

/// Source de pixels fournie par l'hôte
/// Pixel source supplied by the host
pub trait SurfaceProvider {
    /// Rectangle englobant, en coordonnées logiques
    /// Bounding rectangle, in logical coordinates
    ///
    /// Only the size decides the captured extent. The surface, the active
    /// region and the focal point all measure from its top-left corner.
    fn bounds(&self) -> Rect;

    /// Densité de pixels de l'écran (2.0 pour Retina)
    /// Display pixel density (2.0 for Retina)
    fn scale_factor(&self) -> f64;

    /// Ordre des canaux du buffer à remplir
    /// Channel order of the buffer to fill
    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Rgba
    }

    /// Dessine tout le contenu dans le canevas (appelé une seule fois)
    /// Draws the whole content into the canvas (called once)
    fn render(&self, canvas: &mut Canvas) -> Result<()>;
}

// =============================================================================
// CANEVAS
// CANVAS
// =============================================================================

/// Buffer hors écran opaque dans lequel une source se dessine
/// Opaque off-screen buffer a source draws into
///
/// Starts opaque black. Coordinates passed to the drawing helpers are
/// physical pixels, origin at the top-left of the source bounds.
#[derive(Debug)]
pub struct Canvas {
    width: usize,
    height: usize,
    channel_order: ChannelOrder,
    scale_factor: f64,
    bytes: Vec<u8>,
}

impl Canvas {
    fn new(
        width: usize,
        height: usize,
        channel_order: ChannelOrder,
        scale_factor: f64,
    ) -> Result<Self> {
        let too_large = CaptureError::TooLarge {
            width,
            height,
            limit: MAX_SURFACE_PIXELS,
        };
        let len = match width.checked_mul(height) {
            Some(pixels) if pixels <= MAX_SURFACE_PIXELS => pixels * channel_order.channels(),
            _ => return Err(too_large),
        };
        let mut canvas = Self {
            width,
            height,
            channel_order,
            scale_factor,
            bytes: vec![0; len],
        };
        canvas.fill(Color::BLACK);
        Ok(canvas)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    pub fn bytes_per_row(&self) -> usize {
        self.width * self.channel_order.channels()
    }

    /// Accès direct au buffer (lignes compactes, de haut en bas)
    /// Direct buffer access (packed rows, top-down)
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Écrit un pixel, ignoré hors du canevas
    /// Writes one pixel, ignored outside the canvas
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let bpp = self.channel_order.channels();
        let offset = y * self.bytes_per_row() + x * bpp;
        let encoded = encode(self.channel_order, color);
        self.bytes[offset..offset + bpp].copy_from_slice(&encoded[..bpp]);
    }

    /// Remplit tout le canevas / Fills the whole canvas
    pub fn fill(&mut self, color: Color) {
        let bpp = self.channel_order.channels();
        let encoded = encode(self.channel_order, color);
        for pixel in self.bytes.chunks_exact_mut(bpp) {
            pixel.copy_from_slice(&encoded[..bpp]);
        }
    }

    /// Remplit un rectangle logique (relatif à l'origine de la source)
    /// Fills a logical rectangle (relative to the source origin)
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let s = self.scale_factor;
        let x0 = (rect.min_x() * s).round().max(0.0) as usize;
        let y0 = (rect.min_y() * s).round().max(0.0) as usize;
        let x1 = ((rect.max_x() * s).round().max(0.0) as usize).min(self.width);
        let y1 = ((rect.max_y() * s).round().max(0.0) as usize).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Copie une ligne d'octets déjà dans l'ordre du canevas
    /// Copies a row of bytes already in the canvas order
    pub fn copy_row(&mut self, y: usize, row: &[u8]) {
        if y >= self.height {
            return;
        }
        let stride = self.bytes_per_row();
        let len = row.len().min(stride);
        let start = y * stride;
        self.bytes[start..start + len].copy_from_slice(&row[..len]);
    }

    fn into_surface(self) -> Result<PixelSurface> {
        let bytes_per_row = self.bytes_per_row();
        PixelSurface::new(
            self.width,
            self.height,
            bytes_per_row,
            self.channel_order.channels(),
            self.channel_order,
            self.bytes,
        )?
        .with_alpha_mode(AlphaMode::Opaque)
        .with_scale_factor(self.scale_factor)
    }
}

/// Encode une couleur dans l'ordre donné, alpha opaque
/// Encodes a color in the given order, opaque alpha
fn encode(order: ChannelOrder, color: Color) -> [u8; 4] {
    let (r, g, b) = color.to_rgb8();
    match order {
        ChannelOrder::Rgba | ChannelOrder::Rgb => [r, g, b, u8::MAX],
        ChannelOrder::Bgra | ChannelOrder::Bgr => [b, g, r, u8::MAX],
    }
}

// =============================================================================
// CAPTURE
// =============================================================================

/// Rend la source une seule fois dans un `PixelSurface` opaque
/// Renders the source once into an opaque `PixelSurface`
///
/// The surface is `ceil(bounds * scale)` pixels in each direction.
pub fn capture(provider: &dyn SurfaceProvider) -> Result<PixelSurface> {
    let scale = provider.scale_factor();
    if !scale.is_finite() || scale <= 0.0 {
        return Err(CaptureError::InvalidScale(scale));
    }

    let bounds = provider.bounds();
    if !(bounds.size.width * scale).is_finite() || !(bounds.size.height * scale).is_finite() {
        return Err(CaptureError::TooLarge {
            width: usize::MAX,
            height: usize::MAX,
            limit: MAX_SURFACE_PIXELS,
        });
    }
    let (width, height) = bounds.pixel_extent(scale);
    if width == 0 || height == 0 {
        return Err(CaptureError::EmptySurface { width, height });
    }

    let mut canvas = Canvas::new(width, height, provider.channel_order(), scale)?;
    provider.render(&mut canvas)?;
    let surface = canvas.into_surface()?;

    debug!(width, height, scale, order = ?surface.channel_order(), "surface captured");
    Ok(surface)
}

// =============================================================================
// SOURCES EN MÉMOIRE
// IN-MEMORY SOURCES
// =============================================================================

/// Source adossée à une image déjà rastérisée
/// Source backed by an already rasterized image
///
/// The image fills the canvas from its top-left corner, so its bounds always
/// start at the origin.
#[derive(Clone, Debug)]
pub struct RasterSource {
    image: PixelSurface,
}

impl RasterSource {
    pub fn new(image: PixelSurface) -> Self {
        Self { image }
    }
}

impl SurfaceProvider for RasterSource {
    fn bounds(&self) -> Rect {
        let scale = self.image.scale_factor();
        Rect::new(
            0.0,
            0.0,
            self.image.width() as f64 / scale,
            self.image.height() as f64 / scale,
        )
    }

    fn scale_factor(&self) -> f64 {
        self.image.scale_factor()
    }

    fn channel_order(&self) -> ChannelOrder {
        self.image.channel_order()
    }

    fn render(&self, canvas: &mut Canvas) -> Result<()> {
        let rows = canvas.height().min(self.image.height());
        let cols = canvas.width().min(self.image.width());
        for y in 0..rows {
            for x in 0..cols {
                canvas.set_pixel(x, y, self.image.color_at(x as i64, y as i64));
            }
        }
        Ok(())
    }
}

/// Source dessinée par une fermeture / Source drawn by a closure
pub struct DrawSource<F> {
    bounds: Rect,
    scale_factor: f64,
    draw: F,
}

impl<F> DrawSource<F>
where
    F: Fn(&mut Canvas) -> Result<()>,
{
    pub fn new(bounds: Rect, scale_factor: f64, draw: F) -> Self {
        Self {
            bounds,
            scale_factor,
            draw,
        }
    }
}

impl<F> SurfaceProvider for DrawSource<F>
where
    F: Fn(&mut Canvas) -> Result<()>,
{
    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    fn render(&self, canvas: &mut Canvas) -> Result<()> {
        (self.draw)(canvas)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Color {
        Color::new(1.0, 0.0, 0.0)
    }

    #[test]
    fn test_capture_scales_dimensions() {
        let source = DrawSource::new(Rect::new(0.0, 0.0, 3.0, 2.0), 2.0, |_| Ok(()));
        let surface = capture(&source).unwrap();
        assert_eq!((surface.width(), surface.height()), (6, 4));
        assert_eq!(surface.scale_factor(), 2.0);
        assert_eq!(surface.bytes().len(), 6 * 4 * 4);
    }

    #[test]
    fn test_capture_starts_opaque_black() {
        let source = DrawSource::new(Rect::new(0.0, 0.0, 1.0, 1.0), 1.0, |_| Ok(()));
        let surface = capture(&source).unwrap();
        assert_eq!(surface.bytes(), &[0, 0, 0, 255]);
    }

    #[test]
    fn test_capture_zero_sized() {
        let source = DrawSource::new(Rect::new(5.0, 5.0, 0.0, 10.0), 1.0, |_| Ok(()));
        assert!(matches!(
            capture(&source),
            Err(CaptureError::EmptySurface { width: 0, .. })
        ));
    }

    #[test]
    fn test_capture_infinite_bounds() {
        let source = DrawSource::new(Rect::new(0.0, 0.0, f64::INFINITY, 10.0), 1.0, |_| Ok(()));
        assert!(matches!(capture(&source), Err(CaptureError::TooLarge { .. })));
    }

    #[test]
    fn test_capture_huge_bounds() {
        // 1e6 × 1e6 points : jamais alloué / never allocated
        let source = DrawSource::new(Rect::new(0.0, 0.0, 1e6, 1e6), 2.0, |_| Ok(()));
        assert!(matches!(
            capture(&source),
            Err(CaptureError::TooLarge { width: 2_000_000, height: 2_000_000, .. })
        ));

        let source = DrawSource::new(Rect::new(0.0, 0.0, 1e300, 1e300), 1.0, |_| Ok(()));
        assert!(matches!(capture(&source), Err(CaptureError::TooLarge { .. })));
    }

    #[test]
    fn test_capture_bad_scale() {
        let source = DrawSource::new(Rect::new(0.0, 0.0, 4.0, 4.0), 0.0, |_| Ok(()));
        assert!(matches!(capture(&source), Err(CaptureError::InvalidScale(_))));
    }

    #[test]
    fn test_render_failure_propagates() {
        let source = DrawSource::new(Rect::new(0.0, 0.0, 4.0, 4.0), 1.0, |_| {
            Err(CaptureError::render("layer not ready"))
        });
        assert!(matches!(capture(&source), Err(CaptureError::Render(_))));
    }

    #[test]
    fn test_fill_rect_in_logical_units() {
        let source = DrawSource::new(Rect::new(0.0, 0.0, 2.0, 2.0), 2.0, |canvas| {
            canvas.fill_rect(Rect::new(1.0, 0.0, 1.0, 1.0), red());
            Ok(())
        });
        let surface = capture(&source).unwrap();
        assert_eq!(surface.color_at(1, 0), Color::BLACK);
        assert_eq!(surface.color_at(2, 0), red());
        assert_eq!(surface.color_at(3, 1), red());
        assert_eq!(surface.color_at(2, 2), Color::BLACK);
    }

    #[test]
    fn test_raster_source_keeps_order() {
        let image = PixelSurface::packed(1, 1, ChannelOrder::Bgr, vec![0, 0, 255]).unwrap();
        let surface = capture(&RasterSource::new(image)).unwrap();
        assert_eq!(surface.channel_order(), ChannelOrder::Bgr);
        assert_eq!(surface.color_at(0, 0), red());
    }

    #[test]
    fn test_raster_bounds_match_region_space() {
        // 4×2 pixels à l'échelle 2 / 4×2 pixels at scale 2
        let mut bytes = [0, 0, 0].repeat(8);
        bytes[3 * 3..3 * 3 + 3].copy_from_slice(&[255, 0, 0]);
        let image = PixelSurface::packed(4, 2, ChannelOrder::Rgb, bytes)
            .unwrap()
            .with_scale_factor(2.0)
            .unwrap();
        let source = RasterSource::new(image);
        assert_eq!(source.bounds(), Rect::new(0.0, 0.0, 2.0, 1.0));

        let surface = capture(&source).unwrap();
        let region = crate::geometry::ActiveRegion::new(source.bounds());
        let pixels = region.to_pixels(surface.scale_factor());
        assert_eq!(pixels, surface.bounds());
        assert_eq!(surface.color_at(3, 0), red());
    }
}
