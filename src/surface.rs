//! =============================================================================
//! SURFACE.RS - Instantané de pixels et décodage
//! SURFACE.RS - Pixel snapshot and decoding
//! =============================================================================
//!
//! A `PixelSurface` is the single read-only snapshot taken when a picker
//! session starts. Every sample of the session reads from it.
//! Un `PixelSurface` est l'instantané unique pris au début d'une session.

use crate::common::Color;
use crate::error::{CaptureError, Result};
use crate::geometry::PixelRect;

// =============================================================================
// FORMAT DES PIXELS
// PIXEL FORMAT
// =============================================================================

/// Ordre des canaux dans un pixel / Channel order inside a pixel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelOrder {
    /// Rouge en premier, alpha en dernier / Red first, alpha last
    Rgba,
    /// Bleu en premier (format natif Core Graphics et GDI) / Blue first (native CG and GDI)
    Bgra,
    Rgb,
    Bgr,
}

impl ChannelOrder {
    /// Nombre de canaux significatifs / Number of meaningful channels
    pub const fn channels(self) -> usize {
        match self {
            Self::Rgba | Self::Bgra => 4,
            Self::Rgb | Self::Bgr => 3,
        }
    }

    /// Position de l'alpha dans le pixel, s'il y en a un
    /// Alpha position inside the pixel, if any
    pub const fn alpha_index(self) -> Option<usize> {
        match self {
            Self::Rgba | Self::Bgra => Some(3),
            Self::Rgb | Self::Bgr => None,
        }
    }
}

/// Traitement de l'alpha au décodage / Alpha handling at decode time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaMode {
    /// Alpha ignoré, la surface est opaque / Alpha ignored, the surface is opaque
    #[default]
    Opaque,
    /// Alpha non prémultiplié, ignoré au décodage / Straight alpha, ignored at decode
    Straight,
    /// Canaux prémultipliés par l'alpha / Channels premultiplied by alpha
    Premultiplied,
}

/// Disposition d'un pixel supportée par le décodeur
/// Pixel layout supported by the decoder
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Layout {
    /// Canal 0 = rouge / Channel 0 = red
    RedFirst { alpha: Option<usize> },
    /// Canal 0 = bleu / Channel 0 = blue
    BlueFirst { alpha: Option<usize> },
}

impl Layout {
    /// Seules les dispositions à 3 ou 4 octets par pixel sont supportées
    /// Only 3 or 4 bytes-per-pixel layouts are supported
    fn classify(order: ChannelOrder, bytes_per_pixel: usize) -> Option<Self> {
        if !(3..=4).contains(&bytes_per_pixel) || order.channels() > bytes_per_pixel {
            return None;
        }
        let alpha = order.alpha_index();
        match order {
            ChannelOrder::Rgba | ChannelOrder::Rgb => Some(Self::RedFirst { alpha }),
            ChannelOrder::Bgra | ChannelOrder::Bgr => Some(Self::BlueFirst { alpha }),
        }
    }
}

// =============================================================================
// DÉCODAGE
// DECODING
// =============================================================================

/// Décode le pixel (x, y) d'un buffer brut en couleur normalisée
/// Decodes pixel (x, y) of a raw buffer into a normalized color
///
/// The byte offset is `y * row_stride + x * bytes_per_pixel`. Unsupported
/// layouts and offsets past the end of the buffer decode to black instead of
/// failing, so one odd pixel never aborts a gesture.
pub fn decode_pixel(
    bytes: &[u8],
    row_stride: usize,
    bytes_per_pixel: usize,
    order: ChannelOrder,
    alpha_mode: AlphaMode,
    x: usize,
    y: usize,
) -> Color {
    let Some(layout) = Layout::classify(order, bytes_per_pixel) else {
        return Color::BLACK;
    };

    let pixel = y
        .checked_mul(row_stride)
        .and_then(|row| x.checked_mul(bytes_per_pixel).and_then(|col| row.checked_add(col)))
        .and_then(|offset| bytes.get(offset..offset.checked_add(bytes_per_pixel)?));
    let Some(pixel) = pixel else {
        return Color::BLACK;
    };

    let (r, g, b, alpha) = match layout {
        Layout::RedFirst { alpha } => (pixel[0], pixel[1], pixel[2], alpha.map(|i| pixel[i])),
        Layout::BlueFirst { alpha } => (pixel[2], pixel[1], pixel[0], alpha.map(|i| pixel[i])),
    };

    match (alpha_mode, alpha) {
        (AlphaMode::Premultiplied, Some(0)) => Color::BLACK,
        (AlphaMode::Premultiplied, Some(a)) if a < u8::MAX => {
            let a = f64::from(a);
            let unpremultiply = |c: u8| (f64::from(c) / a).min(1.0);
            Color::new(unpremultiply(r), unpremultiply(g), unpremultiply(b))
        }
        _ => Color::from_rgb8(r, g, b),
    }
}

// =============================================================================
// SURFACE
// =============================================================================

/// Instantané immuable de pixels rendus
/// Immutable snapshot of rendered pixels
///
/// `width` and `height` are physical pixels (already multiplied by the scale
/// factor). The buffer holds exactly `height * bytes_per_row` bytes and is
/// owned by the surface alone.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelSurface {
    width: usize,
    height: usize,
    bytes_per_row: usize,
    bytes_per_pixel: usize,
    channel_order: ChannelOrder,
    alpha_mode: AlphaMode,
    scale_factor: f64,
    bytes: Box<[u8]>,
}

impl PixelSurface {
    /// Crée une surface en vérifiant ses dimensions
    /// Creates a surface, checking its dimensions
    pub fn new(
        width: usize,
        height: usize,
        bytes_per_row: usize,
        bytes_per_pixel: usize,
        channel_order: ChannelOrder,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(CaptureError::EmptySurface { width, height });
        }
        let minimum = width.saturating_mul(bytes_per_pixel);
        if bytes_per_row < minimum {
            return Err(CaptureError::RowStride {
                bytes_per_row,
                minimum,
            });
        }
        let expected = height.saturating_mul(bytes_per_row);
        if bytes.len() != expected {
            return Err(CaptureError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bytes_per_row,
            bytes_per_pixel,
            channel_order,
            alpha_mode: AlphaMode::Opaque,
            scale_factor: 1.0,
            bytes: bytes.into_boxed_slice(),
        })
    }

    /// Surface compacte (sans remplissage de ligne)
    /// Tightly packed surface (no row padding)
    pub fn packed(
        width: usize,
        height: usize,
        channel_order: ChannelOrder,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let bytes_per_pixel = channel_order.channels();
        Self::new(
            width,
            height,
            width.saturating_mul(bytes_per_pixel),
            bytes_per_pixel,
            channel_order,
            bytes,
        )
    }

    pub fn with_alpha_mode(mut self, alpha_mode: AlphaMode) -> Self {
        self.alpha_mode = alpha_mode;
        self
    }

    /// Facteur d'échelle de la capture / Capture scale factor
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Result<Self> {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return Err(CaptureError::InvalidScale(scale_factor));
        }
        self.scale_factor = scale_factor;
        Ok(self)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.bytes_per_pixel
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Limites de la surface en pixels / Surface bounds in pixels
    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width as i64, self.height as i64)
    }

    /// Couleur du pixel (x, y), ou `None` hors de la surface
    /// Color of pixel (x, y), or `None` outside the surface
    pub fn pixel(&self, x: i64, y: i64) -> Option<Color> {
        if !self.bounds().contains(x, y) {
            return None;
        }
        Some(decode_pixel(
            &self.bytes,
            self.bytes_per_row,
            self.bytes_per_pixel,
            self.channel_order,
            self.alpha_mode,
            x as usize,
            y as usize,
        ))
    }

    /// Comme `pixel`, avec noir hors de la surface
    /// Like `pixel`, with black outside the surface
    pub fn color_at(&self, x: i64, y: i64) -> Color {
        self.pixel(x, y).unwrap_or(Color::BLACK)
    }
}

// =============================================================================
// TESTS
// =============================================================================
