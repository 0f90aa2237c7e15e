//! =============================================================================
//! MACOS.RS - Capture d'écran macOS
//! MACOS.RS - macOS screen capture
//! =============================================================================
//!
//! Capture une zone de l'écran principal avec Core Graphics. Les données
//! CGImage sont stockées en BGRA, origine en HAUT à gauche.
//! Captures an area of the main display with Core Graphics. CGImage data is
//! stored as BGRA with the origin at the TOP-left.

use core_graphics::display::CGDisplay;
use core_graphics::geometry::{CGPoint, CGRect, CGSize};
use objc2_app_kit::NSScreen;
use objc2_foundation::MainThreadMarker;
use tracing::warn;

use super::{Canvas, SurfaceProvider};
use crate::error::{CaptureError, Result};
use crate::geometry::Rect;
use crate::surface::ChannelOrder;

/// Zone de l'écran principal, en points (origine en haut à gauche)
/// Area of the main display, in points (origin at the top-left)
#[derive(Clone, Copy, Debug)]
pub struct ScreenSource {
    rect: Rect,
}

impl ScreenSource {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// Tout l'écran principal / The whole main display
    pub fn main_display() -> Self {
        let bounds = CGDisplay::main().bounds();
        Self::new(Rect::new(
            bounds.origin.x,
            bounds.origin.y,
            bounds.size.width,
            bounds.size.height,
        ))
    }
}

/// Facteur d'échelle de l'écran principal (2.0 pour Retina)
/// Main screen scale factor (2.0 for Retina)
fn main_screen_scale() -> Option<f64> {
    let mtm = MainThreadMarker::new()?;
    let screen = NSScreen::mainScreen(mtm)?;
    Some(screen.backingScaleFactor())
}

impl SurfaceProvider for ScreenSource {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn scale_factor(&self) -> f64 {
        main_screen_scale().unwrap_or_else(|| {
            // Hors du thread principal : déduit de la taille en pixels
            // Off the main thread: derive from the pixel size
            let display = CGDisplay::main();
            let points = display.bounds().size.width;
            if points > 0.0 {
                display.pixels_wide() as f64 / points
            } else {
                1.0
            }
        })
    }

    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Bgra
    }

    fn render(&self, canvas: &mut Canvas) -> Result<()> {
        let rect = CGRect::new(
            &CGPoint::new(self.rect.min_x(), self.rect.min_y()),
            &CGSize::new(self.rect.size.width, self.rect.size.height),
        );

        // Capture l'image dans le rectangle spécifié
        // Capture the image in the specified rectangle
        let image = CGDisplay::main()
            .image_for_rect(rect)
            .ok_or_else(|| CaptureError::Unavailable("CGDisplay returned no image".into()))?;

        if image.bits_per_pixel() != 32 {
            return Err(CaptureError::render(format!(
                "unsupported pixel depth: {} bits",
                image.bits_per_pixel()
            )));
        }

        let data = image.data();
        let bytes = data.bytes();
        let bytes_per_row = image.bytes_per_row();
        let cols = canvas.width().min(image.width());
        let rows = canvas.height().min(image.height());
        if cols < canvas.width() || rows < canvas.height() {
            warn!(
                image_width = image.width(),
                image_height = image.height(),
                canvas_width = canvas.width(),
                canvas_height = canvas.height(),
                "screen image smaller than requested area"
            );
        }

        for y in 0..rows {
            let start = y * bytes_per_row;
            if let Some(row) = bytes.get(start..start + cols * 4) {
                canvas.copy_row(y, row);
            }
        }
        Ok(())
    }
}
