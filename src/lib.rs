// =============================================================================
// lib.rs - Loupe de sélection de couleur
// lib.rs - Magnifying color picker
// =============================================================================
//
// Capture une surface rendue une seule fois, puis suit le pointeur avec une
// grille agrandie de pixels et renvoie la couleur du pixel central.
// Captures a rendered surface once, then follows the pointer with a magnified
// grid of pixels and returns the color of the center pixel.

// =============================================================================
// MODULES
// =============================================================================

/// Configuration partagée (constantes et réglages)
/// Shared configuration (constants and settings)
pub mod config;

/// Types communs (couleur, formatage)
/// Common types (color, formatting)
pub mod common;

/// Types d'erreur
/// Error types
pub mod error;

/// Géométrie et correspondance logique / pixel
/// Geometry and logical / pixel mapping
pub mod geometry;

/// Instantané de pixels et décodage
/// Pixel snapshot and decoding
pub mod surface;

/// Capture d'une source rendue (et sources écran par plateforme)
/// Capturing a rendered source (and per-platform screen sources)
pub mod capture;

/// Grille d'échantillons
/// Sample grid
pub mod grid;

/// Modèle d'affichage de la loupe
/// Magnifier display model
pub mod view;

/// Machine à états de la session
/// Session state machine
pub mod session;

pub use capture::{capture, Canvas, DrawSource, RasterSource, SurfaceProvider};
pub use common::Color;
pub use config::MagnifierConfig;
pub use error::{CaptureError, ConfigError};
pub use geometry::{ActiveRegion, Point, Rect, Size};
pub use grid::{grid_size, SampleGrid};
pub use session::{PickerSession, PickerState, PixelMagnifier, PointerEvent, SessionHandle};
pub use surface::{AlphaMode, ChannelOrder, PixelSurface};
pub use view::MagnifierView;
