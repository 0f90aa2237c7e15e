//! =============================================================================
//! COMMON.RS - Types partagés
//! COMMON.RS - Shared types
//! =============================================================================
//!
//! Ce module contient la couleur normalisée renvoyée par la loupe et les
//! fonctions de formatage associées.
//! This module contains the normalized color returned by the magnifier and
//! the related formatting functions.

use bigcolor::BigColor;
use serde::{Deserialize, Serialize};

// =============================================================================
// COULEUR
// COLOR
// =============================================================================

/// Couleur RGB avec des canaux normalisés dans [0, 1]
/// RGB color with channels normalized to [0, 1]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    /// Composante rouge / Red component
    pub r: f64,
    /// Composante verte / Green component
    pub g: f64,
    /// Composante bleue / Blue component
    pub b: f64,
}

impl Color {
    /// Noir, aussi utilisé comme sentinelle "pas de données"
    /// Black, also used as the "no data" sentinel
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    /// Blanc / White
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Construit une couleur depuis des octets (0-255)
    /// Builds a color from bytes (0-255)
    #[inline]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        )
    }

    /// Convertit en octets (0-255), arrondi au plus proche
    /// Converts to bytes (0-255), rounded to nearest
    #[inline]
    pub fn to_rgb8(self) -> (u8, u8, u8) {
        fn channel(c: f64) -> u8 {
            (c.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        (channel(self.r), channel(self.g), channel(self.b))
    }

    /// Formate en "#RRGGBB" / Formats as "#RRGGBB"
    pub fn hex(self) -> String {
        let (r, g, b) = self.to_rgb8();
        format_hex_color(r, g, b)
    }

    /// Indique si la couleur est sombre (texte clair par-dessus)
    /// Tells whether the color is dark (light text on top of it)
    pub fn is_dark(self) -> bool {
        let (r, g, b) = self.to_rgb8();
        BigColor::from_rgb(r, g, b, 1.0).is_dark()
    }

    /// Couleur de contraste à dessiner par-dessus (noir ou blanc)
    /// Contrast color to draw on top (black or white)
    pub fn contrast_stroke(self) -> Self {
        if self.is_dark() {
            Self::WHITE
        } else {
            Self::BLACK
        }
    }
}

// =============================================================================
// FONCTIONS DE FORMATAGE
// FORMATTING FUNCTIONS
// =============================================================================

/// Formate une couleur RGB en chaîne hexadécimale
/// Formats an RGB color as a hex string
///
/// # Returns
/// Chaîne au format "#RRGGBB" / String in "#RRGGBB" format
#[inline]
pub fn format_hex_color(r: u8, g: u8, b: u8) -> String {
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

// =============================================================================
// TESTS
// =============================================================================
