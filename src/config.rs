//! Configuration constants and settings for the magnifier
//! Constantes de configuration et réglages de la loupe
//!
//! These values control the appearance and behavior of the magnifier.
//! Ces valeurs contrôlent l'apparence et le comportement de la loupe.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid;

// =============================================================================
// CONSTANTES PAR DÉFAUT
// DEFAULT CONSTANTS
// =============================================================================

/// Diameter of the magnified content area (in logical points)
/// The grid is sized so that its cells cover this diameter
/// Diamètre de la zone agrandie (en points logiques)
pub const CONTENT_DIAMETER: f64 = 220.0;

/// Side length of one magnified cell (in logical points)
/// Côté d'une cellule agrandie (en points logiques)
pub const CELL_SIZE: f64 = 18.0;

/// Gap between two neighbouring cells (in logical points)
/// Espace entre deux cellules voisines (en points logiques)
pub const CELL_SPACING: f64 = 2.0;

/// Thickness of the colored ring around the magnifier (in logical points)
/// This ring displays the current color being picked
/// Épaisseur de l'anneau coloré autour de la loupe
pub const RING_WIDTH: f64 = 20.0;

/// Thickness of the highlighted border around the center cell
/// Épaisseur de la bordure autour de la cellule centrale
pub const CENTER_BORDER_WIDTH: f64 = 2.0;

/// Duration of the appear / dismiss transition, in seconds
/// Durée de la transition d'apparition / disparition, en secondes
pub const TRANSITION_SECS: f64 = 0.25;

/// Scale of the magnifier at the start of the appear transition
/// Échelle de la loupe au début de la transition d'apparition
pub const TRANSITION_INITIAL_SCALE: f64 = 0.1;

/// Largest surface a single capture may allocate, in pixels (16384 × 16384)
/// Plus grande surface qu'une capture peut allouer, en pixels
pub const MAX_SURFACE_PIXELS: usize = 1 << 28;

/// Largest accepted number of cells per side (odd)
/// The default geometry gives 11, like the classic 11 captured pixels
/// Nombre maximal de cellules par côté (impair)
pub const MAX_GRID_SIZE: usize = 101;

// =============================================================================
// RÉGLAGES
// SETTINGS
// =============================================================================

/// Réglages de la loupe, chargeables depuis du JSON
/// Magnifier settings, loadable from JSON
///
/// Every field falls back to the constant of the same name when missing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MagnifierConfig {
    /// Diamètre de la zone agrandie / Magnified area diameter
    pub content_diameter: f64,

    /// Taille d'une cellule / Cell size
    pub cell_size: f64,

    /// Espace entre cellules / Cell spacing
    pub cell_spacing: f64,

    /// Épaisseur de l'anneau / Ring width
    pub ring_width: f64,

    /// Épaisseur de la bordure centrale / Center border width
    pub center_border_width: f64,

    /// Durée de transition en secondes / Transition duration in seconds
    pub transition_secs: f64,

    /// Échelle initiale de transition / Initial transition scale
    pub transition_initial_scale: f64,
}

impl Default for MagnifierConfig {
    fn default() -> Self {
        Self {
            content_diameter: CONTENT_DIAMETER,
            cell_size: CELL_SIZE,
            cell_spacing: CELL_SPACING,
            ring_width: RING_WIDTH,
            center_border_width: CENTER_BORDER_WIDTH,
            transition_secs: TRANSITION_SECS,
            transition_initial_scale: TRANSITION_INITIAL_SCALE,
        }
    }
}

impl MagnifierConfig {
    /// Charge et valide des réglages depuis une chaîne JSON
    /// Loads and validates settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Charge et valide des réglages depuis un fichier JSON
    /// Loads and validates settings from a JSON file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Vérifie que la géométrie est utilisable
    /// Checks that the geometry is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("content_diameter", self.content_diameter),
            ("cell_size", self.cell_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        let non_negative = [
            ("cell_spacing", self.cell_spacing),
            ("ring_width", self.ring_width),
            ("center_border_width", self.center_border_width),
            ("transition_secs", self.transition_secs),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(format!(
                    "{name} must be zero or positive, got {value}"
                )));
            }
        }

        let cells = self.content_diameter / (self.cell_size + self.cell_spacing);
        if cells > MAX_GRID_SIZE as f64 {
            return Err(ConfigError::invalid(format!(
                "content_diameter / (cell_size + cell_spacing) is {cells}, at most {MAX_GRID_SIZE} cells per side are supported"
            )));
        }

        if !(self.transition_initial_scale > 0.0 && self.transition_initial_scale <= 1.0) {
            return Err(ConfigError::invalid(format!(
                "transition_initial_scale must be in (0, 1], got {}",
                self.transition_initial_scale
            )));
        }
        Ok(())
    }

    /// Nombre de cellules par côté (toujours impair)
    /// Number of cells per side (always odd)
    pub fn grid_size(&self) -> usize {
        grid::grid_size(self.content_diameter, self.cell_size, self.cell_spacing)
    }

    /// Durée de transition / Transition duration
    pub fn transition_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.transition_secs).unwrap_or(Duration::ZERO)
    }
}

// =============================================================================
// TESTS
// =============================================================================
