//! =============================================================================
//! VIEW.RS - Modèle d'affichage de la loupe
//! VIEW.RS - Magnifier display model
//! =============================================================================
//!
//! Décrit ce que l'hôte doit dessiner : les cellules agrandies, l'anneau
//! coloré avec le code hexadécimal et la bordure de la cellule centrale.
//! Describes what the host has to draw: the magnified cells, the colored ring
//! with the hex code and the border of the center cell.
//!
//! Layer frames are relative to the magnifier center. The host positions the
//! whole magnifier at `MagnifierView::position()`.

use std::time::Duration;

use crate::common::Color;
use crate::config::MagnifierConfig;
use crate::geometry::{Point, Rect, Size};
use crate::grid::SampleGrid;

// =============================================================================
// TRANSITION
// =============================================================================

/// Sens de la transition / Transition direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    Appear,
    Dismiss,
}

/// Transition échelle + opacité, purement cosmétique
/// Scale + opacity transition, purely cosmetic
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    kind: TransitionKind,
    duration: Duration,
    elapsed: Duration,
    initial_scale: f64,
}

impl Transition {
    pub fn appear(duration: Duration, initial_scale: f64) -> Self {
        Self {
            kind: TransitionKind::Appear,
            duration,
            elapsed: Duration::ZERO,
            initial_scale,
        }
    }

    pub fn dismiss(duration: Duration, initial_scale: f64) -> Self {
        Self {
            kind: TransitionKind::Dismiss,
            ..Self::appear(duration, initial_scale)
        }
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Avancement linéaire dans [0, 1] / Linear progress in [0, 1]
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// 0 = caché, 1 = entièrement visible / 0 = hidden, 1 = fully shown
    fn shown(&self) -> f64 {
        let t = self.progress();
        match self.kind {
            TransitionKind::Appear => ease_out(t),
            TransitionKind::Dismiss => 1.0 - ease_in(t),
        }
    }

    pub fn scale(&self) -> f64 {
        self.initial_scale + (1.0 - self.initial_scale) * self.shown()
    }

    pub fn opacity(&self) -> f64 {
        self.shown()
    }
}

fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn ease_in(t: f64) -> f64 {
    t.powi(3)
}

// =============================================================================
// CALQUES
// LAYERS
// =============================================================================

/// Une cellule agrandie / One magnified cell
#[derive(Clone, Debug, PartialEq)]
pub struct CellLayer {
    pub frame: Rect,
    pub fill: Color,
}

/// Anneau d'aperçu de la couleur sélectionnée
/// Preview ring of the selected color
#[derive(Clone, Debug, PartialEq)]
pub struct RingLayer {
    /// Carré englobant le cercle extérieur / Square bounding the outer circle
    pub frame: Rect,
    pub width: f64,
    pub fill: Color,
    /// Code "#RRGGBB" dessiné le long de l'anneau / drawn along the ring
    pub label: String,
    pub label_color: Color,
}

/// Bordure autour de la cellule centrale / Border around the center cell
#[derive(Clone, Debug, PartialEq)]
pub struct CenterBorder {
    pub frame: Rect,
    pub width: f64,
    pub stroke: Color,
}

/// État de présentation de la loupe / Magnifier presentation state
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Presentation {
    pub visible: bool,
    pub scale: f64,
    pub opacity: f64,
}

// =============================================================================
// VUE
// VIEW
// =============================================================================

/// Modèle retenu de la loupe / Retained magnifier model
#[derive(Clone, Debug)]
pub struct MagnifierView {
    cells: Vec<CellLayer>,
    ring: RingLayer,
    center_border: CenterBorder,
    position: Point,
    transition: Option<Transition>,
    visible: bool,
    revision: u64,
    transition_duration: Duration,
    initial_scale: f64,
}

impl MagnifierView {
    /// Dispose les calques pour une grille de `grid_size` cellules
    /// Lays out the layers for a grid of `grid_size` cells
    pub fn new(config: &MagnifierConfig, grid_size: usize) -> Self {
        let pitch = config.cell_size + config.cell_spacing;
        let extent = grid_size as f64 * pitch - config.cell_spacing;
        let start = -extent / 2.0;

        let cells = (0..grid_size * grid_size)
            .map(|i| {
                let (row, col) = (i / grid_size, i % grid_size);
                CellLayer {
                    frame: Rect::new(
                        start + col as f64 * pitch,
                        start + row as f64 * pitch,
                        config.cell_size,
                        config.cell_size,
                    ),
                    fill: Color::BLACK,
                }
            })
            .collect();

        let outer = config.content_diameter + 2.0 * config.ring_width;
        let ring = RingLayer {
            frame: Rect::centered(Point::default(), Size::new(outer, outer)),
            width: config.ring_width,
            fill: Color::BLACK,
            label: Color::BLACK.hex(),
            label_color: Color::WHITE,
        };

        let border = config.center_border_width;
        let side = config.cell_size + 2.0 * border;
        let center_border = CenterBorder {
            frame: Rect::centered(Point::default(), Size::new(side, side)),
            width: border,
            stroke: Color::WHITE,
        };

        Self {
            cells,
            ring,
            center_border,
            position: Point::default(),
            transition: None,
            visible: false,
            revision: 0,
            transition_duration: config.transition_duration(),
            initial_scale: config.transition_initial_scale,
        }
    }

    /// Applique un rééchantillonnage en une seule mise à jour
    /// Applies one resample as a single update
    ///
    /// Every cell fill, the ring and the center border change together and
    /// immediately; color changes are never animated.
    pub fn apply_samples(&mut self, grid: &SampleGrid, focal: Point) {
        debug_assert_eq!(grid.cells().len(), self.cells.len());
        for (layer, color) in self.cells.iter_mut().zip(grid.cells()) {
            layer.fill = *color;
        }

        let selected = grid.selected();
        let stroke = selected.contrast_stroke();
        self.ring.fill = selected;
        self.ring.label = selected.hex();
        self.ring.label_color = stroke;
        self.center_border.stroke = stroke;
        self.position = focal;
        self.revision += 1;
    }

    /// Démarre la transition d'apparition / Starts the appear transition
    pub fn begin_appear(&mut self) {
        self.visible = true;
        self.transition = Some(Transition::appear(
            self.transition_duration,
            self.initial_scale,
        ));
    }

    /// Démarre la transition de disparition / Starts the dismiss transition
    pub fn begin_dismiss(&mut self) {
        self.transition = Some(Transition::dismiss(
            self.transition_duration,
            self.initial_scale,
        ));
    }

    /// Avance la transition en cours ; renvoie celle qui vient de se terminer
    /// Advances the running transition; returns the one that just finished
    pub fn advance(&mut self, dt: Duration) -> Option<TransitionKind> {
        let transition = self.transition.as_mut()?;
        transition.advance(dt);
        if !transition.is_finished() {
            return None;
        }
        let kind = transition.kind();
        self.transition = None;
        if kind == TransitionKind::Dismiss {
            self.visible = false;
        }
        Some(kind)
    }

    pub fn presentation(&self) -> Presentation {
        match (&self.transition, self.visible) {
            (_, false) => Presentation {
                visible: false,
                scale: self.initial_scale,
                opacity: 0.0,
            },
            (Some(transition), true) => Presentation {
                visible: true,
                scale: transition.scale(),
                opacity: transition.opacity(),
            },
            (None, true) => Presentation {
                visible: true,
                scale: 1.0,
                opacity: 1.0,
            },
        }
    }

    pub fn cells(&self) -> &[CellLayer] {
        &self.cells
    }

    pub fn ring(&self) -> &RingLayer {
        &self.ring
    }

    pub fn center_border(&self) -> &CenterBorder {
        &self.center_border
    }

    /// Centre de la loupe, en coordonnées logiques / Magnifier center, logical
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    /// Nombre de mises à jour appliquées / Number of applied updates
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{ChannelOrder, PixelSurface};
    use crate::geometry::ActiveRegion;

    fn config() -> MagnifierConfig {
        MagnifierConfig {
            content_diameter: 60.0,
            cell_size: 18.0,
            cell_spacing: 2.0,
            ..MagnifierConfig::default()
        }
    }

    #[test]
    fn test_layout_is_centered() {
        let view = MagnifierView::new(&config(), 3);
        assert_eq!(view.cells().len(), 9);
        // extent = 3 * 20 - 2 = 58
        assert_eq!(view.cells()[0].frame, Rect::new(-29.0, -29.0, 18.0, 18.0));
        assert_eq!(view.cells()[4].frame, Rect::new(-9.0, -9.0, 18.0, 18.0));
        assert_eq!(view.center_border().frame, Rect::new(-11.0, -11.0, 22.0, 22.0));
        assert_eq!(view.ring().frame, Rect::new(-50.0, -50.0, 100.0, 100.0));
    }

    #[test]
    fn test_apply_samples_is_one_batch() {
        let surface = PixelSurface::packed(1, 1, ChannelOrder::Rgb, vec![255, 255, 255]).unwrap();
        let region = ActiveRegion::new(Rect::new(0.0, 0.0, 1.0, 1.0));
        let mut grid = SampleGrid::new(3);
        grid.resample(&surface, &region, Point::new(0.0, 0.0));

        let mut view = MagnifierView::new(&config(), 3);
        view.apply_samples(&grid, Point::new(0.0, 0.0));
        assert_eq!(view.revision(), 1);
        assert_eq!(view.cells()[4].fill, Color::WHITE);
        assert_eq!(view.cells()[0].fill, Color::BLACK);
        assert_eq!(view.ring().fill, Color::WHITE);
        assert_eq!(view.ring().label, "#FFFFFF");
        assert_eq!(view.center_border().stroke, Color::BLACK);
        // Aucune transition implicite / No implicit transition
        assert!(view.transition().is_none());
    }

    #[test]
    fn test_appear_then_dismiss() {
        let mut view = MagnifierView::new(&config(), 3);
        assert!(!view.presentation().visible);

        view.begin_appear();
        let start = view.presentation();
        assert!(start.visible);
        assert!((start.scale - 0.1).abs() < 1e-9);
        assert_eq!(start.opacity, 0.0);

        assert_eq!(view.advance(Duration::from_millis(100)), None);
        let mid = view.presentation();
        assert!(mid.scale > 0.1 && mid.scale < 1.0);

        assert_eq!(view.advance(Duration::from_millis(150)), Some(TransitionKind::Appear));
        assert_eq!(view.presentation().scale, 1.0);
        assert_eq!(view.presentation().opacity, 1.0);

        view.begin_dismiss();
        assert_eq!(view.advance(Duration::from_secs(1)), Some(TransitionKind::Dismiss));
        assert!(!view.presentation().visible);
    }

    #[test]
    fn test_zero_duration_finishes_on_first_tick() {
        let config = MagnifierConfig {
            transition_secs: 0.0,
            ..config()
        };
        let mut view = MagnifierView::new(&config, 3);
        view.begin_appear();
        assert_eq!(view.advance(Duration::ZERO), Some(TransitionKind::Appear));
    }
}
