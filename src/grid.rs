//! Sample grid around the focal point.
//! Grille d'échantillons autour du point focal.

use tracing::trace;

use crate::common::Color;
use crate::config::MAX_GRID_SIZE;
use crate::geometry::{round_to_pixel, ActiveRegion, Point};
use crate::surface::PixelSurface;

/// Nombre de cellules par côté pour un diamètre donné (toujours impair)
/// Number of cells per side for a given diameter (always odd)
///
/// `ceil(content_diameter / (cell_size + cell_spacing))`, bumped to the next
/// odd number so the grid has a single center cell. Degenerate inputs give 1,
/// oversized ones saturate at [`MAX_GRID_SIZE`].
pub fn grid_size(content_diameter: f64, cell_size: f64, cell_spacing: f64) -> usize {
    let cells = content_diameter / (cell_size + cell_spacing);
    if !cells.is_finite() || cells <= 1.0 {
        return 1;
    }
    if cells >= MAX_GRID_SIZE as f64 {
        return MAX_GRID_SIZE;
    }
    let size = cells.ceil() as usize;
    if size % 2 == 0 {
        size + 1
    } else {
        size
    }
}

/// Matrice carrée de couleurs échantillonnées
/// Square matrix of sampled colors
#[derive(Clone, Debug, PartialEq)]
pub struct SampleGrid {
    size: usize,
    cells: Vec<Color>,
    selected: Color,
    center_pixel: (i64, i64),
}

impl SampleGrid {
    /// Grille noire de `size × size` cellules / Black `size × size` grid
    ///
    /// `size` is capped at [`MAX_GRID_SIZE`].
    pub fn new(size: usize) -> Self {
        debug_assert!(size % 2 == 1, "grid size must be odd, got {size}");
        let size = size.min(MAX_GRID_SIZE);
        Self {
            size,
            cells: vec![Color::BLACK; size * size],
            selected: Color::BLACK,
            center_pixel: (0, 0),
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Index de la cellule centrale sur chaque axe
    /// Index of the center cell on each axis
    #[inline]
    pub fn half(&self) -> usize {
        self.size / 2
    }

    /// Cellule (ligne, colonne) / Cell (row, column)
    pub fn get(&self, row: usize, col: usize) -> Option<Color> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.cells.get(row * self.size + col).copied()
    }

    /// Cellules ligne par ligne / Cells in row-major order
    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.cells.chunks_exact(self.size)
    }

    /// Couleur de la cellule centrale / Color of the center cell
    pub fn selected(&self) -> Color {
        self.selected
    }

    /// Pixel de la surface sous la cellule centrale
    /// Surface pixel under the center cell
    pub fn center_pixel(&self) -> (i64, i64) {
        self.center_pixel
    }

    /// Rééchantillonne toute la grille autour du point focal
    /// Resamples the whole grid around the focal point
    ///
    /// Cell `(r, c)` reads pixel `(round(P.x) + c - half, round(P.y) + r - half)`
    /// where `P` is the focal point in surface pixels. Pixels outside the
    /// active region or the surface are black.
    pub fn resample(&mut self, surface: &PixelSurface, region: &ActiveRegion, focal: Point) {
        let scale = surface.scale_factor();
        let center = focal.scaled(scale);
        let cx = round_to_pixel(center.x);
        let cy = round_to_pixel(center.y);
        let allowed = region.to_pixels(scale).intersect(&surface.bounds());
        let half = self.half() as i64;

        for (r, row) in self.cells.chunks_exact_mut(self.size).enumerate() {
            let y = cy + r as i64 - half;
            for (c, cell) in row.iter_mut().enumerate() {
                let x = cx + c as i64 - half;
                *cell = if allowed.contains(x, y) {
                    surface.color_at(x, y)
                } else {
                    Color::BLACK
                };
            }
        }

        let h = self.half();
        self.selected = self.cells[h * self.size + h];
        self.center_pixel = (cx, cy);
        trace!(x = cx, y = cy, selected = %self.selected.hex(), "grid resampled");
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::surface::ChannelOrder;

    /// Surface 5×5 où chaque pixel encode sa position (r = x, g = y)
    /// 5×5 surface where each pixel encodes its position (r = x, g = y)
    fn coordinate_surface() -> PixelSurface {
        let mut bytes = Vec::new();
        for y in 0..5u8 {
            for x in 0..5u8 {
                bytes.extend_from_slice(&[x, y, 200]);
            }
        }
        PixelSurface::packed(5, 5, ChannelOrder::Rgb, bytes).unwrap()
    }

    fn full_region() -> ActiveRegion {
        ActiveRegion::new(Rect::new(0.0, 0.0, 5.0, 5.0))
    }

    #[test]
    fn test_grid_size_is_odd() {
        assert_eq!(grid_size(220.0, 18.0, 2.0), 11);
        assert_eq!(grid_size(200.0, 18.0, 2.0), 11);
        assert_eq!(grid_size(190.0, 18.0, 2.0), 11);
        assert_eq!(grid_size(181.0, 18.0, 2.0), 11);
        assert_eq!(grid_size(180.0, 18.0, 2.0), 9);
    }

    #[test]
    fn test_grid_size_degenerate() {
        assert_eq!(grid_size(0.0, 10.0, 0.0), 1);
        assert_eq!(grid_size(10.0, 0.0, 0.0), 1);
        assert_eq!(grid_size(f64::NAN, 1.0, 1.0), 1);
    }

    #[test]
    fn test_grid_size_saturates() {
        assert_eq!(grid_size(1e12, 1.0, 0.0), MAX_GRID_SIZE);
        assert_eq!(grid_size(f64::MAX, 1.0, 0.0), MAX_GRID_SIZE);
        assert_eq!(SampleGrid::new(1_000_001).size(), MAX_GRID_SIZE);
    }

    #[test]
    fn test_center_reads_focal_pixel() {
        let surface = coordinate_surface();
        let mut grid = SampleGrid::new(3);
        grid.resample(&surface, &full_region(), Point::new(2.0, 3.0));
        assert_eq!(grid.center_pixel(), (2, 3));
        assert_eq!(grid.selected().to_rgb8(), (2, 3, 200));
        // Coin haut gauche = (x-1, y-1) / Top-left corner = (x-1, y-1)
        assert_eq!(grid.get(0, 0).unwrap().to_rgb8(), (1, 2, 200));
        assert_eq!(grid.get(2, 2).unwrap().to_rgb8(), (3, 4, 200));
    }

    #[test]
    fn test_out_of_surface_is_black() {
        let surface = coordinate_surface();
        let mut grid = SampleGrid::new(3);
        grid.resample(&surface, &full_region(), Point::new(0.0, 0.0));
        assert_eq!(grid.get(0, 0), Some(Color::BLACK));
        assert_eq!(grid.get(0, 2), Some(Color::BLACK));
        assert_eq!(grid.get(1, 1).unwrap().to_rgb8(), (0, 0, 200));
    }

    #[test]
    fn test_outside_region_is_black() {
        let surface = coordinate_surface();
        let region = ActiveRegion::new(Rect::new(1.0, 1.0, 2.0, 2.0));
        let mut grid = SampleGrid::new(3);
        grid.resample(&surface, &region, Point::new(1.0, 1.0));
        // Pixel (0, 0) existe mais hors région / exists but outside the region
        assert_eq!(grid.get(0, 0), Some(Color::BLACK));
        assert_eq!(grid.selected().to_rgb8(), (1, 1, 200));
    }

    #[test]
    fn test_retina_scale_maps_to_pixels() {
        let surface = coordinate_surface().with_scale_factor(2.0).unwrap();
        let region = ActiveRegion::new(Rect::new(0.0, 0.0, 2.5, 2.5));
        let mut grid = SampleGrid::new(1);
        grid.resample(&surface, &region, Point::new(1.5, 0.5));
        assert_eq!(grid.center_pixel(), (3, 1));
        assert_eq!(grid.selected().to_rgb8(), (3, 1, 200));
    }

    #[test]
    fn test_get_out_of_grid() {
        let grid = SampleGrid::new(3);
        assert_eq!(grid.get(3, 0), None);
        assert_eq!(grid.rows().count(), 3);
    }
}
