// 🔢 Grid Mapper - Touch coordinates to grid cells
// Maps a point on the drawing surface to one of the nine lock cells

use std::fmt;

/// Cells per side of the lock grid
pub const GRID_SIDE: u8 = 3;

/// Total number of cells in the lock grid
pub const GRID_CELLS: usize = (GRID_SIDE as usize) * (GRID_SIDE as usize);

// ============================================================================
// GRID CELL
// ============================================================================

/// One of the nine fixed grid positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    column: u8,
    row: u8,
}

impl GridCell {
    /// Build a cell, or `None` when either coordinate is outside 0..=2
    pub fn new(column: u8, row: u8) -> Option<Self> {
        if column < GRID_SIDE && row < GRID_SIDE {
            Some(GridCell { column, row })
        } else {
            None
        }
    }

    /// Cell for a digit 0-8 (`column + row * 3`)
    pub fn from_digit(digit: u8) -> Option<Self> {
        if (digit as usize) < GRID_CELLS {
            GridCell::new(digit % GRID_SIDE, digit / GRID_SIDE)
        } else {
            None
        }
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    /// Digit used in the pattern code: `column + row * 3`
    pub fn digit(&self) -> u8 {
        self.column + self.row * GRID_SIDE
    }

    /// All nine cells in digit order
    pub fn all() -> impl Iterator<Item = GridCell> {
        (0..GRID_CELLS as u8).filter_map(GridCell::from_digit)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

// ============================================================================
// HIT TEST
// ============================================================================

/// Locate the cell under a surface-relative point.
///
/// Each cell owns a square of edge `cell_diameter` centered at
/// `((2u + 1) * d, (2v + 1) * d)`. The layout leaves one full diameter between
/// neighbouring squares and half a diameter of margin, so
/// `floor(x / d - 0.5)` is even inside a square and odd in a gap.
pub fn locate(x: f64, y: f64, cell_diameter: f64) -> Option<GridCell> {
    if !cell_diameter.is_finite() || cell_diameter <= 0.0 {
        return None;
    }

    let column = axis_index(x, cell_diameter)?;
    let row = axis_index(y, cell_diameter)?;
    GridCell::new(column, row)
}

/// Index along one axis, or `None` for gaps, margins and out-of-range points
fn axis_index(coord: f64, cell_diameter: f64) -> Option<u8> {
    if !coord.is_finite() {
        return None;
    }

    let band = (coord / cell_diameter - 0.5).floor();
    if band < 0.0 || band > f64::from(2 * (GRID_SIDE - 1)) {
        return None;
    }

    // Range checked above, so the cast is exact
    let band = band as u8;
    if band % 2 == 0 {
        Some(band / 2)
    } else {
        None
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Drawing surface geometry for one lock widget
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    cell_diameter: f64,
}

impl GridGeometry {
    pub fn new(cell_diameter: f64) -> Self {
        GridGeometry { cell_diameter }
    }

    /// Derive the cell diameter from a square surface edge: six diameters
    /// span the surface (three cells, two gaps, two half margins)
    pub fn from_surface_width(surface_width: f64) -> Self {
        GridGeometry::new((surface_width / 6.0).round())
    }

    pub fn cell_diameter(&self) -> f64 {
        self.cell_diameter
    }

    /// Edge length of the square surface the grid occupies
    pub fn surface_extent(&self) -> f64 {
        self.cell_diameter * 6.0
    }

    /// Center of a cell in surface coordinates
    pub fn center(&self, cell: GridCell) -> (f64, f64) {
        (
            (f64::from(cell.column()) * 2.0 + 1.0) * self.cell_diameter,
            (f64::from(cell.row()) * 2.0 + 1.0) * self.cell_diameter,
        )
    }

    pub fn locate(&self, x: f64, y: f64) -> Option<GridCell> {
        locate(x, y, self.cell_diameter)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const D: f64 = 50.0;

    fn cell(column: u8, row: u8) -> GridCell {
        GridCell::new(column, row).unwrap()
    }

    #[test]
    fn test_centers_map_to_their_cell() {
        let geometry = GridGeometry::new(D);

        for c in GridCell::all() {
            let (x, y) = geometry.center(c);
            assert_eq!(geometry.locate(x, y), Some(c), "center of {} should hit", c);
        }
    }

    #[test]
    fn test_square_edges() {
        // Cell (0, 0) spans [25, 75) on both axes
        assert_eq!(locate(25.0, 25.0, D), Some(cell(0, 0)));
        assert_eq!(locate(74.9, 74.9, D), Some(cell(0, 0)));
        assert_eq!(locate(75.0, 50.0, D), None);
        assert_eq!(locate(24.9, 50.0, D), None);

        // Cell (2, 1) spans [225, 275) x [125, 175)
        assert_eq!(locate(226.0, 174.0, D), Some(cell(2, 1)));
    }

    #[test]
    fn test_gaps_and_margins_miss() {
        // Margin
        assert_eq!(locate(10.0, 50.0, D), None);
        // Gap between columns 0 and 1
        assert_eq!(locate(100.0, 50.0, D), None);
        // Gap between rows 1 and 2
        assert_eq!(locate(150.0, 200.0, D), None);
        // Beyond the third cell
        assert_eq!(locate(290.0, 50.0, D), None);
        assert_eq!(locate(350.0, 350.0, D), None);
        assert_eq!(locate(-30.0, 50.0, D), None);
    }

    #[test]
    fn test_degenerate_inputs_miss() {
        assert_eq!(locate(f64::NAN, 50.0, D), None);
        assert_eq!(locate(50.0, f64::INFINITY, D), None);
        assert_eq!(locate(50.0, 50.0, 0.0), None);
        assert_eq!(locate(50.0, 50.0, -D), None);
    }

    #[test]
    fn test_digit_encoding() {
        assert_eq!(cell(0, 0).digit(), 0);
        assert_eq!(cell(2, 0).digit(), 2);
        assert_eq!(cell(0, 1).digit(), 3);
        assert_eq!(cell(2, 2).digit(), 8);
        assert_eq!(GridCell::from_digit(5), Some(cell(2, 1)));
        assert_eq!(GridCell::from_digit(9), None);
        assert_eq!(GridCell::new(3, 0), None);
        assert_eq!(GridCell::all().count(), GRID_CELLS);
    }

    #[test]
    fn test_geometry_from_surface_width() {
        let geometry = GridGeometry::from_surface_width(323.0);
        assert_eq!(geometry.cell_diameter(), 54.0);
        assert_eq!(geometry.surface_extent(), 324.0);
        assert_eq!(geometry.center(cell(1, 2)), (162.0, 270.0));
    }
}
