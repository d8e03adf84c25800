// ✍️ Pattern - Gesture sequences and their digit codes

use crate::grid::{GridCell, GRID_CELLS};
use std::fmt;

// ============================================================================
// GESTURE SEQUENCE
// ============================================================================

/// Cells visited during one gesture, in visit order, without repeats
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureSequence {
    cells: Vec<GridCell>,
}

impl GestureSequence {
    pub fn new() -> Self {
        GestureSequence {
            cells: Vec::with_capacity(GRID_CELLS),
        }
    }

    /// Append a cell unless it was already visited.
    /// Returns `true` when the cell was added.
    pub fn push(&mut self, cell: GridCell) -> bool {
        if self.contains(cell) {
            return false;
        }
        self.cells.push(cell);
        true
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        self.cells.contains(&cell)
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn last(&self) -> Option<GridCell> {
        self.cells.last().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Digit code for the visited cells
    pub fn code(&self) -> PatternCode {
        PatternCode::from_cells(&self.cells)
    }
}

impl FromIterator<GridCell> for GestureSequence {
    fn from_iter<I: IntoIterator<Item = GridCell>>(iter: I) -> Self {
        let mut sequence = GestureSequence::new();
        for cell in iter {
            sequence.push(cell);
        }
        sequence
    }
}

// ============================================================================
// PATTERN CODE
// ============================================================================

/// Digit string for a gesture: each cell becomes `column + row * 3`.
/// This is both the comparison key and the persisted credential value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PatternCode(String);

impl PatternCode {
    pub fn from_cells(cells: &[GridCell]) -> Self {
        PatternCode(
            cells
                .iter()
                .map(|cell| char::from(b'0' + cell.digit()))
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of cells encoded
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decode back into cells; `None` for anything that is not a digit 0-8
    pub fn cells(&self) -> Option<Vec<GridCell>> {
        self.0
            .bytes()
            .map(|b| b.checked_sub(b'0').and_then(GridCell::from_digit))
            .collect()
    }

    /// Read a stored value back as a code. Rejects anything a gesture could
    /// not have produced: non-digits, digits above 8, repeated cells, or
    /// fewer than `min_len` cells.
    pub fn parse(stored: &str, min_len: usize) -> Option<PatternCode> {
        let code = PatternCode(stored.to_string());
        let cells = code.cells()?;
        let sequence: GestureSequence = cells.iter().copied().collect();
        if sequence.len() != cells.len() || cells.len() < min_len {
            return None;
        }
        Some(code)
    }
}

impl fmt::Display for PatternCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(column: u8, row: u8) -> GridCell {
        GridCell::new(column, row).unwrap()
    }

    #[test]
    fn test_revisits_are_not_appended() {
        let mut sequence = GestureSequence::new();
        assert!(sequence.push(cell(0, 0)));
        assert!(sequence.push(cell(1, 0)));
        assert!(!sequence.push(cell(0, 0)));
        assert!(!sequence.push(cell(1, 0)));
        assert!(sequence.push(cell(1, 1)));

        assert_eq!(sequence.cells(), &[cell(0, 0), cell(1, 0), cell(1, 1)]);
        assert_eq!(sequence.last(), Some(cell(1, 1)));
    }

    #[test]
    fn test_code_follows_visit_order() {
        let sequence: GestureSequence =
            [cell(0, 0), cell(1, 0), cell(2, 0), cell(0, 1)].into_iter().collect();
        assert_eq!(sequence.code().as_str(), "0123");

        let reversed: GestureSequence =
            [cell(0, 1), cell(2, 0), cell(1, 0), cell(0, 0)].into_iter().collect();
        assert_eq!(reversed.code().as_str(), "3210");
        assert_ne!(sequence.code(), reversed.code());
    }

    #[test]
    fn test_empty_sequence_has_empty_code() {
        let sequence = GestureSequence::new();
        assert!(sequence.code().is_empty());
        assert_eq!(sequence.code(), PatternCode::default());
    }

    #[test]
    fn test_code_decodes_to_cells() {
        let code = PatternCode::from_cells(&[cell(2, 2), cell(1, 1), cell(0, 0)]);
        assert_eq!(code.to_string(), "840");
        assert_eq!(code.cells(), Some(vec![cell(2, 2), cell(1, 1), cell(0, 0)]));
        assert_eq!(PatternCode("19".to_string()).cells(), None);
    }

    #[test]
    fn test_parse_rejects_values_no_gesture_could_produce() {
        assert_eq!(
            PatternCode::parse("0123", 4).map(|c| c.to_string()),
            Some("0123".to_string())
        );
        assert_eq!(PatternCode::parse("", 4), None);
        assert_eq!(PatternCode::parse("01", 4), None);
        assert_eq!(PatternCode::parse("0120", 4), None);
        assert_eq!(PatternCode::parse("0129", 4), None);
        assert_eq!(PatternCode::parse("01a3", 4), None);
    }
}
