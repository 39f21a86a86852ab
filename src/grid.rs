//! Row-major grid of cell values in `0..=9`.

use crate::error::{GroveError, GroveResult};

/// Largest value a heightmap cell may hold.
pub const MAX_CELL: u8 = 9;

/// A 2D heightmap grid. Cell `(row, col)` lives at `row * cols + col`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    pub rows: usize,
    pub cols: usize,
    data: Vec<u8>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::new_with(rows, cols, 0)
    }

    pub fn new_with(rows: usize, cols: usize, value: u8) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Wrap row-major `data`; its length must be `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<u8>) -> GroveResult<Self> {
        if data.len() != rows * cols {
            return Err(GroveError::ShapeMismatch {
                expected: (rows, cols),
                actual: if cols > 0 && data.len() % cols == 0 {
                    (data.len() / cols, cols)
                } else {
                    (1, data.len())
                },
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Build from nested rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<u8>]) -> GroveResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != cols) {
            return Err(GroveError::ShapeMismatch {
                expected: (rows.len(), cols),
                actual: (rows.len(), bad.len()),
            });
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.concat(),
        })
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[self.index(row, col)]
    }

    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        let idx = self.index(row, col);
        self.data[idx] = value;
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Raw cells in row-major order.
    pub fn cells(&self) -> &[u8] {
        &self.data
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        let cols = self.cols;
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, &val)| (idx / cols, idx % cols, val))
    }

    /// Iterate over rows as slices.
    pub fn row_slices(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks(self.cols.max(1))
    }

    /// Apply `f` to every cell.
    pub fn map(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Rows of space-separated digits, one row per line.
    pub fn to_text(&self) -> String {
        self.row_slices()
            .map(|row| {
                row.iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse text in the [`to_text`](Self::to_text) layout. Blank lines are ignored.
    ///
    /// Each cell is a single digit. Anything else is `InvalidDigit` at the byte
    /// offset of the first offending character.
    pub fn parse_text(text: &str) -> GroveResult<Self> {
        let mut rows = Vec::new();
        for line in text.lines() {
            let mut row = Vec::new();
            for token in line.split_whitespace() {
                row.push(parse_cell(token, byte_offset(text, token))?);
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }
        Self::from_rows(&rows)
    }

    /// Replace this grid with an edited version.
    ///
    /// The edit is rejected, and the current cells kept, when the text does not
    /// parse or its shape differs from the current one.
    pub fn apply_edit(&mut self, text: &str) -> GroveResult<()> {
        let edited = Self::parse_text(text)?;
        if edited.shape() != self.shape() {
            return Err(GroveError::ShapeMismatch {
                expected: self.shape(),
                actual: edited.shape(),
            });
        }
        *self = edited;
        Ok(())
    }

    /// All cells as one digit string, row-major.
    pub fn to_digit_string(&self) -> String {
        self.data
            .iter()
            .map(|&v| char::from(b'0' + v.min(MAX_CELL)))
            .collect()
    }
}

/// Byte offset of `part` within `whole`; `part` must be a subslice of it.
fn byte_offset(whole: &str, part: &str) -> usize {
    part.as_ptr() as usize - whole.as_ptr() as usize
}

fn parse_cell(token: &str, offset: usize) -> GroveResult<u8> {
    let mut chars = token.char_indices();
    match (chars.next(), chars.next()) {
        (Some((_, c)), None) if c.is_ascii_digit() => Ok(c as u8 - b'0'),
        (Some((i, c)), _) if !c.is_ascii_digit() => Err(GroveError::InvalidDigit {
            index: offset + i,
            found: c,
        }),
        _ => {
            // a multi-digit token: the first char past the leading digit
            let (i, c) = token
                .char_indices()
                .skip(1)
                .find(|(_, c)| !c.is_ascii_digit())
                .or_else(|| token.char_indices().nth(1))
                .unwrap_or((0, ' '));
            Err(GroveError::InvalidDigit { index: offset + i, found: c })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let grid = Grid::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(grid.shape(), (2, 3));
        assert_eq!(grid.get(1, 0), 4);
        assert_eq!(grid.cells(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(grid.iter().nth(4), Some((1, 1, 5)));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = Grid::from_rows(&[vec![1, 2], vec![3]]);
        assert!(matches!(result, Err(GroveError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_text_round_trip() {
        let grid = Grid::from_rows(&[vec![0, 9], vec![4, 7]]).unwrap();
        assert_eq!(grid.to_text(), "0 9\n4 7");
        assert_eq!(Grid::parse_text(&grid.to_text()).unwrap(), grid);
    }

    #[test]
    fn test_edit_with_matching_shape() {
        let mut grid = Grid::new(2, 2);
        grid.apply_edit("1 2\n3 4\n").unwrap();
        assert_eq!(grid.cells(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_edit_with_wrong_shape_keeps_grid() {
        let mut grid = Grid::new_with(2, 2, 5);
        let result = grid.apply_edit("1 2 3\n4 5 6");
        assert!(matches!(
            result,
            Err(GroveError::ShapeMismatch { expected: (2, 2), actual: (2, 3) })
        ));
        assert_eq!(grid, Grid::new_with(2, 2, 5));
    }

    #[test]
    fn test_edit_with_bad_token_keeps_grid() {
        let mut grid = Grid::new_with(2, 2, 5);
        assert!(matches!(
            grid.apply_edit("1 x\n3 4"),
            Err(GroveError::InvalidDigit { found: 'x', .. })
        ));
        assert!(grid.apply_edit("1 12\n3 4").is_err());
        assert_eq!(grid, Grid::new_with(2, 2, 5));
    }

    #[test]
    fn test_bad_token_position() {
        assert!(matches!(
            Grid::parse_text("1 12"),
            Err(GroveError::InvalidDigit { index: 3, found: '2' })
        ));
        assert!(matches!(
            Grid::parse_text("0 1\n2 x"),
            Err(GroveError::InvalidDigit { index: 6, found: 'x' })
        ));
        assert!(matches!(
            Grid::parse_text("0 1\r\n2 3y"),
            Err(GroveError::InvalidDigit { index: 8, found: 'y' })
        ));
        assert!(matches!(
            Grid::parse_text("1 1 -1"),
            Err(GroveError::InvalidDigit { index: 4, found: '-' })
        ));
    }

    #[test]
    fn test_digit_string() {
        let grid = Grid::from_rows(&[vec![0, 1], vec![8, 9]]).unwrap();
        assert_eq!(grid.to_digit_string(), "0189");
    }
}
