//! Rectangular maze of typed cells.
//!
//! The grid is built once and then only read by the solvers.

use std::fmt;

use ndarray::Array2;

use crate::error::{Error, Result};

/// Type of a single maze cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellType {
    Goal,
    Penalty,
    Wall,
    #[default]
    Neutral,
    Start,
}

impl CellType {
    /// Parses a layout symbol: `P` goal, `M` penalty, `W` wall, `S` start,
    /// `0` or `.` neutral.
    pub fn from_symbol(symbol: char) -> Result<Self> {
        match symbol.to_ascii_uppercase() {
            'P' => Ok(CellType::Goal),
            'M' => Ok(CellType::Penalty),
            'W' => Ok(CellType::Wall),
            'S' => Ok(CellType::Start),
            '0' | '.' => Ok(CellType::Neutral),
            other => Err(Error::InvalidInput(format!(
                "unknown cell symbol '{}'",
                other
            ))),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            CellType::Goal => 'P',
            CellType::Penalty => 'M',
            CellType::Wall => 'W',
            CellType::Start => 'S',
            CellType::Neutral => '0',
        }
    }
}

/// A (row, col) coordinate. Signed so that a move may step off the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: isize,
    pub col: isize,
}

impl Position {
    pub fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Rows × cols matrix of cell types.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Array2<CellType>,
}

impl Grid {
    /// Creates a grid where every cell is neutral.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidInput(format!(
                "grid dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        Ok(Self {
            cells: Array2::from_elem((rows, cols), CellType::Neutral),
        })
    }

    /// Creates a neutral grid and applies a list of `(row, col, type)` overrides.
    ///
    /// # Examples
    ///
    /// ```
    /// use grid_mdp::mdp::{CellType, Grid, Position};
    ///
    /// let grid = Grid::with_cells(2, 2, &[(1, 1, CellType::Wall)]).unwrap();
    /// assert!(grid.is_wall(Position::new(1, 1)));
    /// assert_eq!(grid.cell(Position::new(0, 0)), Some(CellType::Neutral));
    /// ```
    pub fn with_cells(rows: usize, cols: usize, overrides: &[(usize, usize, CellType)]) -> Result<Self> {
        let mut grid = Self::new(rows, cols)?;
        for &(row, col, cell) in overrides {
            grid.set(row, col, cell)?;
        }
        Ok(grid)
    }

    /// Same as [`Grid::with_cells`] but with single-character layout symbols.
    pub fn from_layout(rows: usize, cols: usize, layout: &[(usize, usize, char)]) -> Result<Self> {
        let overrides = layout
            .iter()
            .map(|&(row, col, symbol)| Ok((row, col, CellType::from_symbol(symbol)?)))
            .collect::<Result<Vec<_>>>()?;
        Self::with_cells(rows, cols, &overrides)
    }

    pub fn set(&mut self, row: usize, col: usize, cell: CellType) -> Result<()> {
        let (rows, cols) = self.cells.dim();
        match self.cells.get_mut((row, col)) {
            Some(slot) => {
                *slot = cell;
                Ok(())
            }
            None => Err(Error::OutOfBounds {
                row,
                col,
                rows,
                cols,
            }),
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Array index of `position`, or `None` when it lies off the grid.
    pub fn index(&self, position: Position) -> Option<(usize, usize)> {
        let row = usize::try_from(position.row).ok()?;
        let col = usize::try_from(position.col).ok()?;
        (row < self.rows() && col < self.cols()).then_some((row, col))
    }

    pub fn in_bounds(&self, position: Position) -> bool {
        self.index(position).is_some()
    }

    pub fn cell(&self, position: Position) -> Option<CellType> {
        self.index(position).map(|idx| self.cells[idx])
    }

    pub fn is_wall(&self, position: Position) -> bool {
        self.cell(position) == Some(CellType::Wall)
    }

    /// Every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), _)| Position::new(row as isize, col as isize))
    }

    /// Every non-wall position in row-major order.
    pub fn open_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .indexed_iter()
            .filter(|(_, cell)| **cell != CellType::Wall)
            .map(|((row, col), _)| Position::new(row as isize, col as isize))
    }

    /// First start cell in row-major order, if the layout has one.
    pub fn start(&self) -> Option<Position> {
        self.cells
            .indexed_iter()
            .find(|(_, cell)| **cell == CellType::Start)
            .map(|((row, col), _)| Position::new(row as isize, col as isize))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            let line: Vec<String> = row.iter().map(|cell| cell.symbol().to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
