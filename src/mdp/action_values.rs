//! Per-cell matrices produced by the solvers.

use std::collections::HashMap;

use ndarray::{Array2, Array3};

use crate::mdp::action::{Action, NUM_ACTIONS};
use crate::mdp::grid::Position;
use crate::mdp::transition::TransitionModel;

/// Differences at or below this are rounding noise, not a better action.
pub(crate) const TIE_TOLERANCE: f64 = 1e-9;

/// Action values of one cell. Walls are `Unreachable` and never take part
/// in comparisons.
///
/// Slots of illegal actions hold a zero placeholder so every cell indexes the
/// same way, but `legal` keeps them out of `best` and `max_value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValues {
    Valid {
        values: [f64; NUM_ACTIONS],
        legal: [bool; NUM_ACTIONS],
    },
    Unreachable,
}

impl CellValues {
    pub fn get(&self, action: Action) -> Option<f64> {
        match self {
            CellValues::Valid { values, .. } => Some(values[action.index()]),
            CellValues::Unreachable => None,
        }
    }

    pub fn is_legal(&self, action: Action) -> bool {
        match self {
            CellValues::Valid { legal, .. } => legal[action.index()],
            CellValues::Unreachable => false,
        }
    }

    /// Best legal action and its value. Ties, up to [`TIE_TOLERANCE`], go to
    /// the first action in canonical order; a cell with no legal action has none.
    pub fn best(&self) -> Option<(Action, f64)> {
        let CellValues::Valid { values, legal } = self else {
            return None;
        };
        let mut best: Option<(Action, f64)> = None;
        for action in Action::ALL {
            if !legal[action.index()] {
                continue;
            }
            let value = values[action.index()];
            if best.map_or(true, |(_, b)| value - b > TIE_TOLERANCE) {
                best = Some((action, value));
            }
        }
        best
    }

    pub fn max_value(&self) -> Option<f64> {
        self.best().map(|(_, value)| value)
    }
}

/// The action-value matrix Q.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValues {
    cells: Array2<CellValues>,
}

impl ActionValues {
    /// All-zero values for open cells, `Unreachable` for walls. Each open
    /// cell remembers which of its actions are legal under `model`.
    pub fn new(model: &TransitionModel<'_>) -> Self {
        let grid = model.grid();
        let mut cells = Array2::from_elem(grid.dim(), CellValues::Unreachable);
        for position in grid.open_positions() {
            if let Some(idx) = grid.index(position) {
                let mut legal = [false; NUM_ACTIONS];
                for action in Action::ALL {
                    legal[action.index()] = model.is_legal(action, position);
                }
                cells[idx] = CellValues::Valid {
                    values: [0.0; NUM_ACTIONS],
                    legal,
                };
            }
        }
        Self { cells }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.cells.dim()
    }

    fn index(&self, position: Position) -> Option<(usize, usize)> {
        let row = usize::try_from(position.row).ok()?;
        let col = usize::try_from(position.col).ok()?;
        let (rows, cols) = self.cells.dim();
        (row < rows && col < cols).then_some((row, col))
    }

    pub fn cell(&self, position: Position) -> Option<&CellValues> {
        self.index(position).map(|idx| &self.cells[idx])
    }

    /// Q-value of `action` at `position`; `None` for walls and off-grid cells.
    pub fn get(&self, position: Position, action: Action) -> Option<f64> {
        self.cell(position)?.get(action)
    }

    pub fn values(&self, position: Position) -> Option<[f64; NUM_ACTIONS]> {
        match self.cell(position)? {
            CellValues::Valid { values, .. } => Some(*values),
            CellValues::Unreachable => None,
        }
    }

    /// Largest Q-value over the legal actions at `position`.
    pub fn max_value(&self, position: Position) -> Option<f64> {
        self.cell(position)?.max_value()
    }

    /// Overwrites an open cell. Unreachable cells stay unreachable.
    pub(crate) fn set(&mut self, position: Position, new_values: [f64; NUM_ACTIONS]) {
        if let Some(idx) = self.index(position) {
            if let CellValues::Valid { values, .. } = &mut self.cells[idx] {
                *values = new_values;
            }
        }
    }

    pub(crate) fn set_action(&mut self, position: Position, action: Action, value: f64) {
        if let Some(idx) = self.index(position) {
            if let CellValues::Valid { values, .. } = &mut self.cells[idx] {
                values[action.index()] = value;
            }
        }
    }

    pub fn indexed_iter(&self) -> impl Iterator<Item = (Position, &CellValues)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), cell)| (Position::new(row as isize, col as isize), cell))
    }

    /// Dense rows × cols × 4 export for plotting; walls are negative infinity.
    pub fn to_dense(&self) -> Array3<f64> {
        let (rows, cols) = self.cells.dim();
        Array3::from_shape_fn((rows, cols, NUM_ACTIONS), |(r, c, a)| match self.cells[(r, c)] {
            CellValues::Valid { values, .. } => values[a],
            CellValues::Unreachable => f64::NEG_INFINITY,
        })
    }
}

/// Action chosen in each cell; `None` for walls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyMap {
    actions: Array2<Option<Action>>,
}

impl PolicyMap {
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            actions: Array2::from_elem((rows, cols), None),
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.actions.dim()
    }

    fn index(&self, position: Position) -> Option<(usize, usize)> {
        let row = usize::try_from(position.row).ok()?;
        let col = usize::try_from(position.col).ok()?;
        let (rows, cols) = self.actions.dim();
        (row < rows && col < cols).then_some((row, col))
    }

    pub fn get(&self, position: Position) -> Option<Action> {
        self.index(position).and_then(|idx| self.actions[idx])
    }

    pub fn set(&mut self, position: Position, action: Option<Action>) {
        if let Some(idx) = self.index(position) {
            self.actions[idx] = action;
        }
    }

    /// Cells that have an action, in row-major order.
    pub fn assignments(&self) -> impl Iterator<Item = (Position, Action)> + '_ {
        self.actions.indexed_iter().filter_map(|((row, col), action)| {
            action.map(|a| (Position::new(row as isize, col as isize), a))
        })
    }

    /// One line per row: an arrow per cell and `#` for cells without an action.
    pub fn arrows(&self) -> Vec<String> {
        self.actions
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|a| a.map_or('#', Action::arrow)).collect::<String>())
            .collect()
    }
}

/// Best value per cell; `None` for walls.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMap {
    values: Array2<Option<f64>>,
}

impl ValueMap {
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            values: Array2::from_elem((rows, cols), None),
        }
    }

    fn index(&self, position: Position) -> Option<(usize, usize)> {
        let row = usize::try_from(position.row).ok()?;
        let col = usize::try_from(position.col).ok()?;
        let (rows, cols) = self.values.dim();
        (row < rows && col < cols).then_some((row, col))
    }

    pub fn get(&self, position: Position) -> Option<f64> {
        self.index(position).and_then(|idx| self.values[idx])
    }

    pub fn set(&mut self, position: Position, value: Option<f64>) {
        if let Some(idx) = self.index(position) {
            self.values[idx] = value;
        }
    }

    pub fn as_array(&self) -> &Array2<Option<f64>> {
        &self.values
    }
}

/// One utility sample per cell per solver iteration, for convergence plots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilityHistory {
    series: HashMap<Position, Vec<f64>>,
}

impl UtilityHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, position: Position, utility: f64) {
        self.series.entry(position).or_default().push(utility);
    }

    pub fn get(&self, position: Position) -> Option<&[f64]> {
        self.series.get(&position).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Position, &Vec<f64>)> {
        self.series.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::config::GridWorldConfig;
    use crate::mdp::grid::{CellType, Grid};

    #[test]
    fn test_walls_start_unreachable() {
        let grid = Grid::with_cells(2, 2, &[(1, 0, CellType::Wall)]).unwrap();
        let config = GridWorldConfig::default();
        let model = TransitionModel::new(&grid, &config).unwrap();
        let q = ActionValues::new(&model);

        assert_eq!(q.cell(Position::new(1, 0)), Some(&CellValues::Unreachable));
        assert_eq!(q.values(Position::new(0, 0)), Some([0.0; NUM_ACTIONS]));
        assert_eq!(q.get(Position::new(1, 0), Action::North), None);
        assert_eq!(q.max_value(Position::new(3, 3)), None);
    }

    #[test]
    fn test_legality_recorded_per_slot() {
        // 0 0
        // W 0
        let grid = Grid::with_cells(2, 2, &[(1, 0, CellType::Wall)]).unwrap();
        let config = GridWorldConfig::default();
        let model = TransitionModel::new(&grid, &config).unwrap();
        let q = ActionValues::new(&model);

        let corner = q.cell(Position::new(0, 0)).unwrap();
        assert!(corner.is_legal(Action::East));
        assert!(!corner.is_legal(Action::South)); // wall
        assert!(!corner.is_legal(Action::North)); // off the grid
        assert!(!CellValues::Unreachable.is_legal(Action::East));
    }

    #[test]
    fn test_set_ignores_walls() {
        let grid = Grid::with_cells(1, 2, &[(0, 1, CellType::Wall)]).unwrap();
        let config = GridWorldConfig::default();
        let model = TransitionModel::new(&grid, &config).unwrap();
        let mut q = ActionValues::new(&model);
        q.set(Position::new(0, 1), [1.0; NUM_ACTIONS]);
        q.set_action(Position::new(0, 0), Action::South, 2.5);

        assert_eq!(q.cell(Position::new(0, 1)), Some(&CellValues::Unreachable));
        assert_eq!(q.get(Position::new(0, 0), Action::South), Some(2.5));
    }

    #[test]
    fn test_best_prefers_first_on_tie() {
        let cell = CellValues::Valid {
            values: [1.0, 3.0, 3.0, -2.0],
            legal: [true; NUM_ACTIONS],
        };
        assert_eq!(cell.best(), Some((Action::East, 3.0)));
        assert_eq!(CellValues::Unreachable.best(), None);

        // Rounding noise in a later slot does not steal the tie.
        let noisy = CellValues::Valid {
            values: [2.0, 2.0 + 1e-13, -1.0, 0.5],
            legal: [true; NUM_ACTIONS],
        };
        assert_eq!(noisy.best(), Some((Action::North, 2.0)));
    }

    #[test]
    fn test_best_skips_illegal_placeholders() {
        // All legal values are negative; the zero placeholders must not win.
        let cell = CellValues::Valid {
            values: [0.0, -4.5, 0.0, -5.9],
            legal: [false, true, false, true],
        };
        assert_eq!(cell.best(), Some((Action::East, -4.5)));
        assert_eq!(cell.max_value(), Some(-4.5));

        let boxed_in = CellValues::Valid {
            values: [0.0; NUM_ACTIONS],
            legal: [false; NUM_ACTIONS],
        };
        assert_eq!(boxed_in.best(), None);
    }

    #[test]
    fn test_dense_export_marks_walls() {
        let grid = Grid::with_cells(1, 2, &[(0, 0, CellType::Wall)]).unwrap();
        let config = GridWorldConfig::default();
        let model = TransitionModel::new(&grid, &config).unwrap();
        let q = ActionValues::new(&model);
        let dense = q.to_dense();

        assert_eq!(dense.dim(), (1, 2, NUM_ACTIONS));
        assert!(dense[[0, 0, 2]].is_infinite() && dense[[0, 0, 2]] < 0.0);
        assert_eq!(dense[[0, 1, 3]], 0.0);
    }

    #[test]
    fn test_policy_map_arrows() {
        let mut policy = PolicyMap::empty(1, 3);
        policy.set(Position::new(0, 0), Some(Action::East));
        policy.set(Position::new(0, 2), Some(Action::North));
        assert_eq!(policy.arrows(), vec![">#^".to_string()]);
        assert_eq!(policy.assignments().count(), 2);
    }

    #[test]
    fn test_value_map_array_view() {
        let mut values = ValueMap::empty(2, 2);
        values.set(Position::new(1, 0), Some(-0.25));
        values.set(Position::new(5, 5), Some(1.0));

        let array = values.as_array();
        assert_eq!(array.dim(), (2, 2));
        assert_eq!(array[[1, 0]], Some(-0.25));
        assert_eq!(array.iter().filter(|v| v.is_some()).count(), 1);
    }

    #[test]
    fn test_history_appends() {
        let mut history = UtilityHistory::new();
        let p = Position::new(0, 0);
        history.record(p, 0.5);
        history.record(p, 0.75);
        history.record(Position::new(0, 1), -1.0);
        assert_eq!(history.get(p), Some(&[0.5, 0.75][..]));
        assert_eq!(history.len(), 2);

        let mut lengths: Vec<usize> = history.iter().map(|(_, series)| series.len()).collect();
        lengths.sort_unstable();
        assert_eq!(lengths, vec![1, 2]);
    }
}
