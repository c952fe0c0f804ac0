//! Value iteration: repeated Bellman-optimality sweeps until the largest
//! change in any action value drops below epsilon.

use log::{debug, info, warn};

use crate::error::Result;
use crate::mdp::action::{Action, NUM_ACTIONS};
use crate::mdp::action_values::{ActionValues, UtilityHistory};
use crate::mdp::bellman_equation::backup;
use crate::mdp::transition::TransitionModel;
use crate::mdp::validate_budget;

/// Output of [`value_iteration`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValueIterationResult {
    /// Final action-value matrix
    pub q: ActionValues,
    /// Best value of each open cell after every sweep
    pub utility_history: UtilityHistory,
    /// Number of sweeps performed
    pub iterations: usize,
    /// Whether the last sweep changed every value by less than epsilon
    pub converged: bool,
}

/// Performs one synchronous sweep over every open cell, reading only from
/// `previous`. Returns the new matrix and the largest absolute change.
///
/// Illegal actions keep a zero placeholder; successor values come from the
/// legal slots only.
pub fn sweep(model: &TransitionModel<'_>, previous: &ActionValues) -> (ActionValues, f64) {
    let grid = model.grid();
    let mut next = previous.clone();
    let mut delta = 0.0_f64;

    for position in grid.open_positions() {
        let mut values = [0.0; NUM_ACTIONS];
        for action in Action::ALL {
            if model.is_legal(action, position) {
                values[action.index()] =
                    backup(model, position, action, |s| previous.max_value(s)).unwrap_or(0.0);
            }
        }

        if let Some(old) = previous.values(position) {
            for (old_value, new_value) in old.iter().zip(values.iter()) {
                delta = delta.max((old_value - new_value).abs());
            }
        }
        next.set(position, values);
    }

    (next, delta)
}

/// Solves the grid world by value iteration.
///
/// # Arguments
/// - `model`: grid and configuration
/// - `max_iterations`: maximum number of sweeps (must be positive)
/// - `epsilon`: stop once the largest change in a sweep is below this;
///   zero makes `max_iterations` the only stopping condition
///
/// Running out of sweeps is not an error; check `converged`.
///
/// # Errors
///
/// Returns `Error::InvalidInput` for a zero budget or a negative/NaN epsilon.
///
/// # Examples
///
/// ```
/// use grid_mdp::mdp::{value_iteration, CellType, Grid, GridWorldConfig, Position, TransitionModel};
///
/// let grid = Grid::with_cells(2, 2, &[(0, 1, CellType::Goal), (1, 1, CellType::Wall)]).unwrap();
/// let config = GridWorldConfig::default();
/// let model = TransitionModel::new(&grid, &config).unwrap();
///
/// let result = value_iteration(&model, 2000, 1e-3).unwrap();
/// assert!(result.converged);
/// assert_eq!(result.q.values(Position::new(1, 1)), None);
/// ```
pub fn value_iteration(
    model: &TransitionModel<'_>,
    max_iterations: usize,
    epsilon: f64,
) -> Result<ValueIterationResult> {
    validate_budget(max_iterations, epsilon)?;

    let grid = model.grid();
    let mut q = ActionValues::new(model);
    let mut utility_history = UtilityHistory::new();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        let (next, delta) = sweep(model, &q);
        q = next;
        iterations += 1;

        for position in grid.open_positions() {
            if let Some(utility) = q.max_value(position) {
                utility_history.record(position, utility);
            }
        }

        debug!("value iteration sweep {}: delta = {:.6}", iterations, delta);
        if delta < epsilon {
            converged = true;
            break;
        }
    }

    if converged {
        info!("value iteration converged after {} iterations", iterations);
    } else {
        warn!(
            "value iteration stopped after {} iterations without converging",
            iterations
        );
    }

    Ok(ValueIterationResult {
        q,
        utility_history,
        iterations,
        converged,
    })
}
