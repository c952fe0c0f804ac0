//! Policy iteration: alternate evaluation of a fixed policy with greedy
//! improvement until no cell changes its action.

use log::{debug, info, warn};

use crate::error::Result;
use crate::mdp::action::{Action, NUM_ACTIONS};
use crate::mdp::action_values::{ActionValues, PolicyMap, TIE_TOLERANCE, UtilityHistory};
use crate::mdp::bellman_equation::backup;
use crate::mdp::grid::Position;
use crate::mdp::transition::TransitionModel;
use crate::mdp::validate_budget;

/// Output of [`policy_iteration`].
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyIterationResult {
    pub q: ActionValues,
    pub policy: PolicyMap,
    /// Value of each cell's policy action after every outer iteration
    pub utility_history: UtilityHistory,
    /// Number of evaluate/improve rounds performed
    pub iterations: usize,
    /// Total evaluation sweeps across all rounds
    pub evaluation_sweeps: usize,
    /// Whether the last improvement left the policy unchanged
    pub converged: bool,
}

/// First legal action of every open cell. Cells with no legal move get `None`.
pub fn initial_policy(model: &TransitionModel<'_>) -> PolicyMap {
    let grid = model.grid();
    let mut policy = PolicyMap::empty(grid.rows(), grid.cols());
    for position in grid.open_positions() {
        policy.set(position, model.legal_actions(position).first().copied());
    }
    policy
}

/// Value of a successor under the policy: its own action's Q slot.
fn policy_value(q: &ActionValues, policy: &PolicyMap, position: Position) -> Option<f64> {
    q.get(position, policy.get(position)?)
}

/// Evaluates `policy` in place, updating only the slot of each cell's policy
/// action. Sweeps are synchronous and stop once the largest change is below
/// `epsilon` or after `max_sweeps`. Returns the number of sweeps run.
pub fn evaluate_policy(
    model: &TransitionModel<'_>,
    policy: &PolicyMap,
    q: &mut ActionValues,
    max_sweeps: usize,
    epsilon: f64,
) -> usize {
    for sweep in 1..=max_sweeps {
        let previous = q.clone();
        let mut delta = 0.0_f64;

        for (position, action) in policy.assignments() {
            let Some(value) = backup(model, position, action, |s| {
                policy_value(&previous, policy, s)
            }) else {
                continue;
            };
            if let Some(old) = previous.get(position, action) {
                delta = delta.max((old - value).abs());
            }
            q.set_action(position, action, value);
        }

        if delta < epsilon {
            return sweep;
        }
    }
    max_sweeps
}

/// Greedy improvement against the evaluated `q`.
///
/// Every legal action of every cell is backed up and written into `q`.
///
/// `epsilon` doubles as the minimum improvement: a cell switches only when
/// the best action beats its current one by more than `epsilon` (or by more
/// than rounding noise when `epsilon` is zero). Gains smaller than `epsilon`
/// are within evaluation error and are ignored, so ties never flip.
/// Returns the number of cells that changed action.
pub fn improve_policy(
    model: &TransitionModel<'_>,
    policy: &mut PolicyMap,
    q: &mut ActionValues,
    epsilon: f64,
) -> usize {
    let evaluated = q.clone();
    let current_policy = policy.clone();
    let threshold = epsilon.max(TIE_TOLERANCE);
    let mut changed = 0;

    for (position, current) in current_policy.assignments() {
        let mut candidates: [Option<f64>; NUM_ACTIONS] = [None; NUM_ACTIONS];
        for action in Action::ALL {
            if !model.is_legal(action, position) {
                continue;
            }
            if let Some(value) = backup(model, position, action, |s| {
                policy_value(&evaluated, &current_policy, s)
            }) {
                q.set_action(position, action, value);
                candidates[action.index()] = Some(value);
            }
        }

        let Some(current_value) = candidates[current.index()] else {
            continue;
        };
        let mut best = (current, f64::NEG_INFINITY);
        for action in Action::ALL {
            if let Some(value) = candidates[action.index()] {
                if value > best.1 {
                    best = (action, value);
                }
            }
        }

        if best.0 != current && best.1 - current_value > threshold {
            policy.set(position, Some(best.0));
            changed += 1;
        }
    }

    changed
}

/// Solves the grid world by policy iteration.
///
/// Each round runs policy evaluation to its own convergence (capped at
/// `max_iterations` sweeps) and then one improvement step. Stops when a round
/// changes no cell's action or after `max_iterations` rounds.
///
/// `epsilon` is both the evaluation stopping threshold and the smallest gain
/// that makes [`improve_policy`] switch a cell's action. Pass a smaller
/// epsilon when near-optimal actions must be told apart.
///
/// # Errors
///
/// Returns `Error::InvalidInput` for a zero budget or a negative/NaN epsilon.
///
/// # Examples
///
/// ```
/// use grid_mdp::mdp::{policy_iteration, Action, CellType, Grid, GridWorldConfig, Position, TransitionModel};
///
/// let grid = Grid::with_cells(1, 3, &[(0, 2, CellType::Goal)]).unwrap();
/// let config = GridWorldConfig::default();
/// let model = TransitionModel::new(&grid, &config).unwrap();
///
/// let result = policy_iteration(&model, 100, 1e-6).unwrap();
/// assert!(result.converged);
/// assert_eq!(result.policy.get(Position::new(0, 0)), Some(Action::East));
/// ```
pub fn policy_iteration(
    model: &TransitionModel<'_>,
    max_iterations: usize,
    epsilon: f64,
) -> Result<PolicyIterationResult> {
    validate_budget(max_iterations, epsilon)?;

    let grid = model.grid();
    let mut q = ActionValues::new(model);
    let mut policy = initial_policy(model);
    let mut utility_history = UtilityHistory::new();
    let mut iterations = 0;
    let mut evaluation_sweeps = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        let sweeps = evaluate_policy(model, &policy, &mut q, max_iterations, epsilon);
        evaluation_sweeps += sweeps;
        let changed = improve_policy(model, &mut policy, &mut q, epsilon);

        for (position, action) in policy.assignments() {
            if let Some(utility) = q.get(position, action) {
                utility_history.record(position, utility);
            }
        }

        debug!(
            "policy iteration round {}: {} evaluation sweeps, {} cells changed",
            iterations, sweeps, changed
        );
        if changed == 0 {
            converged = true;
            break;
        }
    }

    if converged {
        info!("policy iteration converged after {} iterations", iterations);
    } else {
        warn!(
            "policy iteration stopped after {} iterations with an unstable policy",
            iterations
        );
    }

    Ok(PolicyIterationResult {
        q,
        policy,
        utility_history,
        iterations,
        evaluation_sweeps,
        converged,
    })
}
