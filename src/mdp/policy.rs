//! Greedy policy and state values from a converged action-value matrix.

use crate::mdp::action_values::{ActionValues, PolicyMap, ValueMap};

/// Rounds to three decimals so printed values stay stable.
fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Returns the greedy policy and the best value of every open cell.
///
/// Only legal actions are candidates; ties go to the first action in
/// canonical order. Walls, and open cells with no legal move, stay unset in
/// both maps.
pub fn extract_policy(q: &ActionValues) -> (PolicyMap, ValueMap) {
    let (rows, cols) = q.dim();
    let mut policy = PolicyMap::empty(rows, cols);
    let mut values = ValueMap::empty(rows, cols);

    for (position, cell) in q.indexed_iter() {
        if let Some((action, value)) = cell.best() {
            policy.set(position, Some(action));
            values.set(position, Some(round3(value)));
        }
    }

    (policy, values)
}
