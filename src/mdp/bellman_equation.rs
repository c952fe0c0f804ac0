//! The Bellman backup shared by value iteration and policy iteration.

use crate::mdp::action::Action;
use crate::mdp::config::RewardConvention;
use crate::mdp::grid::Position;
use crate::mdp::transition::TransitionModel;

/// Computes Q(s, a) = sum_k p_k [ R + gamma * V(s'_k) ] over the intended
/// move and its two side slips, where an illegal outcome leaves the agent at `s`.
///
/// `next_value` supplies V(s'). Value iteration passes the max over the
/// successor's actions; policy evaluation passes the successor's own policy
/// slot. Returns `None` if any successor has no value.
///
/// # Examples
///
/// ```
/// use grid_mdp::mdp::{backup, Action, Grid, GridWorldConfig, Position, TransitionModel};
///
/// let grid = Grid::new(1, 2).unwrap();
/// let config = GridWorldConfig::default();
/// let model = TransitionModel::new(&grid, &config).unwrap();
///
/// // Every successor is worth zero, so only the step cost remains.
/// let q = backup(&model, Position::new(0, 0), Action::East, |_| Some(0.0)).unwrap();
/// assert!((q - -0.05).abs() < 1e-12);
/// ```
pub fn backup<F>(
    model: &TransitionModel<'_>,
    position: Position,
    action: Action,
    next_value: F,
) -> Option<f64>
where
    F: Fn(Position) -> Option<f64>,
{
    let config = model.config();
    let gamma = config.discount;

    let mut expected = 0.0;
    for (outcome, probability) in model.outcomes(action) {
        let next = model.successor(outcome, position);
        let value = next_value(next)?;
        expected += match config.reward_convention {
            RewardConvention::CurrentCell => probability * value,
            RewardConvention::Destination => probability * (model.reward(next) + gamma * value),
        };
    }

    Some(match config.reward_convention {
        RewardConvention::CurrentCell => model.reward(position) + gamma * expected,
        RewardConvention::Destination => expected,
    })
}
