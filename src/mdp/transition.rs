//! Legality, successors and rewards of grid moves.

use crate::error::Result;
use crate::mdp::action::Action;
use crate::mdp::config::GridWorldConfig;
use crate::mdp::grid::{Grid, Position};

/// A grid paired with a validated configuration.
///
/// Moves that leave the grid or run into a wall are illegal; an illegal
/// outcome leaves the agent where it is.
#[derive(Debug, Clone, Copy)]
pub struct TransitionModel<'a> {
    grid: &'a Grid,
    config: &'a GridWorldConfig,
}

impl<'a> TransitionModel<'a> {
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `config` fails [`GridWorldConfig::validate`].
    pub fn new(grid: &'a Grid, config: &'a GridWorldConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { grid, config })
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    pub fn config(&self) -> &'a GridWorldConfig {
        self.config
    }

    /// True when `action` taken at `position` lands on an in-bounds, non-wall cell.
    pub fn is_legal(&self, action: Action, position: Position) -> bool {
        let destination = self.apply(action, position);
        self.grid.in_bounds(destination) && !self.grid.is_wall(destination)
    }

    /// Coordinate transform only; pair with [`TransitionModel::is_legal`].
    pub fn apply(&self, action: Action, position: Position) -> Position {
        action.apply(position)
    }

    /// Where the agent ends up: the destination if legal, otherwise `position`.
    pub fn successor(&self, action: Action, position: Position) -> Position {
        if self.is_legal(action, position) {
            self.apply(action, position)
        } else {
            position
        }
    }

    /// Reward of occupying `position`. Off-grid positions earn nothing.
    pub fn reward(&self, position: Position) -> f64 {
        self.grid
            .cell(position)
            .map_or(0.0, |cell| self.config.rewards.reward(cell))
    }

    /// Legal actions at `position`, in canonical order.
    pub fn legal_actions(&self, position: Position) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|&action| self.is_legal(action, position))
            .collect()
    }

    /// The three actions an intended action can resolve to, with their
    /// probabilities: intended, clockwise slip, counter-clockwise slip.
    pub fn outcomes(&self, intended: Action) -> [(Action, f64); 3] {
        [
            (intended, self.config.intended_probability),
            (intended.rotate_cw(), self.config.slip_probability),
            (intended.rotate_ccw(), self.config.slip_probability),
        ]
    }
}
