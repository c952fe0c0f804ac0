//! Solver configuration: discount, reward table and slip probabilities.

use crate::error::{Error, Result};
use crate::mdp::grid::CellType;

/// Which cell's reward a move earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewardConvention {
    /// The cost of occupying the cell the agent is leaving.
    #[default]
    CurrentCell,
    /// The reward of the cell each stochastic outcome lands on.
    Destination,
}

/// Reward per cell type.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardTable {
    pub goal: f64,
    pub penalty: f64,
    pub neutral: f64,
    pub start: f64,
    /// Walls are never occupied, so this only matters for lookups.
    pub wall: f64,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            goal: 1.0,
            penalty: -1.0,
            neutral: -0.05,
            start: -0.05,
            wall: 0.0,
        }
    }
}

impl RewardTable {
    pub fn reward(&self, cell: CellType) -> f64 {
        match cell {
            CellType::Goal => self.goal,
            CellType::Penalty => self.penalty,
            CellType::Neutral => self.neutral,
            CellType::Start => self.start,
            CellType::Wall => self.wall,
        }
    }
}

/// Configuration options for the grid-world solvers.
#[derive(Debug, Clone, PartialEq)]
pub struct GridWorldConfig {
    /// Discount factor (0 <= gamma < 1)
    pub discount: f64,
    pub rewards: RewardTable,
    /// Probability that the intended action is carried out
    pub intended_probability: f64,
    /// Probability of slipping to each perpendicular action
    pub slip_probability: f64,
    pub reward_convention: RewardConvention,
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self {
            discount: 0.99,
            rewards: RewardTable::default(),
            intended_probability: 0.8,
            slip_probability: 0.1,
            reward_convention: RewardConvention::CurrentCell,
        }
    }
}

impl GridWorldConfig {
    /// Checks that the discount is a contraction and that the outcome
    /// probabilities form a distribution.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.discount) {
            return Err(Error::InvalidInput(format!(
                "discount factor must be in [0, 1), got {}",
                self.discount
            )));
        }
        if !(self.intended_probability >= 0.0 && self.slip_probability >= 0.0) {
            return Err(Error::InvalidInput(
                "outcome probabilities must be non-negative".to_string(),
            ));
        }
        let total = self.intended_probability + 2.0 * self.slip_probability;
        // Allow a little floating error
        if (total - 1.0).abs() > 1e-8 {
            return Err(Error::InvalidInput(format!(
                "outcome probabilities must sum to 1.0, but got {}",
                total
            )));
        }
        let rewards = &self.rewards;
        let entries = [
            rewards.goal,
            rewards.penalty,
            rewards.neutral,
            rewards.start,
            rewards.wall,
        ];
        if entries.iter().any(|r| !r.is_finite()) {
            return Err(Error::InvalidInput(
                "rewards must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
