//! Grid-world Markov Decision Processes.
//!
//! This module solves a fully observed maze of typed cells under a noisy
//! movement model:
//! - Transition model (legality, successors, rewards, 80/10/10 slip)
//! - Value iteration
//! - Policy iteration
//! - Greedy policy extraction
//! - Stochastic execution of a policy
//!
//! # Examples
//!
//! ```rust
//! use grid_mdp::mdp::{
//!     extract_policy, value_iteration, Action, CellType, Grid, GridWorldConfig, Position,
//!     TransitionModel,
//! };
//!
//! let grid = Grid::with_cells(
//!     3,
//!     3,
//!     &[(0, 2, CellType::Goal), (2, 0, CellType::Penalty)],
//! )
//! .unwrap();
//! let config = GridWorldConfig::default();
//! let model = TransitionModel::new(&grid, &config).unwrap();
//!
//! let result = value_iteration(&model, 1000, 0.001).unwrap();
//! assert!(result.converged);
//!
//! let (policy, _values) = extract_policy(&result.q);
//! assert_eq!(policy.get(Position::new(0, 1)), Some(Action::East));
//! ```

pub mod action;
pub mod action_values;
pub mod bellman_equation;
pub mod config;
pub mod executor;
pub mod grid;
pub mod policy;
pub mod policy_iteration;
pub mod transition;
pub mod value_iteration;


pub use action::{Action, NUM_ACTIONS};
pub use action_values::{ActionValues, CellValues, PolicyMap, UtilityHistory, ValueMap};
pub use bellman_equation::backup;
pub use config::{GridWorldConfig, RewardConvention, RewardTable};
pub use executor::{Agent, StochasticExecutor};
pub use grid::{CellType, Grid, Position};
pub use policy::extract_policy;
pub use policy_iteration::{policy_iteration, PolicyIterationResult};
pub use transition::TransitionModel;
pub use value_iteration::{value_iteration, ValueIterationResult};

use crate::error::{Error, Result};

/// Checks the iteration budget and convergence threshold shared by both solvers.
pub(crate) fn validate_budget(max_iterations: usize, epsilon: f64) -> Result<()> {
    if max_iterations == 0 {
        return Err(Error::InvalidInput(
            "iteration budget must be positive".to_string(),
        ));
    }
    if epsilon.is_nan() || epsilon < 0.0 {
        return Err(Error::InvalidInput(format!(
            "convergence threshold must be non-negative, got {}",
            epsilon
        )));
    }
    Ok(())
}
