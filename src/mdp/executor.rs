//! Stochastic execution of moves for rollouts and animation.
//!
//! Independent of the solvers: the executor only needs the transition model.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::mdp::action::Action;
use crate::mdp::action_values::PolicyMap;
use crate::mdp::grid::{CellType, Position};
use crate::mdp::transition::TransitionModel;

/// Applies the intended/slip noise model to single moves.
#[derive(Debug, Clone)]
pub struct StochasticExecutor {
    rng: ChaCha20Rng,
}

impl Default for StochasticExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl StochasticExecutor {
    /// Create an executor seeded from system entropy
    pub fn new() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Create an executor with a fixed seed for reproducible rollouts
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Picks the action actually carried out: the intended one with the
    /// configured probability, otherwise one of the two side slips.
    pub fn resolve(&mut self, model: &TransitionModel<'_>, intended: Action) -> Action {
        let config = model.config();
        let sample: f64 = self.rng.gen();
        if sample < config.intended_probability {
            intended
        } else if sample < config.intended_probability + config.slip_probability {
            intended.rotate_cw()
        } else {
            intended.rotate_ccw()
        }
    }

    /// One noisy move. Illegal outcomes leave the agent at `position`.
    pub fn step(
        &mut self,
        model: &TransitionModel<'_>,
        position: Position,
        intended: Action,
    ) -> Position {
        let action = self.resolve(model, intended);
        model.successor(action, position)
    }

    /// Follows `policy` from `start` for at most `max_steps` moves.
    ///
    /// The trajectory includes `start`. It ends early on a goal cell or a
    /// cell with no policy action.
    pub fn rollout(
        &mut self,
        model: &TransitionModel<'_>,
        start: Position,
        policy: &PolicyMap,
        max_steps: usize,
    ) -> Vec<Position> {
        let grid = model.grid();
        let mut trajectory = vec![start];
        let mut position = start;

        for _ in 0..max_steps {
            if grid.cell(position) == Some(CellType::Goal) {
                break;
            }
            let Some(action) = policy.get(position) else {
                break;
            };
            position = self.step(model, position, action);
            trajectory.push(position);
        }

        trajectory
    }
}

/// An agent walking the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    position: Position,
}

impl Agent {
    pub fn new(start: Position) -> Self {
        Self { position: start }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Deterministic move. Returns false, without moving, when the move hits
    /// a wall or leaves the grid.
    pub fn try_move(&mut self, model: &TransitionModel<'_>, action: Action) -> bool {
        if model.is_legal(action, self.position) {
            self.position = model.apply(action, self.position);
            true
        } else {
            false
        }
    }

    /// Noisy move through `executor`. Returns the new position.
    pub fn step(
        &mut self,
        model: &TransitionModel<'_>,
        action: Action,
        executor: &mut StochasticExecutor,
    ) -> Position {
        self.position = executor.step(model, self.position, action);
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mdp::config::GridWorldConfig;
    use crate::mdp::grid::Grid;

    #[test]
    fn test_deterministic_config_always_moves_as_intended() {
        let grid = Grid::new(3, 3).unwrap();
        let config = GridWorldConfig {
            intended_probability: 1.0,
            slip_probability: 0.0,
            ..Default::default()
        };
        let model = TransitionModel::new(&grid, &config).unwrap();
        let mut executor = StochasticExecutor::with_seed(7);

        for _ in 0..100 {
            assert_eq!(
                executor.step(&model, Position::new(1, 1), Action::North),
                Position::new(0, 1)
            );
        }
    }

    #[test]
    fn test_blocked_moves_stay_put() {
        // 0 W
        let grid = Grid::with_cells(1, 2, &[(0, 1, CellType::Wall)]).unwrap();
        let config = GridWorldConfig::default();
        let model = TransitionModel::new(&grid, &config).unwrap();
        let mut executor = StochasticExecutor::with_seed(42);

        // Every outcome of East (wall, or off-grid slips) is illegal.
        for _ in 0..100 {
            assert_eq!(
                executor.step(&model, Position::new(0, 0), Action::East),
                Position::new(0, 0)
            );
        }
    }

    #[test]
    fn test_slip_frequencies() {
        let grid = Grid::new(3, 3).unwrap();
        let config = GridWorldConfig::default();
        let model = TransitionModel::new(&grid, &config).unwrap();
        let mut executor = StochasticExecutor::with_seed(12345);

        let trials = 20_000;
        let (mut intended, mut cw, mut ccw) = (0, 0, 0);
        for _ in 0..trials {
            match executor.step(&model, Position::new(1, 1), Action::North) {
                p if p == Position::new(0, 1) => intended += 1,
                p if p == Position::new(1, 2) => cw += 1,
                p if p == Position::new(1, 0) => ccw += 1,
                other => panic!("unexpected successor {}", other),
            }
        }

        let frac = |n: i32| n as f64 / trials as f64;
        assert!((frac(intended) - 0.8).abs() < 0.02);
        assert!((frac(cw) - 0.1).abs() < 0.02);
        assert!((frac(ccw) - 0.1).abs() < 0.02);
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let grid = Grid::with_cells(3, 3, &[(0, 2, CellType::Goal)]).unwrap();
        let config = GridWorldConfig::default();
        let model = TransitionModel::new(&grid, &config).unwrap();
        let mut policy = PolicyMap::empty(3, 3);
        for position in grid.positions() {
            policy.set(position, Some(Action::North));
        }

        let a = StochasticExecutor::with_seed(3).rollout(&model, Position::new(2, 0), &policy, 50);
        let b = StochasticExecutor::with_seed(3).rollout(&model, Position::new(2, 0), &policy, 50);
        assert_eq!(a, b);
        assert_eq!(a[0], Position::new(2, 0));
        assert!(a.len() <= 51);
    }

    #[test]
    fn test_rollout_stops_at_goal() {
        let grid = Grid::with_cells(1, 2, &[(0, 1, CellType::Goal)]).unwrap();
        let config = GridWorldConfig {
            intended_probability: 1.0,
            slip_probability: 0.0,
            ..Default::default()
        };
        let model = TransitionModel::new(&grid, &config).unwrap();
        let mut policy = PolicyMap::empty(1, 2);
        policy.set(Position::new(0, 0), Some(Action::East));

        let trajectory =
            StochasticExecutor::with_seed(1).rollout(&model, Position::new(0, 0), &policy, 10);
        assert_eq!(trajectory, vec![Position::new(0, 0), Position::new(0, 1)]);
    }

    #[test]
    fn test_agent_try_move() {
        let grid = Grid::with_cells(2, 2, &[(1, 1, CellType::Wall)]).unwrap();
        let config = GridWorldConfig::default();
        let model = TransitionModel::new(&grid, &config).unwrap();
        let mut agent = Agent::new(Position::new(0, 0));

        assert!(!agent.try_move(&model, Action::North));
        assert_eq!(agent.position(), Position::new(0, 0));
        assert!(agent.try_move(&model, Action::East));
        assert_eq!(agent.position(), Position::new(0, 1));
        assert!(!agent.try_move(&model, Action::South)); // wall
        assert_eq!(agent.position(), Position::new(0, 1));
    }

    #[test]
    fn test_agent_step_stays_on_grid() {
        let grid = Grid::with_cells(2, 2, &[(1, 1, CellType::Wall)]).unwrap();
        let config = GridWorldConfig::default();
        let model = TransitionModel::new(&grid, &config).unwrap();
        let mut agent = Agent::new(Position::new(0, 0));
        let mut executor = StochasticExecutor::with_seed(99);

        for _ in 0..200 {
            let position = agent.step(&model, Action::South, &mut executor);
            assert!(grid.in_bounds(position));
            assert!(!grid.is_wall(position));
        }
    }
}
