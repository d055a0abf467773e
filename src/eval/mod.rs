//! Position evaluation

pub mod heuristic;
pub mod options;
pub mod patterns;

pub use heuristic::{center_bonus, evaluate_board, Evaluator, OpponentThreats};
pub use options::EvaluationOptions;
pub use patterns::{PatternScore, Tier};
