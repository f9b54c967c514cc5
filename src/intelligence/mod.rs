pub mod insights;
pub mod performance;
pub mod policy;
pub mod settlement;

pub use insights::derive_insights;
pub use performance::{summarize, summarize_by_model, ModelPerformance};
pub use policy::{should_retrain, RetrainThresholds};
pub use settlement::{grade, pick_for_outcome, profit_loss, GradedPick, PickParseError};
