pub mod improvement;
pub mod lifecycle;
pub mod recorder;
pub mod resolver;
pub mod snapshot;

pub use improvement::{run_improvement_loop, CycleSettings, ImprovementEngine};
pub use lifecycle::ModelLifecycleManager;
pub use recorder::PredictionRecorder;
pub use resolver::{OutcomeResolver, ResolutionSummary};
pub use snapshot::SnapshotCapturer;
