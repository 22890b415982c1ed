pub mod hydrator;
pub mod matcher;
pub mod progress_store;
pub mod session;
pub mod toggle;
pub mod tracker;

pub use hydrator::{DetailView, WorkoutContent, WorkoutDetailHydrator};
pub use matcher::{MatchOutcome, ProgramMatcher};
pub use progress_store::{LogDuplicates, ProgressReconciler, ProgressStore};
pub use session::{Landing, SessionBootstrap};
pub use toggle::CompletionToggle;
pub use tracker::{TrackerAggregator, TrackerSummary};
