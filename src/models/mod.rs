pub mod program;
pub mod progress;
pub mod selection;
pub mod user;
pub mod workout;

pub use program::{Difficulty, Goal, Location, Program, ProgramFilter};
pub use progress::{CompletionState, CompletionUpdate, NewProgressRequest, ProgressRecord};
pub use selection::{CachedMatch, Selection};
pub use user::{NewUserRequest, SessionContext, User};
pub use workout::{Exercise, Workout, WorkoutLookup};
