pub mod progress;
pub mod workout;

pub use progress::{ExerciseProgressEntry, NewExerciseProgress};
pub use workout::{NewWorkoutRecord, WeightEntry, WorkoutRecord};
