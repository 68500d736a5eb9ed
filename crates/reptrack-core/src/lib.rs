pub mod calories;
pub mod config;
pub mod goals;
pub mod recorder;
pub mod stats;
pub mod store;

pub use calories::calculate_calories;
pub use config::{get_data_dir, Config};
pub use recorder::{Recorder, RecordingSummary};
pub use stats::{HistoryWindow, StatsAggregator};
pub use store::WorkoutStore;
