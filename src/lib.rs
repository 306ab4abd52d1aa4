pub mod app;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod stats;
pub mod storage;
pub mod state;

pub use app::router;
pub use state::AppState;
pub use stats::{compute_stats, compute_stats_today};
pub use storage::{load_data, resolve_data_path};
