pub mod app;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod fusion;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod state;
pub mod stats;
pub mod table;
pub mod trend;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use pipeline::load_table;
pub use state::AppState;
