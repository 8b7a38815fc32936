pub mod app;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod handlers;
pub mod id;
pub mod models;
pub mod reconcile;
pub mod state;
pub mod stats;
pub mod store;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use store::HabitStore;
