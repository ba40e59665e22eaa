pub mod progress_model;
pub mod progress_store;
pub mod refresh_service;

pub use progress_model::{ProgressKey, ProgressSnapshot, RefreshStatus};
pub use progress_store::ProgressStore;
pub use refresh_service::{Clock, RefreshService, RefreshStarted, TestPriceReport};
