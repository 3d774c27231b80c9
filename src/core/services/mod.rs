pub mod category_registry;
pub mod log_repository;
pub mod summary_service;

pub use category_registry::CategoryRegistry;
pub use log_repository::LogRepository;
pub use summary_service::{CategoryTotal, DailySummary, SummaryService};
