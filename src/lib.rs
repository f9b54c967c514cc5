pub mod config;
pub mod db;
pub mod errors;
pub mod intelligence;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod providers;
pub mod services;

pub use services::ImprovementEngine;
