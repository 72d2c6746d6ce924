pub mod analyzers;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod readers;
pub mod session;
pub mod utils;
pub mod writers;

pub use config::{DashboardConfig, RankingScope};
pub use error::{ProcessingError, Result};
pub use session::{DashboardSession, DashboardView};
