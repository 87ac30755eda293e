// Embedded Redis Core - Domain Logic, Ports & Supervisor
// NO OS adapters here (hexagonal layout); see embedded-redis-infra-system

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
