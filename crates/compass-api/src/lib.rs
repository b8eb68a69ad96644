pub mod admin;
pub mod assessment;
pub mod assignment;
pub mod auth;
pub mod config;
pub mod error;
pub mod horoscope;
pub mod jobs;
pub mod mentor;
pub mod metrics;
pub mod middleware;
pub mod payment;
pub mod router;
pub mod state;
pub mod student;
pub mod tracing;
pub mod v1;
pub mod validation;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig};
