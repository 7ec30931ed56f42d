//! ViewPost: host health and synthetic load service.
//!
//! Reports CPU, memory and disk utilization for load balancer health checks and
//! offers a CPU stress endpoint for exercising autoscaling and health check
//! behavior end to end.

pub mod config;
pub mod counter;
pub mod error;
pub mod health;
pub mod http;
pub mod load;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
