pub mod handlers;
pub mod server;

pub use handlers::{ApiError, HealthResponse};
pub use server::ApiServer;
