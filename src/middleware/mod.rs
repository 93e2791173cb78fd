pub mod api_logging;
pub mod auth;
pub mod health;
pub mod tenant;

pub use api_logging::{set_request_msg, ApiLogging};
pub use auth::CurrentUser;
pub use health::HealthCheck;
pub use tenant::TenantContext;
