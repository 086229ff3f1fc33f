pub mod auth;
pub mod request_id;
pub mod tracking;

pub use auth::AdminAuth;
pub use request_id::{RequestId, RequestIdMiddleware};
pub use tracking::VisitTracking;
