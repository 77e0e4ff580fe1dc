//! Request plumbing: request description, authentication, retry and the
//! transport seam.

pub mod auth;
pub mod request;
pub mod retry;
pub mod transport;

pub use auth::{Authenticated, Authenticator};
pub use request::{ApiRequest, HttpRequest, Target};
pub use retry::{RetryDecision, RetryPolicy};
pub use transport::{HttpResponse, ReqwestTransport, Transport, build_client};
