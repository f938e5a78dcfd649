// Concrete implementations for external systems: the vendor API, its token endpoint, and local disk.

pub mod auth;
pub mod http;
pub mod storage;

pub use auth::{AuthClient, Session};
pub use http::ApiClient;
pub use storage::LocalStorage;
