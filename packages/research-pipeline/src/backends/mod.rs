//! HTTP backend implementations.

mod http;

pub use http::{ReqwestBackend, DEFAULT_USER_AGENT};
