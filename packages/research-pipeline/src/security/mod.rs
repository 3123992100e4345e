//! Security: SSRF protection for candidate URLs and secret handling.

mod credentials;
mod guard;

pub use credentials::SecretString;
pub use guard::HostGuard;
