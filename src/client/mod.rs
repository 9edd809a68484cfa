//! Portal HTTP client
//!
//! [`request::PortalClient`] implements [`crate::interface::RequestApi`]
//! against the live portal using reqwest.

pub mod request;

pub use request::PortalClient;
