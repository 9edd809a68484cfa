//! Data structures shared by the catalog, the poller and the HTTP client

pub mod dtos;
pub mod structs;

pub use dtos::{PollConfig, RegistrationForm};
pub use structs::{CourseCategory, CourseRecord};
