//! Business layer for the CRAS Digital API.
//! - Ownership-scoped access decisions (`access`) shared by every scoped resource.
//! - Token auth (`auth`) and user/profile management (`users`).
//! - Catalog, scheduling and support operations on top of `models`.

pub mod errors;
pub mod access;
pub mod auth;
pub mod users;
pub mod catalog;
pub mod appointments;
pub mod support;
mod nullable;
#[cfg(any(test, feature = "testing"))]
pub mod test_support;
