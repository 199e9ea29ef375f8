//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Token issuance, refresh and verification plus bearer resolution live
//! here; password hashing is shared with user management.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod service;
pub mod repo;
pub mod tokens;

pub use service::AuthService;
