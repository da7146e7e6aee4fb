//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and token verification. The verified token yields the
//! `CurrentUser` every title operation is scoped to.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;

pub use domain::CurrentUser;
pub use service::AuthService;
