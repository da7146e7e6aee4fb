//! Title module: per-user CRUD over financial titles.
//!
//! Same layering as `auth`: domain shapes and mapping, a repository trait
//! with SeaORM and in-memory implementations, and the business service.

pub mod domain;
pub mod repository;
pub mod service;
pub mod repo;

pub use domain::{Title, TitleRequest, TitleResponse};
pub use service::TitleService;
