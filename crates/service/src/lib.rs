//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access through repository traits.
//! - Reuses column validation and entity definitions from the `models` crate.
//! - Takes the authenticated principal as an explicit argument on every call.

pub mod errors;
pub mod auth;
pub mod title;
#[cfg(test)]
pub mod test_support;
