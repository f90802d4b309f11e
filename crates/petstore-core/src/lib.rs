//! Pet Store Core: domain models, repository traits, pagination and
//! error types shared by every other crate in the workspace.

pub mod error;
pub mod identity;
pub mod models;
pub mod pagination;
pub mod repository;
