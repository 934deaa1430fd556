//! # Folio Core
//!
//! The domain layer of Folio: entities, visibility rules, the post pre-save
//! hook and the ports storage must implement.
//! This crate contains pure business logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod publishing;
pub mod visibility;

pub use error::{DomainError, RepoError};
pub use visibility::{PostScope, Viewer, VisibilityRule};
