//! # Feedline Core
//!
//! The domain layer of the feed engine.
//! This crate contains the feed waterfall, the interaction toggles and the
//! block relation rules, with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
