//! In-memory implementations of every store port.
//!
//! Used by tests and as the fallback when no database is configured.
//! Note: Data is lost on process restart.

mod store;

pub use store::InMemorySocialStore;

#[cfg(test)]
mod tests;
