//! Core types and trait definitions for Markr.
//!
//! This crate is deliberately free of HTTP, XML, and database dependencies.
//! It owns the domain model, the persistence abstraction, the merge policy
//! applied to incoming results, and the aggregate statistics over a test.

pub mod aggregate;
pub mod error;
pub mod merge;
pub mod model;
pub mod store;
pub mod work;

pub use error::{Error, Result};
