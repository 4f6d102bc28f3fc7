//! `vacation-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no runtime):
//! identifiers, the error model and the date formatting helpers.

pub mod date;
pub mod entity;
pub mod error;
pub mod id;

pub use date::{DateFormatError, DatePattern, YYYY_MM_DD_DATE_FORMAT};
pub use entity::Entity;
pub use error::DomainError;
pub use id::ItemId;
