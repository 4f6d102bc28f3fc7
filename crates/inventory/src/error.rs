//! Store and view-model errors.

use thiserror::Error;
use vacation_core::ItemId;

pub type DaoResult<T> = Result<T, DaoError>;

/// Failure reported by a store accessor.
///
/// The view-model never hands these to its caller; they end up in the log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DaoError {
    /// An insert carried an id that is already taken.
    #[error("item {0} already exists")]
    Conflict(ItemId),

    /// The backing storage failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DaoError {
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

/// Failure while building a view-model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewModelError {
    /// Construction happened outside an async runtime.
    #[error("no async runtime available for the view-model scope")]
    NoRuntime,

    /// The factory does not know how to build the requested type.
    #[error("unknown view-model type: {0}")]
    UnknownViewModel(&'static str),
}
