//! Store accessor abstraction (mechanics only).
//!
//! The view-model talks to storage exclusively through [`ItemDao`]. Queries
//! are live: a stream yields the current result first and then a fresh
//! result after every change that may affect it, until the stream is
//! dropped. Writes are one-shot async calls.
//!
//! Implementations serialize their own writes; callers never lock.

use std::pin::Pin;

use async_trait::async_trait;
use tokio_stream::Stream;
use vacation_core::ItemId;

use crate::error::DaoResult;
use crate::item::VacationItem;

/// A live query result.
pub type ItemStream<T> = Pin<Box<dyn Stream<Item = T> + Send + 'static>>;

/// Asynchronous access to stored vacation items.
#[async_trait]
pub trait ItemDao: Send + Sync {
    /// Every stored item, ordered by id.
    fn items(&self) -> ItemStream<Vec<VacationItem>>;

    /// The item stored under `id`; `None` while there is none.
    fn item(&self, id: ItemId) -> ItemStream<Option<VacationItem>>;

    /// Store a new item and return its id.
    ///
    /// An unsaved id (`0`) asks the store to assign one.
    async fn insert(&self, item: VacationItem) -> DaoResult<ItemId>;

    /// Replace every field of the item with the same id.
    async fn update(&self, item: VacationItem) -> DaoResult<()>;

    /// Remove the item with the same id.
    async fn delete(&self, item: VacationItem) -> DaoResult<()>;
}
