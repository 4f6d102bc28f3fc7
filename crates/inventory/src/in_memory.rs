//! In-memory item store for tests/dev.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use vacation_core::{Entity, ItemId};

use crate::dao::{ItemDao, ItemStream};
use crate::error::{DaoError, DaoResult};
use crate::item::VacationItem;

#[derive(Debug, Clone)]
struct Table {
    rows: BTreeMap<ItemId, VacationItem>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

/// In-memory item store.
///
/// - Rows live inside a `watch` channel, so every write wakes every live query
/// - Ids are assigned from a counter and never reused
/// - An insert with an id that is already taken is ignored
#[derive(Debug)]
pub struct InMemoryItemDao {
    table: watch::Sender<Table>,
}

impl InMemoryItemDao {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `items`.
    ///
    /// Items with an unsaved id get the next free one; items whose id is
    /// already taken are skipped.
    pub fn with_items(items: impl IntoIterator<Item = VacationItem>) -> Self {
        let dao = Self::new();
        for item in items {
            if let Err(err) = dao.insert_row(item) {
                tracing::debug!(error = %err, "skipping seed item");
            }
        }
        dao
    }

    /// Current rows, ordered by id.
    pub fn snapshot(&self) -> Vec<VacationItem> {
        self.table.borrow().rows.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.table.borrow().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live query streams currently subscribed to the table.
    pub fn live_queries(&self) -> usize {
        self.table.receiver_count()
    }

    fn insert_row(&self, mut item: VacationItem) -> DaoResult<ItemId> {
        let mut outcome = Err(DaoError::storage("insert was not applied"));

        self.table.send_if_modified(|table| {
            let id = if item.id.is_unsaved() {
                ItemId::new(table.next_id)
            } else if table.rows.contains_key(item.id()) {
                outcome = Err(DaoError::Conflict(item.id));
                return false;
            } else {
                item.id
            };

            table.next_id = table.next_id.max(id.get().saturating_add(1));
            item.id = id;
            table.rows.insert(id, item);
            outcome = Ok(id);
            true
        });

        outcome
    }
}

impl Default for InMemoryItemDao {
    fn default() -> Self {
        let (table, _) = watch::channel(Table::default());
        Self { table }
    }
}

#[async_trait]
impl ItemDao for InMemoryItemDao {
    fn items(&self) -> ItemStream<Vec<VacationItem>> {
        Box::pin(
            WatchStream::new(self.table.subscribe())
                .map(|table| table.rows.into_values().collect()),
        )
    }

    fn item(&self, id: ItemId) -> ItemStream<Option<VacationItem>> {
        Box::pin(
            WatchStream::new(self.table.subscribe()).map(move |mut table| table.rows.remove(&id)),
        )
    }

    async fn insert(&self, item: VacationItem) -> DaoResult<ItemId> {
        self.insert_row(item)
    }

    async fn update(&self, item: VacationItem) -> DaoResult<()> {
        self.table.send_if_modified(|table| match table.rows.get_mut(item.id()) {
            Some(row) => {
                *row = item;
                true
            }
            None => false,
        });
        Ok(())
    }

    async fn delete(&self, item: VacationItem) -> DaoResult<()> {
        self.table
            .send_if_modified(|table| table.rows.remove(item.id()).is_some());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camp() -> VacationItem {
        VacationItem::new("Camp", "Lake", "2024-01-01", "2024-01-05")
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let dao = InMemoryItemDao::new();

        let first = dao.insert(camp()).await.unwrap();
        let second = dao.insert(camp()).await.unwrap();

        assert_eq!(first, ItemId::new(1));
        assert_eq!(second, ItemId::new(2));
        assert_eq!(dao.len(), 2);
    }

    #[tokio::test]
    async fn insert_with_taken_id_is_ignored() {
        let dao = InMemoryItemDao::new();
        let id = dao.insert(camp()).await.unwrap();

        let clash = VacationItem::with_id(id, "Other", "Elsewhere", "", "");
        let err = dao.insert(clash).await.unwrap_err();

        assert_eq!(err, DaoError::Conflict(id));
        assert_eq!(dao.snapshot()[0].title, "Camp");
    }

    #[tokio::test]
    async fn explicit_ids_are_kept_and_never_reused() {
        let dao = InMemoryItemDao::new();

        let explicit = VacationItem::with_id(ItemId::new(10), "Ski", "Alps", "", "");
        assert_eq!(dao.insert(explicit.clone()).await.unwrap(), ItemId::new(10));
        assert_eq!(dao.insert(camp()).await.unwrap(), ItemId::new(11));

        dao.delete(explicit).await.unwrap();
        assert_eq!(dao.insert(camp()).await.unwrap(), ItemId::new(12));
    }

    #[tokio::test]
    async fn items_stream_replays_then_follows_changes() {
        let dao = InMemoryItemDao::with_items([camp()]);
        let mut items = dao.items();

        let current = items.next().await.unwrap();
        assert_eq!(current.len(), 1);

        dao.insert(camp()).await.unwrap();
        let next = items.next().await.unwrap();
        assert_eq!(
            next.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![ItemId::new(1), ItemId::new(2)]
        );
    }

    #[tokio::test]
    async fn item_stream_tracks_one_record() {
        let dao = InMemoryItemDao::new();
        let mut item = dao.item(ItemId::new(1));

        assert_eq!(item.next().await.unwrap(), None);

        dao.insert(camp()).await.unwrap();
        let stored = item.next().await.unwrap().unwrap();
        assert_eq!(stored.id, ItemId::new(1));
        assert_eq!(stored.place, "Lake");

        dao.delete(stored).await.unwrap();
        assert_eq!(item.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let dao = InMemoryItemDao::with_items([camp()]);
        let replacement =
            VacationItem::with_id(ItemId::new(1), "Cabin", "Forest", "2024-02-01", "2024-02-03");

        dao.update(replacement.clone()).await.unwrap();

        assert_eq!(dao.snapshot(), vec![replacement]);
    }

    #[tokio::test]
    async fn update_and_delete_of_missing_ids_change_nothing() {
        let dao = InMemoryItemDao::with_items([camp()]);
        let before = dao.snapshot();
        let ghost = VacationItem::with_id(ItemId::new(99), "Ghost", "Nowhere", "", "");

        dao.update(ghost.clone()).await.unwrap();
        dao.delete(ghost).await.unwrap();

        assert_eq!(dao.snapshot(), before);
    }

    #[tokio::test]
    async fn dropped_streams_unsubscribe() {
        let dao = InMemoryItemDao::new();
        let items = dao.items();
        let item = dao.item(ItemId::new(1));
        assert_eq!(dao.live_queries(), 2);

        drop(items);
        drop(item);
        assert_eq!(dao.live_queries(), 0);
    }

    #[test]
    fn seeding_skips_taken_ids() {
        let first = VacationItem::with_id(ItemId::new(3), "A", "B", "", "");
        let clash = VacationItem::with_id(ItemId::new(3), "C", "D", "", "");

        let dao = InMemoryItemDao::with_items([first.clone(), clash]);

        assert_eq!(dao.snapshot(), vec![first]);
        assert!(!dao.is_empty());
    }
}
