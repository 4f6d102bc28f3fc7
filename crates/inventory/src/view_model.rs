//! View-model mediating between the UI and the item store.

use std::sync::Arc;

use vacation_core::ItemId;
use vacation_core::date::DatePattern;

use crate::config::ViewModelConfig;
use crate::dao::ItemDao;
use crate::error::ViewModelError;
use crate::item::VacationItem;
use crate::live::LiveData;
use crate::scope::ViewModelScope;

/// Keeps a reference to the item store and an up-to-date list of all items.
///
/// Writes are fire-and-forget: each one is launched in the view-model's
/// [`ViewModelScope`] and its outcome is only logged. Dropping the view-model
/// aborts writes that have not completed and stops every live query it
/// started.
pub struct InventoryViewModel {
    dao: Arc<dyn ItemDao>,
    config: ViewModelConfig,
    all_items: LiveData<Vec<VacationItem>>,
    scope: ViewModelScope,
}

impl core::fmt::Debug for InventoryViewModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InventoryViewModel")
            .field("config", &self.config)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl InventoryViewModel {
    /// Build a view-model over `dao`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(dao: Arc<dyn ItemDao>, config: ViewModelConfig) -> Result<Self, ViewModelError> {
        let scope = ViewModelScope::new(config.name.clone())?;
        let all_items = LiveData::launch(&scope, "all_items", dao.items());
        Ok(Self {
            dao,
            config,
            all_items,
            scope,
        })
    }

    /// Live list of every stored item.
    pub fn all_items(&self) -> &LiveData<Vec<VacationItem>> {
        &self.all_items
    }

    pub fn config(&self) -> &ViewModelConfig {
        &self.config
    }

    pub fn scope(&self) -> &ViewModelScope {
        &self.scope
    }

    /// Returns true if the item can be sold.
    ///
    /// There is no stock model, so every item is available.
    pub fn is_stock_available(&self, _item: &VacationItem) -> bool {
        true
    }

    /// Replace every field of the stored item `id`.
    pub fn update_item(
        &self,
        id: ItemId,
        title: impl Into<String>,
        place: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) {
        let item = VacationItem::with_id(id, title, place, start_date, end_date);
        let dao = Arc::clone(&self.dao);
        let scope = self.config.name.clone();
        self.scope.launch("update_item", async move {
            if let Err(err) = dao.update(item).await {
                tracing::warn!(scope = %scope, item_id = %id, error = %err, "update failed");
            }
        });
    }

    /// Selling is not modelled; this does nothing.
    pub fn sell_item(&self, item: &VacationItem) {
        tracing::debug!(scope = %self.config.name, item_id = %item.id, "sell_item ignored");
    }

    /// Store a new item; the store assigns its id.
    pub fn add_new_item(
        &self,
        title: impl Into<String>,
        place: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) {
        let item = VacationItem::new(title, place, start_date, end_date);
        let dao = Arc::clone(&self.dao);
        let scope = self.config.name.clone();
        self.scope.launch("add_new_item", async move {
            match dao.insert(item).await {
                Ok(id) => tracing::debug!(scope = %scope, item_id = %id, "item inserted"),
                Err(err) => tracing::warn!(scope = %scope, error = %err, "insert failed"),
            }
        });
    }

    /// Remove the stored item with the same id as `item`.
    pub fn delete_item(&self, item: VacationItem) {
        let dao = Arc::clone(&self.dao);
        let scope = self.config.name.clone();
        self.scope.launch("delete_item", async move {
            let id = item.id;
            if let Err(err) = dao.delete(item).await {
                tracing::warn!(scope = %scope, item_id = %id, error = %err, "delete failed");
            }
        });
    }

    /// Live view of the item `id`; `None` while no such item is stored.
    pub fn retrieve_item(&self, id: ItemId) -> LiveData<Option<VacationItem>> {
        LiveData::launch(&self.scope, "retrieve_item", self.dao.item(id))
    }

    /// Returns false if any of the three required fields is blank.
    pub fn is_entry_valid(&self, name: &str, price: &str, count: &str) -> bool {
        is_entry_valid(name, price, count)
    }

    /// Display text for the item's travel window, e.g. `2024-07-01 .. 2024-07-14`.
    ///
    /// `None` when either stored date is not canonical or the configured
    /// display pattern cannot render it.
    pub fn trip_dates(&self, item: &VacationItem) -> Option<String> {
        let start = item.start_day()?;
        let end = item.end_day()?;
        let pattern = DatePattern::compile(&self.config.display_pattern).ok()?;
        let start = pattern.render(&start.and_time(chrono::NaiveTime::MIN)).ok()?;
        let end = pattern.render(&end.and_time(chrono::NaiveTime::MIN)).ok()?;
        Some(format!("{start} .. {end}"))
    }
}

/// Returns false if any of the three fields is empty or whitespace-only.
pub fn is_entry_valid(name: &str, price: &str, count: &str) -> bool {
    [name, price, count].iter().all(|field| !field.trim().is_empty())
}
