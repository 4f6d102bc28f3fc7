//! UI commands over the inventory view-model.
//!
//! Every command takes the shared [`AppState`] and returns a serializable
//! result, so a shell can hand the outcome straight to its frontend. Write
//! commands wait until the live item list reflects the change.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use vacation_core::{DomainError, ItemId};
use vacation_inventory::{InventoryViewModel, VacationItem};

/// How long a write command waits for the store to confirm the change.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Application state shared across commands.
#[derive(Debug, Clone)]
pub struct AppState {
    view_model: Arc<InventoryViewModel>,
}

impl AppState {
    pub fn new(view_model: InventoryViewModel) -> Self {
        Self {
            view_model: Arc::new(view_model),
        }
    }

    pub fn view_model(&self) -> &InventoryViewModel {
        &self.view_model
    }
}

/// Raw fields as entered in the item form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemForm {
    pub title: String,
    pub place: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl ItemForm {
    pub fn new(
        title: impl Into<String>,
        place: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            place: place.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    fn check(&self, view_model: &InventoryViewModel) -> Result<(), CommandError> {
        if view_model.is_entry_valid(&self.title, &self.place, &self.start_date) {
            Ok(())
        } else {
            Err(CommandError::Validation(
                "title, place and start date are required".to_string(),
            ))
        }
    }

    fn matches(&self, item: &VacationItem) -> bool {
        item.title == self.title
            && item.place == self.place
            && item.start_date == self.start_date
            && item.end_date == self.end_date
    }
}

/// An item as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub title: String,
    pub place: String,
    pub start_date: String,
    pub end_date: String,
    /// Start and end rendered with the configured display pattern.
    pub trip_dates: Option<String>,
    pub stock_available: bool,
}

impl ItemView {
    fn render(view_model: &InventoryViewModel, item: VacationItem) -> Self {
        Self {
            trip_dates: view_model.trip_dates(&item),
            stock_available: view_model.is_stock_available(&item),
            id: item.id,
            title: item.title,
            place: item.place,
            start_date: item.start_date,
            end_date: item.end_date,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid item id: {0}")]
    InvalidId(String),

    #[error("item {0} not found")]
    NotFound(ItemId),

    /// A lookup failed without naming an item.
    #[error("not found")]
    Missing,

    #[error("inventory unavailable: {0}")]
    Unavailable(String),
}

impl From<DomainError> for CommandError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(msg),
            DomainError::InvalidId(msg) => Self::InvalidId(msg),
            DomainError::NotFound => Self::Missing,
        }
    }
}

// Frontends get the message, not the variant.
impl Serialize for CommandError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// List every stored item, ordered by id.
pub async fn list_items(state: &AppState) -> Result<Vec<ItemView>, CommandError> {
    let view_model = state.view_model();
    let items = current_items(view_model).await?;
    Ok(items
        .into_iter()
        .map(|item| ItemView::render(view_model, item))
        .collect())
}

/// Store a new item built from `form`.
pub async fn add_item(state: &AppState, form: ItemForm) -> Result<(), CommandError> {
    let view_model = state.view_model();
    form.check(view_model)?;

    let known: BTreeSet<ItemId> = current_items(view_model)
        .await?
        .iter()
        .map(|item| item.id)
        .collect();

    view_model.add_new_item(
        form.title.clone(),
        form.place.clone(),
        form.start_date.clone(),
        form.end_date.clone(),
    );
    settle(view_model, |items| {
        items
            .iter()
            .any(|item| !known.contains(&item.id) && form.matches(item))
    })
    .await?;

    tracing::info!(title = %form.title, "item added");
    Ok(())
}

/// Replace every field of the item `id` with the values in `form`.
pub async fn edit_item(state: &AppState, id: String, form: ItemForm) -> Result<(), CommandError> {
    let view_model = state.view_model();
    let id: ItemId = id.parse()?;
    form.check(view_model)?;
    find(view_model, id).await?;

    view_model.update_item(
        id,
        form.title.clone(),
        form.place.clone(),
        form.start_date.clone(),
        form.end_date.clone(),
    );
    // A concurrent delete also ends the wait.
    settle(view_model, |items| {
        items
            .iter()
            .find(|item| item.id == id)
            .is_none_or(|item| form.matches(item))
    })
    .await?;

    tracing::info!(item_id = %id, "item edited");
    Ok(())
}

/// Remove the item `id`.
pub async fn delete_item(state: &AppState, id: String) -> Result<(), CommandError> {
    let view_model = state.view_model();
    let id: ItemId = id.parse()?;
    let item = find(view_model, id).await?;

    view_model.delete_item(item);
    settle(view_model, |items| items.iter().all(|item| item.id != id)).await?;

    tracing::info!(item_id = %id, "item deleted");
    Ok(())
}

/// Current state of the item `id`.
pub async fn item_details(state: &AppState, id: String) -> Result<ItemView, CommandError> {
    let view_model = state.view_model();
    let id: ItemId = id.parse()?;

    let live = view_model.retrieve_item(id);
    match live.wait_for(|_| true).await {
        Some(Some(item)) => Ok(ItemView::render(view_model, item)),
        Some(None) => Err(CommandError::NotFound(id)),
        None => Err(unavailable()),
    }
}

async fn current_items(view_model: &InventoryViewModel) -> Result<Vec<VacationItem>, CommandError> {
    view_model
        .all_items()
        .wait_for(|_| true)
        .await
        .ok_or_else(unavailable)
}

async fn find(view_model: &InventoryViewModel, id: ItemId) -> Result<VacationItem, CommandError> {
    current_items(view_model)
        .await?
        .into_iter()
        .find(|item| item.id == id)
        .ok_or(CommandError::NotFound(id))
}

/// Wait for the launched write, then for the item list to satisfy `done`.
///
/// The view-model never reports store failures, so a write that does not
/// show up in time is reported as unavailable.
async fn settle(
    view_model: &InventoryViewModel,
    done: impl FnMut(&Vec<VacationItem>) -> bool,
) -> Result<(), CommandError> {
    let confirmed = tokio::time::timeout(SETTLE_TIMEOUT, async {
        view_model.scope().idle().await;
        view_model.all_items().wait_for(done).await
    })
    .await;

    match confirmed {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(unavailable()),
        Err(_) => {
            tracing::warn!(scope = %view_model.config().name, "write not confirmed by the store");
            Err(CommandError::Unavailable(
                "the store did not confirm the change".to_string(),
            ))
        }
    }
}

fn unavailable() -> CommandError {
    CommandError::Unavailable("the item store has stopped".to_string())
}
