//! Headless entry point: seed the store, then print the inventory as JSON.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use vacation_desktop::{AppState, ItemForm, add_item, list_items};
use vacation_inventory::{
    InMemoryItemDao, InventoryViewModel, InventoryViewModelFactory, ViewModelConfig,
};

/// Path of a JSON array of item forms to load at startup.
const SEED_FILE_ENV: &str = "VACATION_SEED_FILE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vacation_observability::init();

    let config = ViewModelConfig::from_env();
    tracing::info!(name = %config.name, display_pattern = %config.display_pattern, "starting");

    let factory =
        InventoryViewModelFactory::new(Arc::new(InMemoryItemDao::new())).with_config(config);
    let state = AppState::new(factory.create::<InventoryViewModel>()?);

    if let Ok(path) = std::env::var(SEED_FILE_ENV) {
        for form in read_seed(Path::new(&path))? {
            if let Err(err) = add_item(&state, form).await {
                tracing::warn!(error = %err, "skipping seed item");
            }
        }
    }

    let items = list_items(&state).await?;
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}

fn read_seed(path: &Path) -> anyhow::Result<Vec<ItemForm>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing seed file {}", path.display()))
}
