//! Vacation inventory feature.
//!
//! This crate holds the `VacationItem` record, the store accessor (`ItemDao`)
//! the feature consumes, and the view-model that sits between a UI and that
//! store.

pub mod config;
pub mod dao;
pub mod error;
pub mod factory;
pub mod in_memory;
pub mod item;
pub mod live;
pub mod scope;
pub mod view_model;

pub use config::ViewModelConfig;
pub use dao::{ItemDao, ItemStream};
pub use error::{DaoError, DaoResult, ViewModelError};
pub use factory::{InventoryViewModelFactory, ViewModel};
pub use in_memory::InMemoryItemDao;
pub use item::VacationItem;
pub use live::LiveData;
pub use scope::ViewModelScope;
pub use view_model::InventoryViewModel;
