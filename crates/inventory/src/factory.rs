//! View-model construction by requested type.

use std::any::{Any, TypeId, type_name};
use std::sync::Arc;

use crate::config::ViewModelConfig;
use crate::dao::ItemDao;
use crate::error::ViewModelError;
use crate::view_model::InventoryViewModel;

/// Marker for types a UI shell can ask a factory for.
pub trait ViewModel: Any + Send + Sync {}

impl ViewModel for InventoryViewModel {}

/// Builds view-models that share one item store.
#[derive(Clone)]
pub struct InventoryViewModelFactory {
    dao: Arc<dyn ItemDao>,
    config: ViewModelConfig,
}

impl InventoryViewModelFactory {
    pub fn new(dao: Arc<dyn ItemDao>) -> Self {
        Self {
            dao,
            config: ViewModelConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ViewModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the view-model of type `T`.
    ///
    /// Fails with [`ViewModelError::UnknownViewModel`] for any type this
    /// factory does not know how to build.
    pub fn create<T: ViewModel>(&self) -> Result<T, ViewModelError> {
        if TypeId::of::<T>() != TypeId::of::<InventoryViewModel>() {
            return Err(ViewModelError::UnknownViewModel(type_name::<T>()));
        }

        let built: Box<dyn Any> =
            Box::new(InventoryViewModel::new(Arc::clone(&self.dao), self.config.clone())?);
        built
            .downcast::<T>()
            .map(|vm| *vm)
            .map_err(|_| ViewModelError::UnknownViewModel(type_name::<T>()))
    }
}

impl core::fmt::Debug for InventoryViewModelFactory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InventoryViewModelFactory")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryItemDao;

    #[derive(Debug)]
    struct SettingsViewModel;

    impl ViewModel for SettingsViewModel {}

    fn factory() -> InventoryViewModelFactory {
        InventoryViewModelFactory::new(Arc::new(InMemoryItemDao::new()))
    }

    #[tokio::test]
    async fn creates_inventory_view_models() {
        let config = ViewModelConfig::default().with_name("trips");
        let vm = factory()
            .with_config(config.clone())
            .create::<InventoryViewModel>()
            .unwrap();

        assert_eq!(vm.config(), &config);
        assert_eq!(vm.scope().name(), "trips");
    }

    #[tokio::test]
    async fn rejects_unknown_view_models() {
        let err = factory().create::<SettingsViewModel>().unwrap_err();
        match err {
            ViewModelError::UnknownViewModel(name) => assert!(name.ends_with("SettingsViewModel")),
            other => panic!("Expected UnknownViewModel, got {other:?}"),
        }
    }

    #[test]
    fn creation_outside_a_runtime_fails() {
        let err = factory().create::<InventoryViewModel>().unwrap_err();
        assert_eq!(err, ViewModelError::NoRuntime);
    }
}
