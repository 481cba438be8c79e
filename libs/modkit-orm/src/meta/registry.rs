use std::any::type_name;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;

use super::{Model, ModelDescriptor};

/// Cache of model descriptors keyed by fully-qualified type name.
///
/// Descriptors are derived on first use and never change afterwards. Two
/// threads registering the same type may both derive it; the first insert is
/// kept and returned to both.
#[derive(Default)]
pub struct ModelRegistry {
    models: RwLock<HashMap<&'static str, Arc<ModelDescriptor>>>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descriptor of `T`, registering it on first use.
    ///
    /// # Panics
    /// Panics if the model definition of `T` is invalid, see
    /// [`ModelDescriptor::build`].
    #[must_use]
    pub fn get_or_create<T: Model>(&self) -> Arc<ModelDescriptor> {
        let key = type_name::<T>();
        let cached = self.models.read().get(key).cloned();
        if let Some(descriptor) = cached {
            return descriptor;
        }

        let descriptor = Arc::new(ModelDescriptor::build::<T>());
        tracing::trace!(
            model = key,
            table = descriptor.table(),
            fields = descriptor.fields().len(),
            "registered model"
        );
        Arc::clone(self.models.write().entry(key).or_insert(descriptor))
    }

    #[must_use]
    pub fn get(&self, full_name: &str) -> Option<Arc<ModelDescriptor>> {
        self.models.read().get(full_name).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }

    /// Drop every cached descriptor. Meant for test isolation.
    pub fn reset(&self) {
        self.models.write().clear();
    }
}

static REGISTRY: LazyLock<ModelRegistry> = LazyLock::new(ModelRegistry::new);

/// The process-wide registry.
#[must_use]
pub fn registry() -> &'static ModelRegistry {
    &REGISTRY
}

/// Descriptor of `T` from the process-wide registry.
///
/// # Panics
/// Panics if the model definition of `T` is invalid.
#[must_use]
pub fn descriptor_of<T: Model>() -> Arc<ModelDescriptor> {
    REGISTRY.get_or_create::<T>()
}

/// Clear the process-wide registry.
pub fn reset_model_cache() {
    REGISTRY.reset();
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Default, modkit_orm_macros::Model)]
    #[orm(table = "gauge")]
    struct Gauge {
        #[orm(pk)]
        id: i64,
        label: String,
    }

    #[test]
    fn registers_a_type_once() {
        let registry = ModelRegistry::new();
        assert!(registry.is_empty());

        let first = registry.get_or_create::<Gauge>();
        let second = registry.get_or_create::<Gauge>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(first.table(), "gauge");
        assert_eq!(first.columns(), vec!["id", "label"]);
        assert!(registry.get(type_name::<Gauge>()).is_some());

        registry.reset();
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_registration_yields_one_descriptor() {
        let registry = ModelRegistry::new();
        let descriptors: Vec<Arc<ModelDescriptor>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| registry.get_or_create::<Gauge>()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(registry.len(), 1);
        let cached = registry.get(type_name::<Gauge>()).unwrap();
        for descriptor in &descriptors {
            assert!(Arc::ptr_eq(descriptor, &cached));
        }
    }
}
