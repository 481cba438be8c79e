//! Model metadata: the per-type field table and its process-wide cache.

mod field;
mod model;
mod registry;

pub use field::{FieldDef, FieldDescriptor, FieldFlags};
pub use model::{Model, ModelDef, ModelDescriptor};
pub use registry::{ModelRegistry, descriptor_of, registry, reset_model_cache};

/// Fallback arm of generated field accessors.
///
/// # Panics
/// Always; `field` is not an index of `T`'s field table.
#[doc(hidden)]
pub fn unknown_field<T: ?Sized>(field: usize) -> ! {
    panic!(
        "`{}` has no mapped field at index {field}",
        std::any::type_name::<T>()
    )
}
