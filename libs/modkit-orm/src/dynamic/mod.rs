//! Polymorphic JSON values.
//!
//! A [`Dynamic`] slot holds a JSON sub-document whose concrete Rust type is
//! only known once the surrounding record has been decoded: a sibling field
//! (the discriminator) tells the enclosing [`DynamicFielder`] which type to
//! allocate. Decoding therefore runs in two phases. Serde first fills every
//! ordinary field and parks each slot's fragment as [`Dynamic::raw`]; then
//! [`resolve`] walks the value graph, asks the nearest fielder for a concrete
//! destination and decodes the parked fragment into it.
//!
//! ```ignore
//! #[derive(Serialize, Deserialize, Resolve)]
//! #[resolve(fielder)]
//! struct Envelope {
//!     kind: String,
//!     #[serde(default)]
//!     body: Dynamic,
//! }
//!
//! impl DynamicFielder for Envelope {
//!     fn new_dynamic_field(&self, _field: &str) -> Option<Box<dyn DynamicContent>> {
//!         match self.kind.as_str() {
//!             "text" => Some(Box::new(Text::default())),
//!             _ => None,
//!         }
//!     }
//! }
//! ```

mod resolve;
mod slot;

use std::any::{Any, TypeId};
use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::CodecError;

pub use resolve::{DynamicEnvelope, FieldPath, PathSegment, Resolve, resolve};
pub use slot::Dynamic;

/// Capability of a record to supply concrete types for its dynamic fields.
pub trait DynamicFielder {
    /// Return a fresh, empty destination for `field`, or `None` when the
    /// current discriminator value is not recognized.
    fn new_dynamic_field(&self, field: &str) -> Option<Box<dyn DynamicContent>>;
}

/// Object-safe view of a concrete dynamic payload.
pub trait DynamicContent: Debug + Send + Sync + 'static {
    /// Replace `self` with the decoded `value`, resolving nested slots.
    ///
    /// # Errors
    /// Returns `CodecError::Decode` if `value` does not match the payload type.
    fn decode_value(&mut self, value: serde_json::Value) -> Result<(), CodecError>;

    /// # Errors
    /// Returns the serializer error of the payload type.
    fn encode_value(&self) -> Result<serde_json::Value, serde_json::Error>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn clone_box(&self) -> Box<dyn DynamicContent>;
}

impl<T> DynamicContent for T
where
    T: Serialize + DeserializeOwned + Resolve + Clone + Debug + Send + Sync + 'static,
{
    fn decode_value(&mut self, value: serde_json::Value) -> Result<(), CodecError> {
        *self = crate::codec::decode_value(value)?;
        Ok(())
    }

    fn encode_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn clone_box(&self) -> Box<dyn DynamicContent> {
        Box::new(self.clone())
    }
}

/// Whether `T` is the polymorphic placeholder type a dynamic column must use.
#[must_use]
pub fn is_placeholder<T: ?Sized + 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<Dynamic>()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn only_dynamic_is_a_placeholder() {
        assert!(is_placeholder::<Dynamic>());
        assert!(!is_placeholder::<serde_json::Value>());
        assert!(!is_placeholder::<Option<Dynamic>>());
        assert!(!is_placeholder::<Box<Dynamic>>());
    }
}
