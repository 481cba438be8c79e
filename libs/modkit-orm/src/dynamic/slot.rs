use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::DynamicContent;

/// Placeholder for a polymorphic JSON value.
///
/// Application code stores a concrete payload with [`Dynamic::new`]; decoding
/// produces a raw fragment that [`super::resolve`] later turns into the
/// payload chosen by the enclosing [`super::DynamicFielder`].
#[derive(Default)]
pub struct Dynamic(State);

#[derive(Default)]
enum State {
    #[default]
    Empty,
    Raw(serde_json::Value),
    Resolved(Box<dyn DynamicContent>),
}

impl Dynamic {
    #[must_use]
    pub fn new<T: DynamicContent>(content: T) -> Self {
        Self(State::Resolved(Box::new(content)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.0, State::Empty)
    }

    /// The uninterpreted fragment of a slot no fielder has claimed.
    #[must_use]
    pub fn raw(&self) -> Option<&serde_json::Value> {
        match &self.0 {
            State::Raw(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn content(&self) -> Option<&dyn DynamicContent> {
        match &self.0 {
            State::Resolved(content) => Some(&**content),
            _ => None,
        }
    }

    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.content()?.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        match &mut self.0 {
            State::Resolved(content) => content.as_any_mut().downcast_mut(),
            _ => None,
        }
    }

    /// Take the payload out of the slot if it has type `T`.
    pub fn take<T: 'static>(&mut self) -> Option<T> {
        if self.downcast_ref::<T>().is_none() {
            return None;
        }
        match std::mem::take(&mut self.0) {
            State::Resolved(content) => content.into_any().downcast::<T>().ok().map(|boxed| *boxed),
            _ => None,
        }
    }

    pub fn set_content(&mut self, content: Box<dyn DynamicContent>) {
        self.0 = State::Resolved(content);
    }

    pub fn clear(&mut self) {
        self.0 = State::Empty;
    }

    pub(crate) fn set_raw(&mut self, value: serde_json::Value) {
        self.0 = if value.is_null() {
            State::Empty
        } else {
            State::Raw(value)
        };
    }

    pub(crate) fn take_raw(&mut self) -> Option<serde_json::Value> {
        match std::mem::take(&mut self.0) {
            State::Raw(value) => Some(value),
            other => {
                self.0 = other;
                None
            }
        }
    }
}

impl Clone for Dynamic {
    fn clone(&self) -> Self {
        Self(match &self.0 {
            State::Empty => State::Empty,
            State::Raw(value) => State::Raw(value.clone()),
            State::Resolved(content) => State::Resolved(content.clone_box()),
        })
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            State::Empty => f.write_str("Dynamic::Empty"),
            State::Raw(value) => f.debug_tuple("Dynamic::Raw").field(value).finish(),
            State::Resolved(content) => f.debug_tuple("Dynamic").field(content).finish(),
        }
    }
}

impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (State::Empty, State::Empty) => true,
            (State::Raw(a), State::Raw(b)) => a == b,
            (State::Resolved(a), State::Resolved(b)) => {
                a.as_any().type_id() == b.as_any().type_id()
                    && matches!((a.encode_value(), b.encode_value()), (Ok(x), Ok(y)) if x == y)
            }
            _ => false,
        }
    }
}

impl Serialize for Dynamic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.0 {
            State::Empty => serializer.serialize_unit(),
            State::Raw(value) => value.serialize(serializer),
            State::Resolved(content) => content
                .encode_value()
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Dynamic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let mut slot = Self::default();
        slot.set_raw(value);
        Ok(slot)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Payload {
        value: i32,
    }

    impl crate::dynamic::Resolve for Payload {}

    #[test]
    fn empty_slot_serializes_as_null() {
        assert_eq!(serde_json::to_string(&Dynamic::default()).unwrap(), "null");
    }

    #[test]
    fn resolved_slot_serializes_its_payload() {
        let slot = Dynamic::new(Payload { value: 10 });
        assert_eq!(serde_json::to_value(&slot).unwrap(), json!({ "value": 10 }));
    }

    #[test]
    fn null_decodes_to_empty_and_objects_to_raw() {
        let slot: Dynamic = serde_json::from_str("null").unwrap();
        assert!(slot.is_empty());

        let slot: Dynamic = serde_json::from_str(r#"{"value":3}"#).unwrap();
        assert_eq!(slot.raw(), Some(&json!({ "value": 3 })));
        assert!(slot.downcast_ref::<Payload>().is_none());
    }

    #[test]
    fn downcast_and_take() {
        let mut slot = Dynamic::new(Payload { value: 1 });
        slot.downcast_mut::<Payload>().unwrap().value = 2;
        assert!(slot.take::<String>().is_none());
        assert_eq!(slot.take::<Payload>(), Some(Payload { value: 2 }));
        assert!(slot.is_empty());
    }

    #[test]
    fn equality_compares_type_and_value() {
        let a = Dynamic::new(Payload { value: 1 });
        assert_eq!(a, a.clone());
        assert_ne!(a, Dynamic::new(Payload { value: 2 }));
        assert_ne!(a, Dynamic::new(json!({ "value": 1 })));
        assert_ne!(a, Dynamic::default());
    }

    #[test]
    fn take_raw_leaves_resolved_content_in_place() {
        let mut slot = Dynamic::new(Payload { value: 1 });
        assert!(slot.take_raw().is_none());
        assert_eq!(slot.downcast_ref::<Payload>(), Some(&Payload { value: 1 }));
    }
}
