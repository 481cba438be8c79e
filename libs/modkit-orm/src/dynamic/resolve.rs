use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use super::{Dynamic, DynamicContent, DynamicFielder};
use crate::error::CodecError;

/// One step from a value to a nested location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(&'static str),
    Index(usize),
    Key(String),
}

pub type FieldPath = Vec<PathSegment>;

/// A parked dynamic fragment found by the collection walk.
#[derive(Debug)]
pub struct DynamicEnvelope {
    /// Location of the slot, relative to the resolved root.
    pub path: FieldPath,
    /// Name of the nearest enclosing struct field.
    pub field: Option<&'static str>,
    /// Destination supplied by the enclosing fielder.
    pub target: Option<Box<dyn DynamicContent>>,
    /// Whether any fielder encloses the slot.
    pub scoped: bool,
}

/// Walkable value graph for dynamic slot resolution.
///
/// Leaf types keep the default (empty) implementation. Containers forward to
/// their elements, records are derived with `#[derive(Resolve)]`.
pub trait Resolve {
    /// Record every unresolved slot below `self`, asking `scope` (the nearest
    /// enclosing fielder) for its destination.
    fn collect_dynamic(
        &self,
        _scope: Option<&dyn DynamicFielder>,
        _path: &mut FieldPath,
        _out: &mut Vec<DynamicEnvelope>,
    ) {
    }

    /// Mutable access to the slot at `path`.
    fn slot_at(&mut self, _path: &[PathSegment]) -> Option<&mut Dynamic> {
        None
    }
}

/// Resolve every parked fragment below `root`.
///
/// Unknown discriminators and empty fragments leave the slot empty. A slot
/// with no enclosing fielder keeps its raw fragment.
///
/// # Errors
/// Returns `CodecError::Decode` if a fragment does not match the destination
/// chosen for it.
pub fn resolve<T: Resolve + ?Sized>(root: &mut T) -> Result<(), CodecError> {
    let mut envelopes = Vec::new();
    root.collect_dynamic(None, &mut FieldPath::new(), &mut envelopes);

    for envelope in envelopes {
        let Some(slot) = root.slot_at(&envelope.path) else {
            continue;
        };
        let Some(raw) = slot.take_raw() else {
            continue;
        };
        match envelope.target {
            Some(mut target) if !raw.is_null() => {
                target.decode_value(raw)?;
                slot.set_content(target);
            }
            _ if !envelope.scoped => slot.set_raw(raw),
            _ => slot.clear(),
        }
    }
    Ok(())
}

fn nearest_field(path: &[PathSegment]) -> Option<&'static str> {
    path.iter().rev().find_map(|segment| match segment {
        PathSegment::Field(name) => Some(*name),
        PathSegment::Index(_) | PathSegment::Key(_) => None,
    })
}

impl Resolve for Dynamic {
    fn collect_dynamic(
        &self,
        scope: Option<&dyn DynamicFielder>,
        path: &mut FieldPath,
        out: &mut Vec<DynamicEnvelope>,
    ) {
        if self.raw().is_none() {
            return;
        }
        let field = nearest_field(path);
        let target = scope
            .zip(field)
            .and_then(|(fielder, name)| fielder.new_dynamic_field(name));
        out.push(DynamicEnvelope {
            path: path.clone(),
            field,
            target,
            scoped: scope.is_some(),
        });
    }

    fn slot_at(&mut self, path: &[PathSegment]) -> Option<&mut Dynamic> {
        path.is_empty().then_some(self)
    }
}

macro_rules! impl_leaf {
    ($($ty:ty),* $(,)?) => {
        $(impl Resolve for $ty {})*
    };
}

impl_leaf!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    serde_json::Value,
    uuid::Uuid,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
);

impl<Tz: chrono::TimeZone> Resolve for chrono::DateTime<Tz> {}

impl<T: Resolve> Resolve for Option<T> {
    fn collect_dynamic(
        &self,
        scope: Option<&dyn DynamicFielder>,
        path: &mut FieldPath,
        out: &mut Vec<DynamicEnvelope>,
    ) {
        if let Some(inner) = self {
            inner.collect_dynamic(scope, path, out);
        }
    }

    fn slot_at(&mut self, path: &[PathSegment]) -> Option<&mut Dynamic> {
        self.as_mut()?.slot_at(path)
    }
}

impl<T: Resolve> Resolve for Box<T> {
    fn collect_dynamic(
        &self,
        scope: Option<&dyn DynamicFielder>,
        path: &mut FieldPath,
        out: &mut Vec<DynamicEnvelope>,
    ) {
        (**self).collect_dynamic(scope, path, out);
    }

    fn slot_at(&mut self, path: &[PathSegment]) -> Option<&mut Dynamic> {
        (**self).slot_at(path)
    }
}

impl<T: Resolve> Resolve for Vec<T> {
    fn collect_dynamic(
        &self,
        scope: Option<&dyn DynamicFielder>,
        path: &mut FieldPath,
        out: &mut Vec<DynamicEnvelope>,
    ) {
        for (idx, item) in self.iter().enumerate() {
            path.push(PathSegment::Index(idx));
            item.collect_dynamic(scope, path, out);
            path.pop();
        }
    }

    fn slot_at(&mut self, path: &[PathSegment]) -> Option<&mut Dynamic> {
        match path.split_first()? {
            (PathSegment::Index(idx), rest) => self.get_mut(*idx)?.slot_at(rest),
            _ => None,
        }
    }
}

impl<T: Resolve, S: BuildHasher> Resolve for HashMap<String, T, S> {
    fn collect_dynamic(
        &self,
        scope: Option<&dyn DynamicFielder>,
        path: &mut FieldPath,
        out: &mut Vec<DynamicEnvelope>,
    ) {
        for (key, item) in self {
            path.push(PathSegment::Key(key.clone()));
            item.collect_dynamic(scope, path, out);
            path.pop();
        }
    }

    fn slot_at(&mut self, path: &[PathSegment]) -> Option<&mut Dynamic> {
        match path.split_first()? {
            (PathSegment::Key(key), rest) => self.get_mut(key)?.slot_at(rest),
            _ => None,
        }
    }
}

impl<T: Resolve> Resolve for BTreeMap<String, T> {
    fn collect_dynamic(
        &self,
        scope: Option<&dyn DynamicFielder>,
        path: &mut FieldPath,
        out: &mut Vec<DynamicEnvelope>,
    ) {
        for (key, item) in self {
            path.push(PathSegment::Key(key.clone()));
            item.collect_dynamic(scope, path, out);
            path.pop();
        }
    }

    fn slot_at(&mut self, path: &[PathSegment]) -> Option<&mut Dynamic> {
        match path.split_first()? {
            (PathSegment::Key(key), rest) => self.get_mut(key)?.slot_at(rest),
            _ => None,
        }
    }
}
