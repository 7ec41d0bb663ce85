//! Payload model returned by the backend collaborators.
//!
//! A [`StoreValue`] is a JSON-shaped tree that may additionally carry
//! backend-native scalars (timestamps, store identifiers) which have no JSON
//! representation of their own. Those travel as [`NativeScalar`]s and are
//! turned into text by the [`Serializer`](crate::Serializer).

use std::{
    any::{Any, TypeId},
    fmt,
    sync::Arc,
};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use uuid::Uuid;

use crate::id::ObjectId;

/// Ordered mapping used for documents; iteration follows insertion order.
pub type Document = IndexMap<String, StoreValue>;

type DisplayFallback = fn(&(dyn Any + Send + Sync)) -> Option<String>;

/// A value produced by a document or relational store.
#[derive(Debug, Clone, Default)]
pub enum StoreValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// An integer above `i64::MAX`.
    UInt(u64),
    Float(f64),
    Text(String),
    Array(Vec<StoreValue>),
    Document(Document),
    /// A backend-native scalar such as a timestamp or an [`ObjectId`].
    Native(NativeScalar),
}

impl StoreValue {
    /// Looks up `key` when this value is a document.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&StoreValue> {
        match self {
            Self::Document(doc) => doc.get(key),
            _ => None,
        }
    }

    /// Returns the document fields, if this value is a document.
    #[must_use]
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// Returns the text, if this value is a string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Wraps an arbitrary native value with no display fallback.
    pub fn native<T: Any + Send + Sync>(value: T) -> Self {
        Self::Native(NativeScalar::new(value))
    }
}

/// A backend-native scalar with no intrinsic JSON form.
///
/// The concrete value is type-erased; its [`TypeId`] selects the encoder the
/// serializer applies. Scalars created with [`NativeScalar::with_display`]
/// can still be rendered when no encoder is registered for their type.
#[derive(Clone)]
pub struct NativeScalar {
    value: Arc<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
    fallback: Option<DisplayFallback>,
}

impl NativeScalar {
    /// Wraps `value` without a display fallback.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            fallback: None,
        }
    }

    /// Wraps `value`, using its `Display` output when no encoder is registered.
    pub fn with_display<T: Any + Send + Sync + fmt::Display>(value: T) -> Self {
        Self {
            fallback: Some(display_fallback::<T>),
            ..Self::new(value)
        }
    }

    /// The [`TypeId`] of the wrapped value.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The Rust type name of the wrapped value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrows the wrapped value as `T`, if it is one.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub(crate) fn value(&self) -> &(dyn Any + Send + Sync) {
        &*self.value
    }

    pub(crate) fn fallback_text(&self) -> Option<String> {
        self.fallback.and_then(|render| render(&*self.value))
    }
}

fn display_fallback<T: Any + fmt::Display>(value: &(dyn Any + Send + Sync)) -> Option<String> {
    value.downcast_ref::<T>().map(ToString::to_string)
}

impl fmt::Debug for NativeScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeScalar").field("type_name", &self.type_name).finish_non_exhaustive()
    }
}

impl From<bool> for StoreValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for StoreValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<u64> for StoreValue {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(i) => Self::Int(i),
            Err(_) => Self::UInt(n),
        }
    }
}

impl From<f64> for StoreValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for StoreValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for StoreValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<StoreValue>> for StoreValue {
    fn from(items: Vec<StoreValue>) -> Self {
        Self::Array(items)
    }
}

impl From<Document> for StoreValue {
    fn from(doc: Document) -> Self {
        Self::Document(doc)
    }
}

impl From<ObjectId> for StoreValue {
    fn from(id: ObjectId) -> Self {
        Self::Native(NativeScalar::with_display(id))
    }
}

impl From<Uuid> for StoreValue {
    fn from(id: Uuid) -> Self {
        Self::Native(NativeScalar::with_display(id))
    }
}

impl From<DateTime<Utc>> for StoreValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Native(NativeScalar::new(ts))
    }
}

impl From<DateTime<FixedOffset>> for StoreValue {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Self::Native(NativeScalar::new(ts))
    }
}

impl From<NaiveDateTime> for StoreValue {
    fn from(ts: NaiveDateTime) -> Self {
        Self::Native(NativeScalar::new(ts))
    }
}

impl From<NaiveDate> for StoreValue {
    fn from(date: NaiveDate) -> Self {
        Self::Native(NativeScalar::new(date))
    }
}

impl From<serde_json::Value> for StoreValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Self::UInt(u)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                Self::Document(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}
