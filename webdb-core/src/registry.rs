//! # Type Registry
//!
//! In-process objects refer to their type by a [`Uuid`], while the remote side refers to
//! types by their internal name. The [`TypeRegistry`] maps one to the other.
//!
//! Consumers only depend on the [`TypeLookup`] trait, so any registry that can answer both
//! lookups can be plugged into the protocol layer.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

/// Metadata describing one object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectType {
    pub id: Uuid,
    /// The name the remote side uses for this type (e.g. `com.example.Article`).
    pub internal_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ObjectType {
    pub fn new(id: Uuid, internal_name: impl Into<String>) -> Self {
        Self {
            id,
            internal_name: internal_name.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Returns the display name, falling back to the internal name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.internal_name)
    }
}

/// Lookup of type metadata by identifier or by name.
pub trait TypeLookup {
    fn by_id(&self, id: &Uuid) -> Option<Arc<ObjectType>>;

    fn by_name(&self, name: &str) -> Option<Arc<ObjectType>>;

    /// Resolves a `_type` value, which may hold either a type identifier or a type name.
    fn resolve(&self, value: &Value) -> Option<Arc<ObjectType>> {
        let raw = value.as_str()?.trim();
        match Uuid::parse_str(raw) {
            Ok(id) => self.by_id(&id),
            Err(_) => self.by_name(raw),
        }
    }
}

/// An in-memory registry of object types.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    by_id: HashMap<Uuid, Arc<ObjectType>>,
    by_name: HashMap<String, Arc<ObjectType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type, replacing any type previously registered under the same id or name.
    pub fn register(&mut self, object_type: ObjectType) -> Arc<ObjectType> {
        let object_type = Arc::new(object_type);

        if let Some(previous) = self.by_id.insert(object_type.id, object_type.clone())
            && previous.internal_name != object_type.internal_name
        {
            self.by_name.remove(&previous.internal_name);
        }
        self.by_name
            .insert(object_type.internal_name.clone(), object_type.clone());

        object_type
    }

    /// Registers every type of `other`. Types of `other` win on conflicts.
    pub fn merge(&mut self, other: &TypeRegistry) {
        for object_type in other.types() {
            self.register(ObjectType::clone(object_type));
        }
    }

    pub fn types(&self) -> impl Iterator<Item = &Arc<ObjectType>> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl FromIterator<ObjectType> for TypeRegistry {
    fn from_iter<I: IntoIterator<Item = ObjectType>>(iter: I) -> Self {
        let mut registry = Self::new();
        for object_type in iter {
            registry.register(object_type);
        }
        registry
    }
}

impl TypeLookup for TypeRegistry {
    fn by_id(&self, id: &Uuid) -> Option<Arc<ObjectType>> {
        self.by_id.get(id).cloned()
    }

    fn by_name(&self, name: &str) -> Option<Arc<ObjectType>> {
        self.by_name.get(name).cloned()
    }
}
