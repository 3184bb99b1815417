//! # Type Registry
//!
//! Lets independently developed modules register concrete payload types
//! against a shared interface (a trait object such as `dyn Evidence`), so
//! heterogeneous payloads can be encoded and decoded without compile-time
//! knowledge of every implementation.
//!
//! ## Lifecycle
//!
//! ```text
//! TypeRegistryBuilder ──register_interface / register_concrete──→ build()
//!                                                                    │
//!                                                          TypeRegistry (immutable)
//!                                                          encode / decode only
//! ```
//!
//! Registration happens on the builder at start-up. Only the built registry
//! can encode or decode, so no payload is ever processed against a partially
//! populated registry. The built registry is `Send + Sync` and is shared by
//! reference (usually through an `Arc`).
//!
//! ## Encoded Form
//!
//! ```json
//! {"type": "<registered name>", "value": <concrete payload>}
//! ```

pub mod errors;

pub use errors::RegistryError;

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::debug;

/// Access to the concrete value behind a trait object.
pub trait AsAny: Any {
    /// The value as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Conversion of a concrete type into the interface `C` it implements.
pub trait Upcast<C: ?Sized> {
    /// Box `self` as the interface.
    fn upcast(self: Box<Self>) -> Box<C>;
}

type DecodeFn<C> = Box<dyn Fn(&RawValue) -> Result<Box<C>, serde_json::Error> + Send + Sync>;
type EncodeFn = Box<dyn Fn(&dyn Any) -> Option<Result<Box<RawValue>, serde_json::Error>> + Send + Sync>;

struct ConcreteCodec<C: ?Sized> {
    decode: DecodeFn<C>,
    encode: EncodeFn,
}

struct InterfaceTable<C: ?Sized> {
    by_name: HashMap<String, ConcreteCodec<C>>,
    by_type: HashMap<TypeId, String>,
}

impl<C: ?Sized> Default for InterfaceTable<C> {
    fn default() -> Self {
        Self {
            by_name: HashMap::new(),
            by_type: HashMap::new(),
        }
    }
}

struct InterfaceEntry {
    name: String,
    table: Box<dyn Any + Send + Sync>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    type_name: String,
    value: Box<RawValue>,
}

/// Collects interface and concrete type registrations before start-up
/// completes.
#[derive(Default)]
pub struct TypeRegistryBuilder {
    interfaces: HashMap<TypeId, InterfaceEntry>,
}

impl TypeRegistryBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an interface. Registering the same interface again is a no-op.
    pub fn register_interface<C: ?Sized + 'static>(&mut self, name: &str) -> &mut Self {
        self.interfaces
            .entry(TypeId::of::<C>())
            .or_insert_with(|| InterfaceEntry {
                name: name.to_string(),
                table: Box::new(InterfaceTable::<C>::default()),
            });
        self
    }

    /// Register concrete type `T` under `name` for interface `C`.
    pub fn register_concrete<C, T>(&mut self, name: &str) -> Result<&mut Self, RegistryError>
    where
        C: ?Sized + 'static,
        T: Upcast<C> + Serialize + DeserializeOwned + Any + Send + Sync,
    {
        let entry = self
            .interfaces
            .get_mut(&TypeId::of::<C>())
            .ok_or_else(|| RegistryError::UnknownCapability {
                capability: type_name::<C>().to_string(),
            })?;
        let capability = entry.name.clone();
        let table = entry
            .table
            .downcast_mut::<InterfaceTable<C>>()
            .ok_or_else(|| RegistryError::UnknownCapability {
                capability: type_name::<C>().to_string(),
            })?;

        if table.by_name.contains_key(name) || table.by_type.contains_key(&TypeId::of::<T>()) {
            return Err(RegistryError::DuplicateName {
                capability,
                name: name.to_string(),
            });
        }

        let codec = ConcreteCodec::<C> {
            decode: Box::new(|raw: &RawValue| {
                let value: T = serde_json::from_str(raw.get())?;
                Ok(Box::new(value).upcast())
            }),
            encode: Box::new(|any: &dyn Any| {
                any.downcast_ref::<T>()
                    .map(serde_json::value::to_raw_value)
            }),
        };
        table.by_name.insert(name.to_string(), codec);
        table.by_type.insert(TypeId::of::<T>(), name.to_string());

        debug!(
            "[Registry] Registered {} as '{}' for {}",
            type_name::<T>(),
            name,
            capability
        );
        Ok(self)
    }

    /// Seal the registrations.
    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            interfaces: self.interfaces,
        }
    }
}

/// Immutable registry of interface → concrete payload types.
pub struct TypeRegistry {
    interfaces: HashMap<TypeId, InterfaceEntry>,
}

impl TypeRegistry {
    /// Start a new set of registrations.
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    fn table<C: ?Sized + 'static>(&self) -> Result<(&str, &InterfaceTable<C>), RegistryError> {
        let unknown = || RegistryError::UnknownCapability {
            capability: type_name::<C>().to_string(),
        };
        let entry = self.interfaces.get(&TypeId::of::<C>()).ok_or_else(unknown)?;
        let table = entry
            .table
            .downcast_ref::<InterfaceTable<C>>()
            .ok_or_else(unknown)?;
        Ok((entry.name.as_str(), table))
    }

    /// Whether `name` is registered for interface `C`.
    pub fn is_registered<C: ?Sized + 'static>(&self, name: &str) -> bool {
        self.table::<C>()
            .map(|(_, table)| table.by_name.contains_key(name))
            .unwrap_or(false)
    }

    /// Registered names for interface `C`, sorted.
    pub fn concrete_names<C: ?Sized + 'static>(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .table::<C>()
            .map(|(_, table)| table.by_name.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Encode `item` as a `{"type", "value"}` envelope.
    pub fn encode<C: ?Sized + AsAny>(&self, item: &C) -> Result<Box<RawValue>, RegistryError> {
        let (capability, table) = self.table::<C>()?;
        let any = item.as_any();
        let unregistered = || RegistryError::UnregisteredConcrete {
            capability: capability.to_string(),
            type_name: format!("{:?}", any.type_id()),
        };
        let name = table.by_type.get(&any.type_id()).ok_or_else(unregistered)?;
        let codec = table.by_name.get(name).ok_or_else(unregistered)?;

        let malformed = |e: serde_json::Error| RegistryError::MalformedEnvelope {
            capability: capability.to_string(),
            reason: e.to_string(),
        };
        let value = (codec.encode)(any).ok_or_else(unregistered)?.map_err(malformed)?;
        let envelope = Envelope {
            type_name: name.clone(),
            value,
        };
        serde_json::value::to_raw_value(&envelope).map_err(malformed)
    }

    /// Decode an envelope into the interface `C`.
    pub fn decode<C: ?Sized + 'static>(&self, raw: &RawValue) -> Result<Box<C>, RegistryError> {
        let (capability, table) = self.table::<C>()?;
        let malformed = |e: serde_json::Error| RegistryError::MalformedEnvelope {
            capability: capability.to_string(),
            reason: e.to_string(),
        };
        let envelope: Envelope = serde_json::from_str(raw.get()).map_err(malformed)?;
        let codec = table
            .by_name
            .get(&envelope.type_name)
            .ok_or_else(|| RegistryError::UnregisteredType {
                capability: capability.to_string(),
                name: envelope.type_name.clone(),
            })?;
        (codec.decode)(&envelope.value).map_err(malformed)
    }
}
