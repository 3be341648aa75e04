//! Runtime registry for toolset instances and their capabilities.

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use agent_primitives::ToolsetId;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::binding::{BoundCall, Invocation, Toolset};
use crate::error::{ToolError, ToolResult};
use crate::infer::{InferenceWarning, TypeResolver, infer};
use crate::schema::{CapabilityDescriptor, CapabilitySchema, ParamType};
use crate::validate::Arguments;

/// Handle returned by the registry for dispatching one capability.
#[derive(Clone)]
pub struct ToolHandle {
    descriptor: Arc<CapabilityDescriptor>,
    call: BoundCall,
}

impl ToolHandle {
    pub(crate) fn new(descriptor: Arc<CapabilityDescriptor>, call: BoundCall) -> Self {
        Self { descriptor, call }
    }

    /// Returns the associated descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<CapabilityDescriptor> {
        &self.descriptor
    }

    /// Returns the capability name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub(crate) fn start(&self, arguments: Arguments) -> Invocation {
        (self.call)(arguments)
    }
}

impl fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHandle")
            .field("name", &self.descriptor.name())
            .field("toolset", &self.descriptor.toolset())
            .field("is_async", &self.descriptor.is_async())
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful registration.
#[derive(Clone, Debug)]
pub struct Registration {
    id: ToolsetId,
    toolset: String,
    capabilities: Vec<Arc<CapabilityDescriptor>>,
    warnings: Vec<InferenceWarning>,
}

impl Registration {
    /// Identifier to pass to [`ToolRegistry::unregister`].
    #[must_use]
    pub const fn id(&self) -> ToolsetId {
        self.id
    }

    /// Display name of the registered toolset.
    #[must_use]
    pub fn toolset(&self) -> &str {
        &self.toolset
    }

    /// Descriptors added by the registration, in method order.
    #[must_use]
    pub fn capabilities(&self) -> &[Arc<CapabilityDescriptor>] {
        &self.capabilities
    }

    /// Documentation and typing warnings raised during inference.
    #[must_use]
    pub fn warnings(&self) -> &[InferenceWarning] {
        &self.warnings
    }
}

/// Summary of one registered toolset.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToolsetInfo {
    /// Registration identifier.
    pub id: ToolsetId,
    /// Display name.
    pub name: String,
    /// Capabilities owned by the toolset, in method order.
    pub capabilities: Vec<String>,
}

struct ToolsetRecord {
    name: String,
    capabilities: Vec<String>,
    instance: Arc<dyn Any + Send + Sync>,
}

#[derive(Default)]
struct RegistryInner {
    capabilities: IndexMap<String, ToolHandle>,
    toolsets: IndexMap<ToolsetId, ToolsetRecord>,
}

/// Registry that stores toolset instances and their capabilities keyed by name.
///
/// Capability names are unique across every registered toolset. A name
/// collision rejects the whole registration.
#[derive(Default)]
pub struct ToolRegistry {
    inner: RwLock<RegistryInner>,
    resolver: TypeResolver,
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        let names: Vec<_> = inner.capabilities.keys().cloned().collect();
        f.debug_struct("ToolRegistry")
            .field("registered", &names)
            .field("toolsets", &inner.toolsets.len())
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry that resolves parameter types with `resolver`.
    #[must_use]
    pub fn with_resolver(resolver: TypeResolver) -> Self {
        Self {
            inner: RwLock::default(),
            resolver,
        }
    }

    /// Makes a domain type resolvable during schema inference.
    #[must_use]
    pub fn with_type_alias(mut self, name: impl Into<String>, ty: ParamType) -> Self {
        self.resolver = self.resolver.alias(name, ty);
        self
    }

    /// Registers a toolset, taking ownership of the instance.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::SchemaInference`] if any method cannot be
    /// described, or [`ToolError::DuplicateCapability`] if a capability name
    /// is already taken. Nothing is registered on error.
    pub fn register<T: Toolset>(&self, toolset: T) -> ToolResult<Registration> {
        self.register_arc(Arc::new(toolset))
    }

    /// Registers an already shared toolset instance.
    ///
    /// # Errors
    ///
    /// Same as [`ToolRegistry::register`].
    pub fn register_arc<T: Toolset>(&self, toolset: Arc<T>) -> ToolResult<Registration> {
        let id = ToolsetId::random();
        let name = toolset.toolset_name().to_owned();

        let mut handles = Vec::new();
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();
        for method in T::methods() {
            let (signature, handler) = method.into_parts();
            let inferred = infer(&signature, id, &name, &self.resolver)?;
            if !seen.insert(inferred.descriptor.name().to_owned()) {
                return Err(ToolError::DuplicateCapability {
                    name: inferred.descriptor.name().to_owned(),
                });
            }
            warnings.extend(inferred.warnings);
            handles.push(ToolHandle::new(
                Arc::new(inferred.descriptor),
                handler.bind(&toolset),
            ));
        }

        {
            let mut inner = self.write();
            if let Some(taken) = handles
                .iter()
                .find(|handle| inner.capabilities.contains_key(handle.name()))
            {
                return Err(ToolError::DuplicateCapability {
                    name: taken.name().to_owned(),
                });
            }

            for handle in &handles {
                inner
                    .capabilities
                    .insert(handle.name().to_owned(), handle.clone());
            }
            inner.toolsets.insert(
                id,
                ToolsetRecord {
                    name: name.clone(),
                    capabilities: handles.iter().map(|h| h.name().to_owned()).collect(),
                    instance: toolset,
                },
            );
        }

        for warning in &warnings {
            warn!(toolset = %name, "{warning}");
        }
        info!(
            toolset = %name,
            %id,
            capabilities = handles.len(),
            "registered toolset"
        );

        Ok(Registration {
            id,
            toolset: name,
            capabilities: handles.into_iter().map(|h| h.descriptor).collect(),
            warnings,
        })
    }

    /// Removes a toolset and every capability it owns.
    ///
    /// Returns the removed capability names. In-flight invocations keep their
    /// own reference to the instance and finish normally.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::ToolsetNotFound`] if `id` is not registered.
    pub fn unregister(&self, id: ToolsetId) -> ToolResult<Vec<String>> {
        let record = {
            let mut inner = self.write();
            let record = inner
                .toolsets
                .shift_remove(&id)
                .ok_or(ToolError::ToolsetNotFound { id })?;
            for name in &record.capabilities {
                inner.capabilities.shift_remove(name);
            }
            record
        };

        info!(
            toolset = %record.name,
            %id,
            capabilities = record.capabilities.len(),
            "unregistered toolset"
        );
        Ok(record.capabilities)
    }

    /// Returns the descriptor registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::CapabilityNotFound`] for unknown names.
    pub fn lookup(&self, name: &str) -> ToolResult<Arc<CapabilityDescriptor>> {
        self.handle(name).map(|handle| handle.descriptor)
    }

    /// Returns a handle to the capability matching the supplied name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ToolHandle> {
        self.read().capabilities.get(name).cloned()
    }

    /// Returns a handle to the capability, failing for unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::CapabilityNotFound`] for unknown names.
    pub fn handle(&self, name: &str) -> ToolResult<ToolHandle> {
        self.get(name).ok_or_else(|| ToolError::CapabilityNotFound {
            name: name.to_owned(),
        })
    }

    /// Lists every descriptor in registration order.
    #[must_use]
    pub fn list_capabilities(&self) -> Vec<Arc<CapabilityDescriptor>> {
        self.read()
            .capabilities
            .values()
            .map(|handle| Arc::clone(&handle.descriptor))
            .collect()
    }

    /// Discovery view of every capability.
    #[must_use]
    pub fn describe(&self) -> Vec<CapabilitySchema> {
        self.read()
            .capabilities
            .values()
            .map(|handle| handle.descriptor.schema())
            .collect()
    }

    /// Function-calling JSON Schema objects for every capability.
    #[must_use]
    pub fn json_schemas(&self) -> Vec<Value> {
        self.read()
            .capabilities
            .values()
            .map(|handle| handle.descriptor.json_schema())
            .collect()
    }

    /// Lists registered toolsets in registration order.
    #[must_use]
    pub fn toolsets(&self) -> Vec<ToolsetInfo> {
        self.read()
            .toolsets
            .iter()
            .map(|(id, record)| ToolsetInfo {
                id: *id,
                name: record.name.clone(),
                capabilities: record.capabilities.clone(),
            })
            .collect()
    }

    /// Returns the registered instance behind `id` if it has type `T`.
    #[must_use]
    pub fn toolset<T: Toolset>(&self, id: ToolsetId) -> Option<Arc<T>> {
        let instance = Arc::clone(&self.read().toolsets.get(&id)?.instance);
        instance.downcast::<T>().ok()
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().capabilities.len()
    }

    /// Returns `true` when no capability is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().capabilities.is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
