//! Operations-context resolution and caching.
//!
//! Maps a logical (organization, space) target to a reusable operations
//! handle. Handles are expensive to set up against the platform, so the
//! cache bounds that cost to one construction per distinct context, and
//! keeps a mutable "current default" target that tools can re-point at
//! runtime without touching already-cached non-default handles.

use dashmap::DashMap;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::api::Result;
use super::ops::OperationsHandle;

/// A tenancy scope on the platform: one organization and one space.
///
/// Equality is exact and case-sensitive on both fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetContext {
    /// Organization name
    pub organization: String,
    /// Space name
    pub space: String,
}

impl TargetContext {
    /// Create a context from owned or borrowed parts
    pub fn new(organization: impl Into<String>, space: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            space: space.into(),
        }
    }
}

impl fmt::Display for TargetContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.organization, self.space)
    }
}

/// Builds an operations handle for a context. Failures propagate to the
/// caller of `resolve`; nothing partial is cached.
pub type HandleFactory = dyn Fn(&TargetContext) -> Result<OperationsHandle> + Send + Sync;

/// Caches operations handles per target context.
///
/// - `resolve(None)` returns the current default handle, constructing it
///   lazily exactly once under concurrent first use.
/// - `resolve(Some(ctx))` returns the default handle when `ctx` equals the
///   current default context, otherwise a handle cached per exact
///   (organization, space) key.
/// - The default target can be re-pointed and cleared at runtime; doing so
///   drops only the cached default handle.
pub struct OperationsCache {
    factory: Box<HandleFactory>,
    /// The statically configured default target
    configured_default: TargetContext,
    /// Runtime override of the default target, if any
    dynamic_target: RwLock<Option<TargetContext>>,
    /// Lazily constructed handle for the current default target
    default_handle: Mutex<Option<OperationsHandle>>,
    /// Handles keyed by explicit context
    handles: DashMap<TargetContext, OperationsHandle>,
}

impl OperationsCache {
    /// Create a cache with the configured default target and a factory.
    pub fn new(
        configured_default: TargetContext,
        factory: impl Fn(&TargetContext) -> Result<OperationsHandle> + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            configured_default,
            dynamic_target: RwLock::new(None),
            default_handle: Mutex::new(None),
            handles: DashMap::new(),
        }
    }

    /// The context `resolve(None)` currently targets: the runtime override
    /// when set, the configured default otherwise.
    pub fn current_default(&self) -> TargetContext {
        self.dynamic_target
            .read()
            .clone()
            .unwrap_or_else(|| self.configured_default.clone())
    }

    /// Resolve a context to an operations handle.
    ///
    /// Absent context means "the current default". A present context equal
    /// to the current default shares the default handle rather than
    /// constructing a duplicate.
    pub fn resolve(&self, context: Option<&TargetContext>) -> Result<OperationsHandle> {
        match context {
            None => self.resolve_default(),
            Some(ctx) if *ctx == self.current_default() => self.resolve_default(),
            Some(ctx) => self.resolve_keyed(ctx),
        }
    }

    fn resolve_default(&self) -> Result<OperationsHandle> {
        // Double-checked under the mutex: concurrent first callers observe
        // exactly one construction and all receive the same handle.
        let mut slot = self.default_handle.lock();
        if let Some(handle) = slot.as_ref() {
            return Ok(Arc::clone(handle));
        }
        let context = self.current_default();
        debug!("constructing default operations handle for {}", context);
        let handle = (self.factory)(&context)?;
        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    fn resolve_keyed(&self, context: &TargetContext) -> Result<OperationsHandle> {
        if let Some(existing) = self.handles.get(context) {
            return Ok(Arc::clone(existing.value()));
        }
        // The entry API makes construct-or-fetch atomic per key: a racing
        // second caller blocks on this shard until the winner has inserted.
        match self.handles.entry(context.clone()) {
            dashmap::mapref::entry::Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                debug!("constructing operations handle for {}", context);
                let handle = (self.factory)(context)?;
                entry.insert(Arc::clone(&handle));
                Ok(handle)
            }
        }
    }

    /// Re-point the default target. Drops the cached default handle so the
    /// next `resolve(None)` reconstructs against the new target; explicitly
    /// keyed handles are unaffected.
    pub fn set_default_target(&self, organization: impl Into<String>, space: impl Into<String>) {
        let context = TargetContext::new(organization, space);
        info!("setting default target: {}", context);
        *self.dynamic_target.write() = Some(context);
        *self.default_handle.lock() = None;
    }

    /// Revert the default target to the configured one and drop the cached
    /// default handle.
    pub fn clear_default_target(&self) {
        info!(
            "clearing default target, reverting to {}",
            self.configured_default
        );
        *self.dynamic_target.write() = None;
        *self.default_handle.lock() = None;
    }

    /// Drop every cached handle, including the default.
    pub fn clear_cache(&self) {
        info!(
            "clearing operations cache ({} keyed entries)",
            self.handles.len()
        );
        self.handles.clear();
        *self.default_handle.lock() = None;
    }

    /// Number of explicitly keyed cached handles
    pub fn cached_contexts(&self) -> usize {
        self.handles.len()
    }
}
