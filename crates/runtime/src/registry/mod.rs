//! Concurrent ability catalog keyed by stable id.
//!
//! - [`AbilityRegistry`]: copy-on-write catalog behind an `RwLock<Arc<_>>`;
//!   readers clone the current `Arc` and never observe a partial view
//! - [`Catalog`] / [`CatalogCache`]: one immutable generation and its
//!   derived indices (category, tag, toggleable subset, display names)
//! - [`AbilityQuery`]: filter → sort → limit over a snapshot
//!
//! Mutations are serialized by the compiled-set lock, build the next
//! generation off to the side and publish it with a single pointer swap. The
//! derived cache is tagged with the generation it was built from and dropped
//! wholesale on every swap.

mod catalog;
mod query;

pub use catalog::{Catalog, CatalogCache};
pub use query::{AbilityQuery, AbilitySummary, SortField, SortOrder};

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use ability_core::{
    AbilityBuilder, AbilityId, AbilityInstance, BuildError, ConfigReader, FrameworkConfig,
    fold_case,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Result of [`AbilityRegistry::reload`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadReport {
    /// Abilities in the new catalog.
    pub total: usize,
    /// Abilities whose config section was malformed and fell back to
    /// compiled defaults.
    pub defaulted: Vec<AbilityId>,
}

/// Single source of truth mapping [`AbilityId`] to [`AbilityInstance`].
///
/// Besides the live catalog the registry keeps the compiled ability set:
/// the builders installed with [`register_compiled`](Self::register_compiled).
/// [`reload`](Self::reload) rebuilds the catalog from that set alone, so an
/// unregistered compiled ability comes back and runtime additions are
/// dropped.
#[derive(Debug, Default)]
pub struct AbilityRegistry {
    catalog: RwLock<Arc<Catalog>>,
    cache: RwLock<Option<Arc<CatalogCache>>>,
    /// Compiled set in id order. Its lock also serializes every writer.
    compiled: Mutex<BTreeMap<AbilityId, AbilityBuilder>>,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current catalog generation, shared and immutable.
    pub fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn lock_writer(&self) -> MutexGuard<'_, BTreeMap<AbilityId, AbilityBuilder>> {
        self.compiled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== mutation =====

    /// Inserts `instance` unless its id is already registered (first writer
    /// wins). Returns true on insertion.
    ///
    /// The instance is a runtime addition: the next reload drops it.
    pub fn register(&self, instance: AbilityInstance) -> bool {
        let _writer = self.lock_writer();
        self.insert_live(instance)
    }

    /// Materializes `builder` against its `abilities.<id>` section and
    /// registers the result as a runtime addition.
    ///
    /// A malformed section falls back to compiled defaults with a warning;
    /// only a builder whose defaults are themselves invalid is an error.
    pub fn register_builder(
        &self,
        builder: &AbilityBuilder,
        config: &dyn ConfigReader,
    ) -> Result<bool, BuildError> {
        let (instance, _) = materialize(builder, config)?;
        Ok(self.register(instance))
    }

    /// Adds `builder` to the compiled set and registers its instance.
    ///
    /// Returns `Ok(false)` when the id is already taken, either in the
    /// compiled set or in the live catalog; nothing changes then.
    pub fn register_compiled(
        &self,
        builder: &AbilityBuilder,
        config: &dyn ConfigReader,
    ) -> Result<bool, BuildError> {
        let (instance, _) = materialize(builder, config)?;
        let mut compiled = self.lock_writer();
        if compiled.contains_key(instance.id()) {
            debug!(
                target: "runtime::registry",
                ability = %instance.id(),
                "Ability already compiled, keeping the existing template"
            );
            return Ok(false);
        }
        let id = instance.id().clone();
        if !self.insert_live(instance) {
            return Ok(false);
        }
        compiled.insert(id, builder.clone());
        Ok(true)
    }

    fn insert_live(&self, instance: AbilityInstance) -> bool {
        let current = self.snapshot();
        if current.contains(instance.id().as_str()) {
            debug!(
                target: "runtime::registry",
                ability = %instance.id(),
                "Ability already registered, keeping the existing instance"
            );
            return false;
        }
        let mut next = current.entries().clone();
        next.insert(instance.id().clone(), Arc::new(instance));
        self.publish(&current, next);
        true
    }

    /// Removes `id` from the live catalog. A compiled ability stays in the
    /// compiled set and returns on the next reload.
    pub fn unregister(&self, id: &str) -> bool {
        let _writer = self.lock_writer();
        let current = self.snapshot();
        if !current.contains(id) {
            return false;
        }
        let mut next = current.entries().clone();
        next.remove(id);
        self.publish(&current, next);
        true
    }

    /// Rebuilds the catalog from the compiled set and `config`, then swaps
    /// it in at once.
    ///
    /// Per-ability failures never abort the reload: a malformed section
    /// falls back to compiled defaults, and an ability whose defaults no
    /// longer build keeps its previous instance if it had one.
    pub fn reload(&self, config: &dyn ConfigReader) -> ReloadReport {
        let compiled = self.lock_writer();
        let current = self.snapshot();
        let mut defaulted = Vec::new();
        let mut next = BTreeMap::new();

        for (id, builder) in compiled.iter() {
            match materialize(builder, config) {
                Ok((rebuilt, fell_back)) => {
                    if fell_back {
                        defaulted.push(id.clone());
                    }
                    next.insert(id.clone(), Arc::new(rebuilt));
                }
                Err(error) => {
                    warn!(
                        target: "runtime::registry",
                        ability = %id,
                        error = %error,
                        "Ability failed to rebuild, keeping previous definition"
                    );
                    defaulted.push(id.clone());
                    if let Some(previous) = current.get(id.as_str()) {
                        next.insert(id.clone(), Arc::clone(previous));
                    }
                }
            }
        }

        let dropped = current.ids().filter(|id| !next.contains_key(*id)).count();
        if dropped > 0 {
            debug!(
                target: "runtime::registry",
                dropped,
                "Runtime-registered abilities dropped by reload"
            );
        }

        let total = next.len();
        self.publish(&current, next);
        ReloadReport { total, defaulted }
    }

    /// Drops every ability, compiled set included.
    pub fn clear(&self) {
        let mut compiled = self.lock_writer();
        compiled.clear();
        let current = self.snapshot();
        self.publish(&current, BTreeMap::new());
    }

    /// Ids of the compiled set, in id order.
    pub fn compiled_ids(&self) -> Vec<AbilityId> {
        self.lock_writer().keys().cloned().collect()
    }

    fn publish(&self, current: &Catalog, next: BTreeMap<AbilityId, Arc<AbilityInstance>>) {
        let catalog = Arc::new(Catalog::new(current.generation() + 1, next));
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = catalog;
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    // ===== lookup =====

    pub fn get(&self, id: &str) -> Option<Arc<AbilityInstance>> {
        self.snapshot().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.snapshot().contains(id)
    }

    pub fn count(&self) -> usize {
        self.snapshot().len()
    }

    pub fn ids(&self) -> Vec<AbilityId> {
        self.snapshot().ids().cloned().collect()
    }

    /// Every ability in id order.
    pub fn list_all(&self) -> Vec<Arc<AbilityInstance>> {
        self.snapshot().instances().cloned().collect()
    }

    pub fn query(&self, query: &AbilityQuery) -> Vec<Arc<AbilityInstance>> {
        query.apply(self.snapshot().instances())
    }

    // ===== cached indices =====

    /// Derived indices for the current generation, rebuilt on first use
    /// after a mutation.
    pub fn cache(&self) -> Arc<CatalogCache> {
        let catalog = self.snapshot();
        if let Some(cache) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|cache| cache.generation() == catalog.generation())
        {
            return Arc::clone(cache);
        }

        let built = Arc::new(CatalogCache::build(&catalog));
        let mut slot = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        // Only publish if no newer catalog was swapped in meanwhile.
        if self.snapshot().generation() == built.generation() {
            *slot = Some(Arc::clone(&built));
        }
        built
    }

    /// Eagerly rebuilds the derived indices.
    pub fn warm_caches(&self) {
        let cache = self.cache();
        debug!(
            target: "runtime::registry",
            generation = cache.generation(),
            categories = cache.categories.len(),
            "Registry caches warmed"
        );
    }

    pub fn list_by_category(&self, category: &str) -> Vec<Arc<AbilityInstance>> {
        self.cache()
            .by_category
            .get(&fold_case(category))
            .cloned()
            .unwrap_or_default()
    }

    pub fn count_by_category(&self, category: &str) -> usize {
        self.cache()
            .by_category
            .get(&fold_case(category))
            .map_or(0, Vec::len)
    }

    pub fn list_by_tag(&self, tag: &str) -> Vec<Arc<AbilityInstance>> {
        self.cache()
            .by_tag
            .get(&fold_case(tag))
            .cloned()
            .unwrap_or_default()
    }

    /// Distinct tags across the catalog, sorted.
    pub fn tags(&self) -> Vec<String> {
        self.cache().tags.clone()
    }

    pub fn categories(&self) -> Vec<String> {
        self.cache().categories.clone()
    }

    /// Ids of abilities flagged toggleable.
    pub fn toggleable(&self) -> Vec<AbilityId> {
        self.cache().toggleable.clone()
    }

    /// Display name for `id`, or the id itself when unknown.
    pub fn display_name(&self, id: &str) -> String {
        self.cache()
            .display_names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_owned())
    }
}

/// Builds `builder` with its config section, falling back to compiled
/// defaults when the section is malformed. The flag reports the fallback.
fn materialize(
    builder: &AbilityBuilder,
    config: &dyn ConfigReader,
) -> Result<(AbilityInstance, bool), BuildError> {
    let path = FrameworkConfig::ability_section_path(builder.id());
    let Some(section) = config.section(&path) else {
        return builder.build().map(|instance| (instance, false));
    };
    match builder.build_with(&section) {
        Ok(instance) => Ok((instance, false)),
        Err(error) => {
            warn!(
                target: "runtime::registry",
                ability = builder.id(),
                error = %error,
                "Invalid ability configuration, using compiled defaults"
            );
            builder.build().map(|instance| (instance, true))
        }
    }
}
