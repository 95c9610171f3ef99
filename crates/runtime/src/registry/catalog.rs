//! Immutable catalog snapshots and their derived indices.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use ability_core::{AbilityId, AbilityInstance, fold_case};

/// One immutable generation of the registry contents, ordered by id.
///
/// Mutations never touch a published catalog; they build the next
/// generation and swap it in whole.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    generation: u64,
    abilities: BTreeMap<AbilityId, Arc<AbilityInstance>>,
}

impl Catalog {
    pub(crate) fn new(generation: u64, abilities: BTreeMap<AbilityId, Arc<AbilityInstance>>) -> Self {
        Self {
            generation,
            abilities,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, id: &str) -> Option<&Arc<AbilityInstance>> {
        self.abilities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.abilities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &AbilityId> {
        self.abilities.keys()
    }

    pub fn instances(&self) -> impl Iterator<Item = &Arc<AbilityInstance>> {
        self.abilities.values()
    }

    pub(crate) fn entries(&self) -> &BTreeMap<AbilityId, Arc<AbilityInstance>> {
        &self.abilities
    }
}

/// Derived indices over one catalog generation.
///
/// Built in one pass on the first read after a mutation and shared until
/// the next one; never patched in place.
#[derive(Debug, Default)]
pub struct CatalogCache {
    pub(crate) generation: u64,
    /// Lowercased category → instances in id order.
    pub(crate) by_category: BTreeMap<String, Vec<Arc<AbilityInstance>>>,
    /// Distinct categories in the casing of their first occurrence, sorted.
    pub(crate) categories: Vec<String>,
    /// Lowercased tag → instances in id order.
    pub(crate) by_tag: BTreeMap<String, Vec<Arc<AbilityInstance>>>,
    /// Distinct tags in the casing of their first occurrence, sorted.
    pub(crate) tags: Vec<String>,
    pub(crate) toggleable: Vec<AbilityId>,
    pub(crate) display_names: HashMap<AbilityId, String>,
}

impl CatalogCache {
    pub(crate) fn build(catalog: &Catalog) -> Self {
        let mut by_category: BTreeMap<String, Vec<Arc<AbilityInstance>>> = BTreeMap::new();
        let mut categories: BTreeMap<String, String> = BTreeMap::new();
        let mut by_tag: BTreeMap<String, Vec<Arc<AbilityInstance>>> = BTreeMap::new();
        let mut tags: BTreeMap<String, String> = BTreeMap::new();
        let mut toggleable = Vec::new();
        let mut display_names = HashMap::with_capacity(catalog.len());

        for (id, instance) in catalog.entries() {
            let def = instance.definition();
            let key = fold_case(&def.category);
            categories
                .entry(key.clone())
                .or_insert_with(|| def.category.clone());
            by_category.entry(key).or_default().push(Arc::clone(instance));
            for tag in &def.tags {
                let key = fold_case(tag);
                tags.entry(key.clone()).or_insert_with(|| tag.clone());
                by_tag.entry(key).or_default().push(Arc::clone(instance));
            }
            if def.is_toggleable() {
                toggleable.push(id.clone());
            }
            display_names.insert(id.clone(), def.display_name.clone());
        }

        Self {
            generation: catalog.generation(),
            by_category,
            categories: categories.into_values().collect(),
            by_tag,
            tags: tags.into_values().collect(),
            toggleable,
            display_names,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
