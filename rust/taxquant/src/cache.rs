use crate::models::Taxon;
use std::collections::{
    BTreeSet,
    HashMap,
};

/// Run-scoped memo of taxon metadata.
///
/// Entries are only ever added. A fresh cache is made for every run so
/// nothing outlives the process.
#[derive(Debug, Default)]
pub struct TaxonCache {
    taxa: HashMap<u32, Taxon>,
}

impl TaxonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: u32) -> Option<&Taxon> {
        self.taxa.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.taxa.contains_key(&id)
    }

    /// Inserts a taxon unless the id is already cached. Returns `true` if it was new.
    pub fn insert(&mut self, taxon: Taxon) -> bool {
        match self.taxa.entry(taxon.id) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(taxon);
                true
            }
        }
    }

    /// The ids from `ids` that still need to be fetched, sorted and deduplicated.
    pub fn missing(&self, ids: impl IntoIterator<Item = u32>) -> BTreeSet<u32> {
        ids.into_iter().filter(|id| !self.contains(*id)).collect()
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }
}
