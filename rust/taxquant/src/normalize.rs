//! Aligning raw ancestor lists onto the rank ladder.

use crate::models::{
    Lineage,
    LineageSlot,
    Taxon,
};
use crate::ranks::Rank;

/// An ancestor as reported by the service, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ancestor {
    pub id: u32,
    pub name: String,
}

impl Ancestor {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

/// Ancestors indexed by ladder position (finest first).
pub type Ancestors = [Option<Ancestor>; Rank::COUNT];

/// Where the LCA sits on the ladder.
///
/// LCAs with a rank off the ladder ("no rank" clades, the root) take the
/// finest rank that has a named ancestor, since the clade lies between that
/// ancestor and anything finer.
pub fn effective_lca_rank(lca: &Taxon, ancestors: &Ancestors) -> Option<Rank> {
    if let Some(rank) = lca.ladder_rank() {
        return Some(rank);
    }
    Rank::ALL
        .into_iter()
        .find(|rank| ancestors[rank.index()].as_ref().is_some_and(Ancestor::is_named))
}

/// Builds the final lineage.
///
/// Named ancestors are kept as they are. Unnamed ranks finer than the LCA
/// become [`LineageSlot::Unknown`], unnamed ranks at or above it become a
/// [`LineageSlot::Synthetic`] placeholder tied to the LCA id.
pub fn normalize(lca: &Taxon, ancestors: &Ancestors) -> Lineage {
    let lca_rank = effective_lca_rank(lca, ancestors);
    Lineage::from_slots(std::array::from_fn(|index| {
        let rank = Rank::ALL[index];
        match &ancestors[index] {
            Some(ancestor) if ancestor.is_named() => {
                LineageSlot::resolved(ancestor.id, ancestor.name.clone())
            }
            _ => match lca_rank {
                Some(lca_rank) if !rank.is_finer_than(lca_rank) => LineageSlot::Synthetic {
                    rank,
                    lca_id: lca.id,
                },
                _ => LineageSlot::Unknown,
            },
        }
    }))
}
