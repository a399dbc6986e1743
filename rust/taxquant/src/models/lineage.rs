use super::taxon::Taxon;
use crate::ranks::Rank;
use std::fmt::Display;

/// One rank of a lineage.
///
/// `Unknown` means the rank is finer than the LCA, so nothing can be said about
/// it. `Synthetic` means the taxon must exist (the rank is at or above the LCA)
/// but the service did not name it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LineageSlot {
    Resolved {
        id: u32,
        name: String,
    },
    Synthetic {
        rank: Rank,
        lca_id: u32,
    },
    #[default]
    Unknown,
}

/// Grouping key for the taxon occupying a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxonKey {
    Taxon(u32),
    Placeholder { rank: Rank, lca_id: u32 },
}

impl LineageSlot {
    pub fn resolved(id: u32, name: impl Into<String>) -> Self {
        LineageSlot::Resolved {
            id,
            name: name.into(),
        }
    }

    pub fn id(&self) -> Option<u32> {
        match self {
            LineageSlot::Resolved { id, .. } => Some(*id),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, LineageSlot::Unknown)
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, LineageSlot::Synthetic { .. })
    }

    pub fn key(&self) -> Option<TaxonKey> {
        match self {
            LineageSlot::Resolved { id, .. } => Some(TaxonKey::Taxon(*id)),
            LineageSlot::Synthetic { rank, lca_id } => Some(TaxonKey::Placeholder {
                rank: *rank,
                lca_id: *lca_id,
            }),
            LineageSlot::Unknown => None,
        }
    }

    /// Display name, `None` for unknown slots.
    pub fn name(&self) -> Option<String> {
        match self {
            LineageSlot::Unknown => None,
            other => Some(other.to_string()),
        }
    }
}

impl Display for LineageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineageSlot::Resolved { name, .. } => f.write_str(name),
            LineageSlot::Synthetic { rank, lca_id } => write!(f, "{}_{}", rank, lca_id),
            LineageSlot::Unknown => Ok(()),
        }
    }
}

/// A full lineage, one slot per ladder rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineage {
    slots: [LineageSlot; Rank::COUNT],
}

impl Lineage {
    pub fn from_slots(slots: [LineageSlot; Rank::COUNT]) -> Self {
        Self { slots }
    }

    pub fn unknown() -> Self {
        Self {
            slots: std::array::from_fn(|_| LineageSlot::Unknown),
        }
    }

    pub fn get(&self, rank: Rank) -> &LineageSlot {
        &self.slots[rank.index()]
    }

    /// Slots finest first.
    pub fn iter(&self) -> impl Iterator<Item = (Rank, &LineageSlot)> {
        Rank::ALL.into_iter().zip(self.slots.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageRecord {
    pub sequence: String,
    pub lca: Taxon,
    pub lineage: Lineage,
}
