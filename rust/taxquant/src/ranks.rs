//! The fixed rank ladder every lineage is aligned to.
//!
//! Index 0 is the finest rank (`forma`) and index 27 the coarsest
//! (`superkingdom`). The remote service and the LCA file list ranks the other
//! way around (coarsest first), see [`Rank::from_wire_position`].

use serde::{
    Deserialize,
    Serialize,
};
use std::fmt::Display;
use std::str::FromStr;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Forma,
    Varietas,
    Subspecies,
    Species,
    SpeciesSubgroup,
    SpeciesGroup,
    Subgenus,
    Genus,
    Subtribe,
    Tribe,
    Subfamily,
    Family,
    Superfamily,
    Parvorder,
    Infraorder,
    Suborder,
    Order,
    Superorder,
    Infraclass,
    Subclass,
    Class,
    Superclass,
    Subphylum,
    Phylum,
    Superphylum,
    Subkingdom,
    Kingdom,
    Superkingdom,
}

impl Rank {
    pub const COUNT: usize = 28;

    /// All ranks, finest first.
    pub const ALL: [Rank; Rank::COUNT] = [
        Rank::Forma,
        Rank::Varietas,
        Rank::Subspecies,
        Rank::Species,
        Rank::SpeciesSubgroup,
        Rank::SpeciesGroup,
        Rank::Subgenus,
        Rank::Genus,
        Rank::Subtribe,
        Rank::Tribe,
        Rank::Subfamily,
        Rank::Family,
        Rank::Superfamily,
        Rank::Parvorder,
        Rank::Infraorder,
        Rank::Suborder,
        Rank::Order,
        Rank::Superorder,
        Rank::Infraclass,
        Rank::Subclass,
        Rank::Class,
        Rank::Superclass,
        Rank::Subphylum,
        Rank::Phylum,
        Rank::Superphylum,
        Rank::Subkingdom,
        Rank::Kingdom,
        Rank::Superkingdom,
    ];

    /// Position on the ladder, 0 being the finest rank.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Rank> {
        Self::ALL.get(index).copied()
    }

    /// Maps a position in a remote lineage array (coarsest first) to its rank.
    pub fn from_wire_position(position: usize) -> Option<Rank> {
        if position >= Self::COUNT {
            return None;
        }
        Self::from_index(Self::COUNT - 1 - position)
    }

    /// Ranks in the order the remote service and the LCA file use.
    pub fn coarsest_first() -> impl Iterator<Item = Rank> {
        Self::ALL.into_iter().rev()
    }

    /// `true` when `self` sits strictly below `other` on the ladder.
    pub fn is_finer_than(self, other: Rank) -> bool {
        self.index() < other.index()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::Forma => "forma",
            Rank::Varietas => "varietas",
            Rank::Subspecies => "subspecies",
            Rank::Species => "species",
            Rank::SpeciesSubgroup => "species_subgroup",
            Rank::SpeciesGroup => "species_group",
            Rank::Subgenus => "subgenus",
            Rank::Genus => "genus",
            Rank::Subtribe => "subtribe",
            Rank::Tribe => "tribe",
            Rank::Subfamily => "subfamily",
            Rank::Family => "family",
            Rank::Superfamily => "superfamily",
            Rank::Parvorder => "parvorder",
            Rank::Infraorder => "infraorder",
            Rank::Suborder => "suborder",
            Rank::Order => "order",
            Rank::Superorder => "superorder",
            Rank::Infraclass => "infraclass",
            Rank::Subclass => "subclass",
            Rank::Class => "class",
            Rank::Superclass => "superclass",
            Rank::Subphylum => "subphylum",
            Rank::Phylum => "phylum",
            Rank::Superphylum => "superphylum",
            Rank::Subkingdom => "subkingdom",
            Rank::Kingdom => "kingdom",
            Rank::Superkingdom => "superkingdom",
        }
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRankError {
    pub name: String,
}

impl Display for UnknownRankError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' is not a rank on the ladder (expected one of: {})",
            self.name,
            Rank::ALL
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for UnknownRankError {}

impl FromStr for Rank {
    type Err = UnknownRankError;

    /// Accepts the ladder names, also with spaces instead of underscores
    /// ("species group") which is how the service spells them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(' ', "_");
        Rank::ALL
            .iter()
            .find(|r| r.as_str() == normalized)
            .copied()
            .ok_or_else(|| UnknownRankError {
                name: s.to_string(),
            })
    }
}
