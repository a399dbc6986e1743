use crate::ranks::Rank;
use serde::{
    Deserialize,
    Serialize,
};

/// Id of the universal root ("root", rank "no rank").
pub const ROOT_TAXON_ID: u32 = 1;

/// A taxon as described by the metadata endpoint.
///
/// `rank` is kept as the raw string since the service also reports values
/// that are not on the ladder, such as "no rank".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    pub id: u32,
    pub name: String,
    pub rank: String,
}

impl Taxon {
    pub fn new(id: u32, name: impl Into<String>, rank: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            rank: rank.into(),
        }
    }

    pub fn ladder_rank(&self) -> Option<Rank> {
        self.rank.parse().ok()
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_TAXON_ID
    }
}
