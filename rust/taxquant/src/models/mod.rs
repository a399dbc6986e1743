mod lineage;
mod peptide;
mod taxon;

pub use lineage::{
    Lineage,
    LineageRecord,
    LineageSlot,
    TaxonKey,
};
pub use peptide::PeptideRecord;
pub use taxon::{
    ROOT_TAXON_ID,
    Taxon,
};
