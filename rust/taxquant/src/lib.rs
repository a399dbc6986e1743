pub mod abundance;
pub mod cache;
pub mod dispatch;
pub mod distribution;
pub mod errors;
pub mod io;
pub mod models;
pub mod normalize;
pub mod ranks;
pub mod remote;

#[cfg(test)]
mod testing;

pub use abundance::{
    AbundanceParams,
    AbundanceRow,
    AbundanceTable,
    aggregate,
};
pub use dispatch::{
    DispatchOptions,
    DispatchSummary,
    Dispatcher,
};
pub use distribution::{
    RankDistribution,
    RankPeptideCount,
    compute_distribution,
};
pub use errors::{
    Result,
    TaxQuantError,
};
pub use models::{
    Lineage,
    LineageRecord,
    LineageSlot,
    PeptideRecord,
    Taxon,
    TaxonKey,
};
pub use ranks::Rank;
pub use remote::{
    HttpTaxonomyService,
    ResolveOptions,
    Resolver,
    RetryPolicy,
    TaxonomyService,
};
