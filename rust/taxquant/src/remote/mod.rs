//! Talking to the remote taxonomy service.

mod resolver;
mod retry;
mod service;

pub use resolver::{
    ResolveOptions,
    Resolver,
};
pub use retry::{
    Backoff,
    RetryPolicy,
    Sleeper,
    ThreadSleeper,
};
pub use service::{
    HttpTaxonomyService,
    LineageRequest,
    LineageResponse,
    PeptideLineage,
    TaxaRequest,
    TaxonomyService,
};
