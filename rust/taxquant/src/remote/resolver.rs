use super::retry::{
    RetryPolicy,
    Sleeper,
    ThreadSleeper,
};
use super::service::{
    LineageRequest,
    TaxaRequest,
    TaxonomyService,
};
use crate::cache::TaxonCache;
use crate::errors::{
    Result,
    TaxQuantError,
};
use crate::models::LineageRecord;
use crate::normalize::{
    Ancestor,
    Ancestors,
    normalize,
};
use crate::ranks::Rank;
use std::collections::HashMap;
use tracing::{
    debug,
    instrument,
};

/// Flags forwarded to the lineage endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Treat isoleucine and leucine as the same residue.
    pub equate_il: bool,
    /// Let the service handle missed cleavages itself.
    pub missed_cleavage: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            equate_il: true,
            missed_cleavage: false,
        }
    }
}

/// Resolves peptide sequences to lineages through a [`TaxonomyService`],
/// remembering every taxon it has seen for the rest of the run.
pub struct Resolver<S, Z = ThreadSleeper> {
    service: S,
    sleeper: Z,
    retry: RetryPolicy,
    cache: TaxonCache,
}

impl<S: TaxonomyService> Resolver<S, ThreadSleeper> {
    pub fn new(service: S, retry: RetryPolicy) -> Self {
        Self {
            service,
            sleeper: ThreadSleeper,
            retry,
            cache: TaxonCache::new(),
        }
    }
}

impl<S: TaxonomyService, Z: Sleeper> Resolver<S, Z> {
    pub fn with_sleeper<Z2: Sleeper>(self, sleeper: Z2) -> Resolver<S, Z2> {
        Resolver {
            service: self.service,
            sleeper,
            retry: self.retry,
            cache: self.cache,
        }
    }

    pub fn cache(&self) -> &TaxonCache {
        &self.cache
    }

    pub fn sleeper(&self) -> &Z {
        &self.sleeper
    }

    /// Looks up the lineage of every sequence in `sequences` (expected to be
    /// unique). Sequences the service does not know are absent from the result.
    ///
    /// # Errors
    /// * the service keeps failing and the retry policy is bounded
    /// * the service answers with something that is not a valid lineage
    /// * the metadata endpoint leaves out a taxon a lineage referenced
    #[instrument(skip_all, fields(sequences = sequences.len()))]
    pub fn resolve(
        &mut self,
        sequences: &[String],
        options: ResolveOptions,
    ) -> Result<HashMap<String, LineageRecord>> {
        if sequences.is_empty() {
            return Ok(HashMap::new());
        }

        let request = LineageRequest {
            peptides: sequences,
            equate_il: options.equate_il,
            missed: options.missed_cleavage,
        };
        let response = self.retry.run(&self.sleeper, "lineage lookup", || {
            self.service.fetch_lineages(&request)
        })?;
        debug!(
            "{} of {} sequences matched",
            response.peptides.len(),
            sequences.len()
        );

        for entry in response.peptides.iter() {
            if entry.lineage.len() != Rank::COUNT {
                return Err(TaxQuantError::LineageLength {
                    sequence: entry.sequence.clone(),
                    expected: Rank::COUNT,
                    found: entry.lineage.len(),
                });
            }
        }

        let referenced = response.peptides.iter().flat_map(|entry| {
            std::iter::once(entry.lca).chain(entry.lineage.iter().flatten().copied())
        });
        let missing: Vec<u32> = self.cache.missing(referenced).into_iter().collect();
        if !missing.is_empty() {
            debug!(
                "Fetching {} taxa ({} already cached)",
                missing.len(),
                self.cache.len()
            );
            let request = TaxaRequest { taxids: &missing };
            let taxa = self.retry.run(&self.sleeper, "taxon metadata lookup", || {
                self.service.fetch_taxa(&request)
            })?;
            for taxon in taxa {
                self.cache.insert(taxon);
            }
            if let Some(id) = missing.iter().find(|id| !self.cache.contains(**id)) {
                return Err(TaxQuantError::MissingTaxon { id: *id });
            }
        }

        let mut out = HashMap::with_capacity(response.peptides.len());
        for entry in response.peptides {
            let lca = self
                .cache
                .get(entry.lca)
                .ok_or(TaxQuantError::MissingTaxon { id: entry.lca })?
                .clone();

            let mut ancestors: Ancestors = std::array::from_fn(|_| None);
            for (position, id) in entry.lineage.iter().enumerate() {
                let (Some(id), Some(rank)) = (id, Rank::from_wire_position(position)) else {
                    continue;
                };
                let taxon = self
                    .cache
                    .get(*id)
                    .ok_or(TaxQuantError::MissingTaxon { id: *id })?;
                ancestors[rank.index()] = Some(Ancestor::new(taxon.id, taxon.name.clone()));
            }

            let lineage = normalize(&lca, &ancestors);
            out.insert(
                entry.sequence.clone(),
                LineageRecord {
                    sequence: entry.sequence,
                    lca,
                    lineage,
                },
            );
        }
        Ok(out)
    }
}
