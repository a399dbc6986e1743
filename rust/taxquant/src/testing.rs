//! In-memory stand-ins for the remote service and the clock.

use crate::errors::ServiceError;
use crate::models::Taxon;
use crate::ranks::Rank;
use crate::remote::{
    LineageRequest,
    LineageResponse,
    PeptideLineage,
    Sleeper,
    TaxaRequest,
    TaxonomyService,
};
use std::cell::{
    Cell,
    RefCell,
};
use std::collections::{
    HashMap,
    HashSet,
};
use std::time::Duration;

#[derive(Debug, Default)]
pub(crate) struct RecordingSleeper {
    slept: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn recorded(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockService {
    lineages: HashMap<String, PeptideLineage>,
    taxa: HashMap<u32, Taxon>,
    withheld: HashSet<u32>,
    lineage_failures: Cell<u32>,
    pub(crate) lineage_calls: RefCell<Vec<Vec<String>>>,
    /// `(equate_il, missed)` of every lineage call.
    pub(crate) lineage_flags: RefCell<Vec<(bool, bool)>>,
    pub(crate) taxa_calls: RefCell<Vec<Vec<u32>>>,
}

impl MockService {
    pub(crate) fn add_taxon(&mut self, id: u32, name: &str, rank: &str) -> &mut Self {
        self.taxa.insert(id, Taxon::new(id, name, rank));
        self
    }

    /// Registers a peptide whose lineage names the given `(rank, taxon id)` pairs.
    pub(crate) fn add_peptide(&mut self, sequence: &str, lca: u32, ancestors: &[(Rank, u32)]) -> &mut Self {
        let mut lineage = vec![None; Rank::COUNT];
        for (rank, id) in ancestors {
            lineage[Rank::COUNT - 1 - rank.index()] = Some(*id);
        }
        self.lineages.insert(
            sequence.to_string(),
            PeptideLineage {
                sequence: sequence.to_string(),
                lca,
                lineage,
            },
        );
        self
    }

    /// The metadata endpoint will pretend not to know this id.
    pub(crate) fn withhold(&mut self, id: u32) -> &mut Self {
        self.withheld.insert(id);
        self
    }

    pub(crate) fn fail_lineage_calls(&self, times: u32) {
        self.lineage_failures.set(times);
    }

    /// Taxon ids requested from the metadata endpoint over all calls.
    pub(crate) fn requested_taxa(&self) -> Vec<u32> {
        self.taxa_calls.borrow().iter().flatten().copied().collect()
    }
}

impl TaxonomyService for MockService {
    fn fetch_lineages(&self, request: &LineageRequest<'_>) -> Result<LineageResponse, ServiceError> {
        self.lineage_calls.borrow_mut().push(request.peptides.to_vec());
        self.lineage_flags
            .borrow_mut()
            .push((request.equate_il, request.missed));
        if self.lineage_failures.get() > 0 {
            self.lineage_failures.set(self.lineage_failures.get() - 1);
            return Err(ServiceError::Transient {
                context: "lineage lookup",
                message: "503 Service Unavailable".to_string(),
            });
        }
        let peptides = request
            .peptides
            .iter()
            .filter_map(|seq| self.lineages.get(seq).cloned())
            .collect();
        Ok(LineageResponse { peptides })
    }

    fn fetch_taxa(&self, request: &TaxaRequest<'_>) -> Result<Vec<Taxon>, ServiceError> {
        self.taxa_calls.borrow_mut().push(request.taxids.to_vec());
        Ok(request
            .taxids
            .iter()
            .filter(|id| !self.withheld.contains(*id))
            .filter_map(|id| self.taxa.get(id).cloned())
            .collect())
    }
}

/// A small E. coli / B. subtilis world used across tests.
pub(crate) fn sample_service() -> MockService {
    let mut service = MockService::default();
    service
        .add_taxon(1, "root", "no rank")
        .add_taxon(2, "Bacteria", "superkingdom")
        .add_taxon(1224, "Proteobacteria", "phylum")
        .add_taxon(1239, "Firmicutes", "phylum")
        .add_taxon(543, "Enterobacteriaceae", "family")
        .add_taxon(561, "Escherichia", "genus")
        .add_taxon(562, "Escherichia coli", "species")
        .add_taxon(1386, "Bacillus", "genus")
        .add_taxon(1423, "Bacillus subtilis", "species")
        .add_peptide(
            "ECOLIK",
            562,
            &[
                (Rank::Superkingdom, 2),
                (Rank::Phylum, 1224),
                (Rank::Family, 543),
                (Rank::Genus, 561),
                (Rank::Species, 562),
            ],
        )
        .add_peptide(
            "ESCHK",
            561,
            &[
                (Rank::Superkingdom, 2),
                (Rank::Phylum, 1224),
                (Rank::Family, 543),
                (Rank::Genus, 561),
            ],
        )
        .add_peptide(
            "BSUBK",
            1423,
            &[
                (Rank::Superkingdom, 2),
                (Rank::Phylum, 1239),
                (Rank::Genus, 1386),
                (Rank::Species, 1423),
            ],
        )
        .add_peptide("ROOTK", 1, &[]);
    service
}
