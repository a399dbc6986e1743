use crate::models::{
    LineageRecord,
    TaxonKey,
};
use crate::ranks::Rank;
use rayon::prelude::*;
use std::collections::{
    BTreeMap,
    HashMap,
};
use tracing::{
    debug,
    info,
    warn,
};

/// Peptides first attributed to a rank, and those already attributed to a
/// finer one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankPeptideCount {
    pub at_rank: usize,
    pub at_finer_ranks: usize,
}

impl RankPeptideCount {
    /// Peptides resolved at this rank or finer.
    pub fn cumulative(&self) -> usize {
        self.at_rank + self.at_finer_ranks
    }
}

/// How peptides spread over the rank ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankDistribution {
    counts: [RankPeptideCount; Rank::COUNT],
    support: [BTreeMap<usize, usize>; Rank::COUNT],
    peptides: usize,
}

impl RankDistribution {
    pub fn counts(&self, rank: Rank) -> RankPeptideCount {
        self.counts[rank.index()]
    }

    /// Number of taxa at `rank` keyed by how many peptides support them.
    pub fn support(&self, rank: Rank) -> &BTreeMap<usize, usize> {
        &self.support[rank.index()]
    }

    /// Peptides that took part, i.e. all records whose LCA is not the root.
    pub fn peptides(&self) -> usize {
        self.peptides
    }
}

fn count_taxa(records: &[&LineageRecord], rank: Rank) -> HashMap<TaxonKey, usize> {
    let mut out = HashMap::new();
    for record in records {
        if let Some(key) = record.lineage.get(rank).key() {
            *out.entry(key).or_insert(0) += 1;
        }
    }
    out
}

/// Walks the ladder from the finest rank up, attributing each peptide to the
/// first rank where it has a taxon.
///
/// Records whose LCA is the root carry no rank information and are skipped.
pub fn compute_distribution<'a>(
    records: impl IntoIterator<Item = &'a LineageRecord>,
) -> RankDistribution {
    let records: Vec<&LineageRecord> = records
        .into_iter()
        .filter(|record| !record.lca.is_root())
        .collect();

    let per_rank: Vec<HashMap<TaxonKey, usize>> = Rank::ALL
        .par_iter()
        .map(|rank| count_taxa(&records, *rank))
        .collect();

    let mut counts = [RankPeptideCount::default(); Rank::COUNT];
    let mut support: [BTreeMap<usize, usize>; Rank::COUNT] = std::array::from_fn(|_| BTreeMap::new());
    let mut running = 0;
    for (rank, taxa) in Rank::ALL.into_iter().zip(per_rank.iter()) {
        let total: usize = taxa.values().sum();
        if total < running {
            // Only possible for lineages with gaps, e.g. an edited LCA file
            warn!(
                "{} peptides have a taxon at {} but only {} at this rank, the lineages have gaps",
                running, rank, total
            );
        }
        counts[rank.index()] = RankPeptideCount {
            at_rank: total.saturating_sub(running),
            at_finer_ranks: running,
        };
        running = running.max(total);

        let histogram = &mut support[rank.index()];
        for n in taxa.values() {
            *histogram.entry(*n).or_insert(0) += 1;
        }
        debug!(
            "{}: {} peptides over {} taxa, {} at finer ranks",
            rank,
            counts[rank.index()].at_rank,
            taxa.len(),
            counts[rank.index()].at_finer_ranks
        );
    }

    info!(
        "Computed rank distribution over {} peptides ({} resolved at some rank)",
        records.len(),
        running
    );
    RankDistribution {
        counts,
        support,
        peptides: records.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Lineage,
        LineageSlot,
        Taxon,
    };
    use crate::normalize::{
        Ancestor,
        Ancestors,
        normalize,
    };

    fn record(sequence: &str, lca: Taxon, named: &[(Rank, u32, &str)]) -> LineageRecord {
        let mut ancestors: Ancestors = std::array::from_fn(|_| None);
        for (rank, id, name) in named {
            ancestors[rank.index()] = Some(Ancestor::new(*id, *name));
        }
        LineageRecord {
            sequence: sequence.to_string(),
            lineage: normalize(&lca, &ancestors),
            lca,
        }
    }

    fn ecoli(sequence: &str) -> LineageRecord {
        record(
            sequence,
            Taxon::new(562, "Escherichia coli", "species"),
            &[
                (Rank::Species, 562, "Escherichia coli"),
                (Rank::Genus, 561, "Escherichia"),
                (Rank::Superkingdom, 2, "Bacteria"),
            ],
        )
    }

    fn escherichia(sequence: &str) -> LineageRecord {
        record(
            sequence,
            Taxon::new(561, "Escherichia", "genus"),
            &[
                (Rank::Genus, 561, "Escherichia"),
                (Rank::Superkingdom, 2, "Bacteria"),
            ],
        )
    }

    fn bacillus(sequence: &str) -> LineageRecord {
        record(
            sequence,
            Taxon::new(1386, "Bacillus", "genus"),
            &[
                (Rank::Genus, 1386, "Bacillus"),
                (Rank::Superkingdom, 2, "Bacteria"),
            ],
        )
    }

    fn root(sequence: &str) -> LineageRecord {
        record(sequence, Taxon::new(1, "root", "no rank"), &[])
    }

    fn sample() -> Vec<LineageRecord> {
        vec![
            ecoli("A"),
            ecoli("B"),
            escherichia("C"),
            bacillus("D"),
            root("E"),
            root("F"),
        ]
    }

    #[test]
    fn test_counts_per_rank() {
        let dist = compute_distribution(&sample());
        assert_eq!(dist.peptides(), 4);
        assert_eq!(
            dist.counts(Rank::Species),
            RankPeptideCount {
                at_rank: 2,
                at_finer_ranks: 0
            }
        );
        assert_eq!(dist.counts(Rank::Subgenus).at_rank, 0);
        assert_eq!(
            dist.counts(Rank::Genus),
            RankPeptideCount {
                at_rank: 2,
                at_finer_ranks: 2
            }
        );
        assert_eq!(dist.counts(Rank::Family).at_rank, 0);
        assert_eq!(dist.counts(Rank::Superkingdom).cumulative(), 4);
    }

    #[test]
    fn test_cumulative_counts_are_monotonic() {
        let dist = compute_distribution(&sample());
        let mut last = 0;
        for rank in Rank::ALL {
            let cumulative = dist.counts(rank).cumulative();
            assert!(cumulative >= last, "{} went down", rank);
            assert!(cumulative <= dist.peptides());
            last = cumulative;
        }
    }

    #[test]
    fn test_lineage_gap_keeps_counts_monotonic() {
        let mut slots: [LineageSlot; Rank::COUNT] = std::array::from_fn(|_| LineageSlot::Unknown);
        slots[Rank::Species.index()] = LineageSlot::resolved(562, "Escherichia coli");
        let gapped = LineageRecord {
            sequence: "G".to_string(),
            lca: Taxon::new(562, "Escherichia coli", "species"),
            lineage: Lineage::from_slots(slots),
        };
        let dist = compute_distribution(&[gapped]);
        assert_eq!(dist.counts(Rank::Species).at_rank, 1);
        assert_eq!(
            dist.counts(Rank::Genus),
            RankPeptideCount {
                at_rank: 0,
                at_finer_ranks: 1
            }
        );
        assert_eq!(dist.counts(Rank::Superkingdom).cumulative(), 1);
    }

    #[test]
    fn test_root_lca_is_excluded() {
        let only_root = vec![root("E")];
        let dist = compute_distribution(&only_root);
        assert_eq!(dist.peptides(), 0);
        assert!(Rank::ALL.iter().all(|r| dist.counts(*r).cumulative() == 0));
        assert!(Rank::ALL.iter().all(|r| dist.support(*r).is_empty()));
    }

    #[test]
    fn test_support_histogram() {
        let dist = compute_distribution(&sample());
        // E. coli is backed by two peptides
        assert_eq!(dist.support(Rank::Species), &BTreeMap::from([(2, 1)]));
        // Escherichia by three, Bacillus by one
        assert_eq!(dist.support(Rank::Genus), &BTreeMap::from([(1, 1), (3, 1)]));
        // Family placeholders differ per LCA: 562 twice, 561 and 1386 once
        assert_eq!(dist.support(Rank::Family), &BTreeMap::from([(1, 2), (2, 1)]));
        assert_eq!(dist.support(Rank::Superkingdom), &BTreeMap::from([(4, 1)]));
    }
}
