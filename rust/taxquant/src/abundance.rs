use crate::errors::{
    Result,
    TaxQuantError,
};
use crate::io::lca_file::LcaTable;
use crate::models::TaxonKey;
use crate::ranks::Rank;
use std::collections::HashMap;
use tracing::{
    debug,
    info,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbundanceParams {
    pub rank: Rank,
    /// Taxa backed by fewer peptide rows are dropped entirely.
    pub min_peptides: usize,
    /// Report `log2(taxon / total)` instead of a percentage.
    pub log2: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceRow {
    pub key: TaxonKey,
    /// `None` for placeholder taxa.
    pub id: Option<u32>,
    pub name: String,
    /// Per sample percentage, or log2 ratio.
    pub values: Vec<f64>,
    /// Per sample summed quantities before normalization.
    pub raw: Vec<f64>,
    pub peptides: Vec<String>,
}

impl AbundanceRow {
    fn raw_total(&self) -> f64 {
        self.raw.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceTable {
    pub params: AbundanceParams,
    pub sample_names: Vec<String>,
    pub rows: Vec<AbundanceRow>,
}

struct Group {
    name: String,
    peptides: Vec<String>,
    sums: Vec<f64>,
}

/// Sums sample quantities per taxon at `params.rank` and normalizes them by
/// the per sample total over the taxa that pass the support filter.
///
/// Rows come out sorted by decreasing raw quantity, then by name.
pub fn aggregate(table: &LcaTable, params: AbundanceParams) -> Result<AbundanceTable> {
    let nsamples = table.sample_names.len();
    if nsamples == 0 {
        return Err(TaxQuantError::NoSampleColumns);
    }

    let mut groups: HashMap<TaxonKey, Group> = HashMap::new();
    for (peptide, record) in table.resolved() {
        let values = peptide.quant_values()?;
        if values.len() != nsamples {
            return Err(TaxQuantError::QuantLength {
                sequence: peptide.sequence().to_string(),
                expected: nsamples,
                found: values.len(),
            });
        }

        let slot = record.lineage.get(params.rank);
        let Some(key) = slot.key() else {
            continue;
        };
        let group = groups.entry(key).or_insert_with(|| Group {
            name: slot.to_string(),
            peptides: Vec::new(),
            sums: vec![0.0; nsamples],
        });
        group.peptides.push(peptide.sequence().to_string());
        for (sum, value) in group.sums.iter_mut().zip(values) {
            *sum += value;
        }
    }

    let ngroups = groups.len();
    let retained: Vec<(TaxonKey, Group)> = groups
        .into_iter()
        .filter(|(_, group)| group.peptides.len() >= params.min_peptides)
        .collect();
    debug!(
        "{} of {} taxa at {} have at least {} peptides",
        retained.len(),
        ngroups,
        params.rank,
        params.min_peptides
    );

    let mut totals = vec![0.0; nsamples];
    for (_, group) in retained.iter() {
        for (total, value) in totals.iter_mut().zip(group.sums.iter()) {
            *total += value;
        }
    }
    if !retained.is_empty() {
        if let Some(idx) = totals.iter().position(|x| *x == 0.0) {
            return Err(TaxQuantError::ZeroSampleTotal {
                sample: table.sample_names[idx].clone(),
            });
        }
    }

    let mut rows: Vec<AbundanceRow> = retained
        .into_iter()
        .map(|(key, group)| {
            let values = group
                .sums
                .iter()
                .zip(totals.iter())
                .map(|(sum, total)| {
                    let ratio = sum / total;
                    if params.log2 { ratio.log2() } else { ratio * 100.0 }
                })
                .collect();
            let id = match key {
                TaxonKey::Taxon(id) => Some(id),
                TaxonKey::Placeholder { .. } => None,
            };
            AbundanceRow {
                key,
                id,
                name: group.name,
                values,
                raw: group.sums,
                peptides: group.peptides,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.raw_total()
            .total_cmp(&a.raw_total())
            .then_with(|| a.name.cmp(&b.name))
    });

    info!(
        "Aggregated {} taxa at {} over {} samples",
        rows.len(),
        params.rank,
        nsamples
    );
    Ok(AbundanceTable {
        params,
        sample_names: table.sample_names.clone(),
        rows,
    })
}
