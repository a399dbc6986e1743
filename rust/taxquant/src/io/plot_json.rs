//! JSON documents read by the plotting scripts.
//!
//! Ranks are written in ladder order, finest first. Non finite values are
//! written as the strings `"-Infinity"`, `"Infinity"` and `"NaN"` since JSON
//! has no literal for them.

use crate::abundance::AbundanceTable;
use crate::distribution::RankDistribution;
use crate::errors::{
    Result,
    TaxQuantError,
};
use crate::ranks::Rank;
use serde::ser::{
    SerializeMap,
    SerializeStruct,
};
use serde::{
    Serialize,
    Serializer,
};
use std::collections::HashMap;
use std::io::Write;

struct RankCounts<'a>(&'a RankDistribution);

impl Serialize for RankCounts<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Entry {
            peptide_count_for_rank: usize,
            peptide_count_for_subrank: usize,
        }

        let mut map = serializer.serialize_map(Some(Rank::COUNT))?;
        for rank in Rank::ALL {
            let counts = self.0.counts(rank);
            map.serialize_entry(
                rank.as_str(),
                &Entry {
                    peptide_count_for_rank: counts.at_rank,
                    peptide_count_for_subrank: counts.at_finer_ranks,
                },
            )?;
        }
        map.end()
    }
}

struct SupportHistogram<'a>(&'a RankDistribution);

impl Serialize for SupportHistogram<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Rank::COUNT))?;
        for rank in Rank::ALL {
            map.serialize_entry(rank.as_str(), self.0.support(rank))?;
        }
        map.end()
    }
}

struct Quant(f64);

impl Serialize for Quant {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            x if x.is_finite() => serializer.serialize_f64(x),
            x if x.is_nan() => serializer.serialize_str("NaN"),
            x if x > 0.0 => serializer.serialize_str("Infinity"),
            _ => serializer.serialize_str("-Infinity"),
        }
    }
}

struct AbundanceChart<'a>(&'a AbundanceTable);

impl Serialize for AbundanceChart<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Taxa<'a>(&'a AbundanceTable);

        impl Serialize for Taxa<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut seen: HashMap<&str, usize> = HashMap::new();
                for row in self.0.rows.iter() {
                    *seen.entry(row.name.as_str()).or_default() += 1;
                }
                let mut map = serializer.serialize_map(Some(self.0.rows.len()))?;
                for row in self.0.rows.iter() {
                    let values: Vec<Quant> = row.values.iter().map(|x| Quant(*x)).collect();
                    match row.id {
                        Some(id) if seen[row.name.as_str()] > 1 => {
                            map.serialize_entry(&format!("{} ({})", row.name, id), &values)?
                        }
                        _ => map.serialize_entry(&row.name, &values)?,
                    }
                }
                map.end()
            }
        }

        let table = self.0;
        let mut chart = serializer.serialize_struct("AbundanceChart", 3)?;
        chart.serialize_field("rank", table.params.rank.as_str())?;
        chart.serialize_field("samples", &table.sample_names)?;
        chart.serialize_field("taxon2Quants", &Taxa(table))?;
        chart.end()
    }
}

fn write_json<W: Write, T: Serialize>(output: W, value: &T, context: &'static str) -> Result<()> {
    serde_json::to_writer_pretty(output, value)
        .map_err(|source| TaxQuantError::Json { source, context })
}

/// `{rank: {peptideCountForRank, peptideCountForSubrank}}`
pub fn write_rank_counts<W: Write>(distribution: &RankDistribution, output: W) -> Result<()> {
    write_json(
        output,
        &RankCounts(distribution),
        "Error writing rank peptide counts",
    )
}

/// `{rank: {support: taxon count}}`
pub fn write_support_histogram<W: Write>(distribution: &RankDistribution, output: W) -> Result<()> {
    write_json(
        output,
        &SupportHistogram(distribution),
        "Error writing peptide support histogram",
    )
}

/// `{rank, samples, taxon2Quants: {taxon name: [value per sample]}}`
///
/// Taxa sharing a name at the rank are keyed `name (id)` instead.
pub fn write_abundance_chart<W: Write>(table: &AbundanceTable, output: W) -> Result<()> {
    write_json(output, &AbundanceChart(table), "Error writing abundance chart")
}
