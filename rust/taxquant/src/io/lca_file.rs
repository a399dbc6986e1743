//! The merged peptide + lineage table.
//!
//! Layout: the input peptide columns, then `taxon_id`, `taxon_name`,
//! `taxon_rank`, then an `<rank>_id`, `<rank>_name` pair per ladder rank,
//! coarsest first. Peptides without a lineage keep their input columns only.

use crate::errors::{
    Result,
    TaxQuantError,
};
use crate::models::{
    LineageRecord,
    PeptideRecord,
    Taxon,
};
use crate::normalize::{
    Ancestor,
    Ancestors,
    normalize,
};
use crate::ranks::Rank;
use std::fs::File;
use std::io::{
    BufReader,
    Read,
    Write,
};
use std::path::Path;
use tracing::info;

const LCA_COLUMNS: [&str; 3] = ["taxon_id", "taxon_name", "taxon_rank"];

/// Number of columns appended to a resolved row.
pub const LINEAGE_WIDTH: usize = LCA_COLUMNS.len() + 2 * Rank::COUNT;

/// Header names appended after the input peptide columns.
pub fn lineage_header() -> Vec<String> {
    let mut out: Vec<String> = LCA_COLUMNS.iter().map(|x| x.to_string()).collect();
    for rank in Rank::coarsest_first() {
        out.push(format!("{}_id", rank));
        out.push(format!("{}_name", rank));
    }
    out
}

fn lineage_columns(record: &LineageRecord) -> Vec<String> {
    let mut out = Vec::with_capacity(LINEAGE_WIDTH);
    out.push(record.lca.id.to_string());
    out.push(record.lca.name.clone());
    out.push(record.lca.rank.clone());
    for rank in Rank::coarsest_first() {
        let slot = record.lineage.get(rank);
        out.push(slot.id().map(|id| id.to_string()).unwrap_or_default());
        out.push(slot.to_string());
    }
    out
}

pub struct LcaWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LcaWriter<W> {
    /// Wraps `output` and writes the header right away.
    pub fn new(output: W, peptide_header: &[String]) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(output);
        let header = peptide_header.iter().cloned().chain(lineage_header());
        writer.write_record(header)?;
        Ok(Self { writer })
    }

    pub fn write_row(
        &mut self,
        peptide: &PeptideRecord,
        lineage: Option<&LineageRecord>,
    ) -> Result<()> {
        match lineage {
            Some(lineage) => {
                let row = peptide
                    .columns()
                    .iter()
                    .cloned()
                    .chain(lineage_columns(lineage));
                self.writer.write_record(row)?;
            }
            None => self.writer.write_record(peptide.columns())?,
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| TaxQuantError::from(e.into_error()))
    }
}

/// One row of a previously written LCA file.
#[derive(Debug, Clone, PartialEq)]
pub struct LcaRow {
    pub peptide: PeptideRecord,
    pub lineage: Option<LineageRecord>,
}

/// An LCA file loaded back into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct LcaTable {
    /// Headers of the peptide columns after the sequence.
    pub sample_names: Vec<String>,
    pub rows: Vec<LcaRow>,
}

impl LcaTable {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TaxQuantError::from(e).with_path(path))?;
        info!("Reading LCA table from {}", path.display());
        Self::read(BufReader::new(file))
    }

    pub fn read<R: Read>(input: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .quoting(false)
            .from_reader(input);
        let header: Vec<String> = reader.headers()?.iter().map(|x| x.to_string()).collect();

        let lead = header
            .iter()
            .position(|x| x == LCA_COLUMNS[0])
            .ok_or_else(|| TaxQuantError::MalformedLcaFile {
                line: Some(1),
                msg: format!("no '{}' column in header", LCA_COLUMNS[0]),
            })?;
        if lead == 0 {
            return Err(TaxQuantError::MalformedLcaFile {
                line: Some(1),
                msg: "missing the peptide sequence column".to_string(),
            });
        }
        if header[lead..] != lineage_header()[..] {
            return Err(TaxQuantError::MalformedLcaFile {
                line: Some(1),
                msg: "lineage columns do not match the rank ladder".to_string(),
            });
        }

        let sample_names = header[1..lead].to_vec();
        let mut rows = Vec::new();
        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line());
            let fields: Vec<&str> = row.iter().collect();
            let lineage = match fields.len() {
                n if n <= lead => None,
                n if n == lead + LINEAGE_WIDTH => {
                    Some(parse_lineage(&fields[..lead], &fields[lead..], line)?)
                }
                n => {
                    return Err(TaxQuantError::MalformedLcaFile {
                        line,
                        msg: format!(
                            "row has {} columns, expected {} or {}",
                            n,
                            lead,
                            lead + LINEAGE_WIDTH
                        ),
                    });
                }
            };
            let keep = fields.len().min(lead);
            let peptide = PeptideRecord::new(fields[..keep].iter().map(|x| x.to_string()).collect());
            rows.push(LcaRow { peptide, lineage });
        }
        info!("Read {} LCA rows", rows.len());

        Ok(Self { sample_names, rows })
    }

    pub fn resolved(&self) -> impl Iterator<Item = (&PeptideRecord, &LineageRecord)> {
        self.rows
            .iter()
            .filter_map(|row| row.lineage.as_ref().map(|l| (&row.peptide, l)))
    }
}

fn parse_id(value: &str, line: Option<u64>) -> Result<u32> {
    value.parse().map_err(|_| TaxQuantError::MalformedLcaFile {
        line,
        msg: format!("'{}' is not a taxon id", value),
    })
}

fn parse_lineage(lead: &[&str], fields: &[&str], line: Option<u64>) -> Result<LineageRecord> {
    let lca = Taxon::new(parse_id(fields[0], line)?, fields[1], fields[2]);
    let mut ancestors: Ancestors = std::array::from_fn(|_| None);
    for (i, rank) in Rank::coarsest_first().enumerate() {
        let id = fields[3 + 2 * i];
        if id.is_empty() {
            continue;
        }
        let name = fields[4 + 2 * i];
        ancestors[rank.index()] = Some(Ancestor::new(parse_id(id, line)?, name));
    }
    let lineage = normalize(&lca, &ancestors);

    // Anything that was written as a placeholder must come back as one.
    for (i, rank) in Rank::coarsest_first().enumerate() {
        let written = fields[4 + 2 * i];
        let slot = lineage.get(rank);
        if fields[3 + 2 * i].is_empty() && !written.is_empty() && slot.to_string() != written {
            return Err(TaxQuantError::MalformedLcaFile {
                line,
                msg: format!(
                    "{} name '{}' has no id and is not the placeholder '{}'",
                    rank,
                    written,
                    slot
                ),
            });
        }
    }

    Ok(LineageRecord {
        sequence: lead[0].to_string(),
        lca,
        lineage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lineage;

    fn header() -> Vec<String> {
        vec!["sequence".to_string(), "s1".to_string()]
    }

    fn ecoli_record() -> LineageRecord {
        let lca = Taxon::new(561, "Escherichia", "genus");
        let mut ancestors: Ancestors = std::array::from_fn(|_| None);
        ancestors[Rank::Genus.index()] = Some(Ancestor::new(561, "Escherichia"));
        ancestors[Rank::Superkingdom.index()] = Some(Ancestor::new(2, "Bacteria"));
        LineageRecord {
            sequence: "ESCHK".to_string(),
            lineage: normalize(&lca, &ancestors),
            lca,
        }
    }

    fn written(rows: &[(PeptideRecord, Option<LineageRecord>)]) -> String {
        let mut writer = LcaWriter::new(Vec::new(), &header()).unwrap();
        for (pep, lineage) in rows {
            writer.write_row(pep, lineage.as_ref()).unwrap();
        }
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_header_layout() {
        let header = lineage_header();
        assert_eq!(header.len(), LINEAGE_WIDTH);
        assert_eq!(
            &header[..5],
            &[
                "taxon_id",
                "taxon_name",
                "taxon_rank",
                "superkingdom_id",
                "superkingdom_name"
            ]
        );
        assert_eq!(&header[LINEAGE_WIDTH - 2..], &["forma_id", "forma_name"]);
    }

    #[test]
    fn test_row_layout() {
        let pep = PeptideRecord::new(vec!["ESCHK".to_string(), "4".to_string()]);
        let text = written(&[
            (pep.clone(), Some(ecoli_record())),
            (PeptideRecord::new(vec!["NOPEK".to_string(), "1".to_string()]), None),
        ]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);

        let resolved: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(resolved.len(), 2 + LINEAGE_WIDTH);
        assert_eq!(&resolved[..5], &["ESCHK", "4", "561", "Escherichia", "genus"]);
        assert_eq!(&resolved[5..7], &["2", "Bacteria"]);
        // kingdom is coarser than the genus LCA but unnamed
        assert_eq!(&resolved[7..9], &["", "kingdom_561"]);
        // species and everything finer
        assert!(resolved[resolved.len() - 14..].iter().all(|x| x.is_empty()));
        assert_eq!(&resolved[resolved.len() - 16..resolved.len() - 14], &["561", "Escherichia"]);

        assert_eq!(lines[2], "NOPEK\t1");
    }

    #[test]
    fn test_read_back_restores_placeholders() {
        let pep = PeptideRecord::new(vec!["ESCHK".to_string(), "4".to_string()]);
        let unresolved = PeptideRecord::new(vec!["NOPEK".to_string(), "1".to_string()]);
        let text = written(&[(pep.clone(), Some(ecoli_record())), (unresolved.clone(), None)]);

        let table = LcaTable::read(text.as_bytes()).unwrap();
        assert_eq!(table.sample_names, vec!["s1".to_string()]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].peptide, pep);
        assert_eq!(table.rows[0].lineage.as_ref(), Some(&ecoli_record()));
        assert_eq!(table.rows[1].peptide, unresolved);
        assert!(table.rows[1].lineage.is_none());
        assert_eq!(table.resolved().count(), 1);
    }

    #[test]
    fn test_rejects_foreign_files() {
        let err = LcaTable::read("sequence\ts1\nAAAK\t1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TaxQuantError::MalformedLcaFile { line: Some(1), .. }));

        let mut text = written(&[]);
        text.push_str("AAAK\t1\t2\n");
        let err = LcaTable::read(text.as_bytes()).unwrap_err();
        assert!(matches!(err, TaxQuantError::MalformedLcaFile { .. }));
    }

    #[test]
    fn test_unknown_lineage_round_trip() {
        let record = LineageRecord {
            sequence: "ROOTK".to_string(),
            lca: Taxon::new(1, "root", "no rank"),
            lineage: Lineage::unknown(),
        };
        let pep = PeptideRecord::new(vec!["ROOTK".to_string(), "2".to_string()]);
        let text = written(&[(pep, Some(record.clone()))]);
        let table = LcaTable::read(text.as_bytes()).unwrap();
        assert_eq!(table.rows[0].lineage.as_ref(), Some(&record));
    }
}
