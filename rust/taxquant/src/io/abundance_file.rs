use crate::abundance::AbundanceTable;
use crate::errors::Result;
use std::io::Write;

/// Writes the abundance table: three `#` comment lines with the parameters,
/// a header, then one row per taxon. Placeholder taxa get an empty id.
pub fn write_abundance<W: Write>(table: &AbundanceTable, output: W) -> Result<()> {
    let mut output = output;
    writeln!(output, "# rank: {}", table.params.rank)?;
    writeln!(output, "# min_peptides: {}", table.params.min_peptides)?;
    writeln!(output, "# log2: {}", table.params.log2)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(output);

    let mut header = vec!["Taxon Id".to_string(), "Taxon name".to_string()];
    header.extend(table.sample_names.iter().cloned());
    header.push("Peptides".to_string());
    writer.write_record(&header)?;

    for row in table.rows.iter() {
        let mut record = Vec::with_capacity(row.values.len() + 3);
        record.push(row.id.map(|id| id.to_string()).unwrap_or_default());
        record.push(row.name.clone());
        record.extend(row.values.iter().map(|v| v.to_string()));
        record.push(row.peptides.join(";"));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abundance::{
        AbundanceParams,
        AbundanceRow,
    };
    use crate::models::TaxonKey;
    use crate::ranks::Rank;

    #[test]
    fn test_layout() {
        let table = AbundanceTable {
            params: AbundanceParams {
                rank: Rank::Genus,
                min_peptides: 2,
                log2: false,
            },
            sample_names: vec!["s1".to_string(), "s2".to_string()],
            rows: vec![
                AbundanceRow {
                    key: TaxonKey::Taxon(561),
                    id: Some(561),
                    name: "Escherichia".to_string(),
                    values: vec![75.0, 50.0],
                    raw: vec![30.0, 10.0],
                    peptides: vec!["AK".to_string(), "CK".to_string()],
                },
                AbundanceRow {
                    key: TaxonKey::Placeholder {
                        rank: Rank::Genus,
                        lca_id: 543,
                    },
                    id: None,
                    name: "genus_543".to_string(),
                    values: vec![25.0, 50.0],
                    raw: vec![10.0, 10.0],
                    peptides: vec!["BK".to_string(), "DK".to_string()],
                },
            ],
        };

        let mut out = Vec::new();
        write_abundance(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let expected = "# rank: genus\n\
                        # min_peptides: 2\n\
                        # log2: false\n\
                        Taxon Id\tTaxon name\ts1\ts2\tPeptides\n\
                        561\tEscherichia\t75\t50\tAK;CK\n\
                        \tgenus_543\t25\t50\tBK;DK\n";
        assert_eq!(text, expected);
    }
}
