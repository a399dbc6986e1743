use crate::errors::{
    Result,
    TaxQuantError,
};
use crate::models::PeptideRecord;
use std::fs::File;
use std::io::{
    BufReader,
    Read,
};
use std::path::Path;

/// Streaming reader over a tab separated peptide file with a header row.
///
/// Quotes carry no meaning in these files and every field is taken verbatim.
/// Rows shorter than the header are padded with empty fields so the lineage
/// columns written after them line up. Rows wider than the header are rejected.
pub struct PeptideReader<R: Read> {
    reader: csv::Reader<R>,
    header: Vec<String>,
}

impl<R: Read> PeptideReader<R> {
    pub fn new(input: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .quoting(false)
            .has_headers(true)
            .from_reader(input);
        let header = reader
            .headers()
            .map_err(|e| TaxQuantError::Csv {
                source: e,
                context: "Error reading peptide file header",
            })?
            .iter()
            .map(|x| x.to_string())
            .collect();
        Ok(Self { reader, header })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn records(&mut self) -> impl Iterator<Item = Result<PeptideRecord>> + '_ {
        let width = self.header.len();
        self.reader.records().map(move |row| {
            let row = row.map_err(|e| TaxQuantError::Csv {
                source: e,
                context: "Error reading peptide file row",
            })?;
            if row.len() > width {
                return Err(TaxQuantError::MalformedPeptideFile {
                    line: row.position().map(|p| p.line()),
                    msg: format!("row has {} columns, header has {}", row.len(), width),
                });
            }
            let mut columns: Vec<String> = row.iter().map(|x| x.to_string()).collect();
            columns.resize(width.max(1), String::new());
            Ok(PeptideRecord::new(columns))
        })
    }
}

impl PeptideReader<BufReader<File>> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TaxQuantError::from(e).with_path(path))?;
        Self::new(BufReader::new(file))
    }
}
