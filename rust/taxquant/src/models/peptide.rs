use crate::errors::{
    Result,
    TaxQuantError,
};

/// A row of the peptide file.
///
/// All columns are kept verbatim so they can be echoed into the LCA file,
/// the first one is the sequence and any further ones are per-sample values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeptideRecord {
    columns: Vec<String>,
}

impl PeptideRecord {
    pub fn new(columns: Vec<String>) -> Self {
        let columns = if columns.is_empty() {
            vec![String::new()]
        } else {
            columns
        };
        Self { columns }
    }

    pub fn sequence(&self) -> &str {
        &self.columns[0]
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Parses every column after the sequence as a sample value.
    ///
    /// `NaN` and infinities are rejected along with anything non-numeric.
    pub fn quant_values(&self) -> Result<Vec<f64>> {
        self.columns[1..]
            .iter()
            .map(|value| {
                match value.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(v),
                    _ => Err(TaxQuantError::QuantValue {
                        sequence: self.sequence().to_string(),
                        value: value.clone(),
                    }),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cols: &[&str]) -> PeptideRecord {
        PeptideRecord::new(cols.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_quant_values() {
        let pep = record(&["PEPTIDEK", "3", "0", " 1.5"]);
        assert_eq!(pep.sequence(), "PEPTIDEK");
        assert_eq!(pep.quant_values().unwrap(), vec![3.0, 0.0, 1.5]);

        let bare = record(&["PEPTIDEK"]);
        assert!(bare.quant_values().unwrap().is_empty());
    }

    #[test]
    fn test_bad_quant_value() {
        let pep = record(&["PEPTIDEK", "3", "n/a"]);
        match pep.quant_values() {
            Err(TaxQuantError::QuantValue { sequence, value }) => {
                assert_eq!(sequence, "PEPTIDEK");
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_quant_values() {
        for bad in ["NaN", "inf", "-infinity", ""] {
            let pep = record(&["PEPTIDEK", "1", bad]);
            assert!(
                matches!(pep.quant_values(), Err(TaxQuantError::QuantValue { ref value, .. }) if value == bad),
                "{:?} was accepted",
                bad
            );
        }
    }
}
