use std::path::PathBuf;

/// Failure reported by a [`crate::remote::TaxonomyService`].
///
/// Only [`ServiceError::Transient`] is retried, anything the service answered
/// with but that we cannot make sense of is a protocol problem and stops the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Transient {
        context: &'static str,
        message: String,
    },
    Protocol {
        context: &'static str,
        message: String,
    },
}

impl ServiceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Transient { .. })
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Transient { context, message } => {
                write!(f, "transient error in {}: {}", context, message)
            }
            ServiceError::Protocol { context, message } => {
                write!(f, "protocol error in {}: {}", context, message)
            }
        }
    }
}

impl std::error::Error for ServiceError {}

#[derive(Debug)]
pub enum TaxQuantError {
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
    Csv {
        source: csv::Error,
        context: &'static str,
    },
    Json {
        source: serde_json::Error,
        context: &'static str,
    },
    Service(ServiceError),
    RetriesExhausted {
        context: &'static str,
        attempts: u32,
        last_error: ServiceError,
    },
    /// The metadata endpoint did not return a taxon the lineage endpoint referenced.
    MissingTaxon {
        id: u32,
    },
    LineageLength {
        sequence: String,
        expected: usize,
        found: usize,
    },
    MalformedLcaFile {
        line: Option<u64>,
        msg: String,
    },
    MalformedPeptideFile {
        line: Option<u64>,
        msg: String,
    },
    QuantValue {
        sequence: String,
        value: String,
    },
    QuantLength {
        sequence: String,
        expected: usize,
        found: usize,
    },
    NoSampleColumns,
    /// Every retained taxon has a zero value for this sample, so relative
    /// abundances cannot be computed.
    ZeroSampleTotal {
        sample: String,
    },
}

impl std::fmt::Display for TaxQuantError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaxQuantError::Io { source, path } => match path {
                Some(path) => write!(f, "I/O error on {}: {}", path.display(), source),
                None => write!(f, "I/O error: {}", source),
            },
            TaxQuantError::Csv { source, context } => write!(f, "{}: {}", context, source),
            TaxQuantError::Json { source, context } => write!(f, "{}: {}", context, source),
            TaxQuantError::Service(e) => write!(f, "{}", e),
            TaxQuantError::RetriesExhausted {
                context,
                attempts,
                last_error,
            } => write!(
                f,
                "gave up on {} after {} attempts, last error: {}",
                context, attempts, last_error
            ),
            TaxQuantError::MissingTaxon { id } => write!(
                f,
                "taxon {} was referenced by a lineage but missing from the metadata response",
                id
            ),
            TaxQuantError::LineageLength {
                sequence,
                expected,
                found,
            } => write!(
                f,
                "lineage for {} has {} entries, expected {}",
                sequence, found, expected
            ),
            TaxQuantError::MalformedLcaFile { line, msg } => match line {
                Some(line) => write!(f, "malformed LCA file at line {}: {}", line, msg),
                None => write!(f, "malformed LCA file: {}", msg),
            },
            TaxQuantError::MalformedPeptideFile { line, msg } => match line {
                Some(line) => write!(f, "malformed peptide file at line {}: {}", line, msg),
                None => write!(f, "malformed peptide file: {}", msg),
            },
            TaxQuantError::QuantValue { sequence, value } => write!(
                f,
                "quantitative value '{}' of peptide {} is not a finite number",
                value, sequence
            ),
            TaxQuantError::QuantLength {
                sequence,
                expected,
                found,
            } => write!(
                f,
                "peptide {} has {} quantitative values, expected {}",
                sequence, found, expected
            ),
            TaxQuantError::NoSampleColumns => {
                write!(f, "the LCA file has no quantitative sample columns")
            }
            TaxQuantError::ZeroSampleTotal { sample } => write!(
                f,
                "sample '{}' sums to zero over all retained taxa, relative abundance is undefined",
                sample
            ),
        }
    }
}

impl std::error::Error for TaxQuantError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TaxQuantError::Io { source, .. } => Some(source),
            TaxQuantError::Csv { source, .. } => Some(source),
            TaxQuantError::Json { source, .. } => Some(source),
            TaxQuantError::Service(e) => Some(e),
            TaxQuantError::RetriesExhausted { last_error, .. } => Some(last_error),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TaxQuantError>;

impl From<ServiceError> for TaxQuantError {
    fn from(x: ServiceError) -> Self {
        Self::Service(x)
    }
}

impl From<std::io::Error> for TaxQuantError {
    fn from(x: std::io::Error) -> Self {
        Self::Io {
            source: x,
            path: None,
        }
    }
}

impl From<csv::Error> for TaxQuantError {
    fn from(x: csv::Error) -> Self {
        Self::Csv {
            source: x,
            context: "Error reading tab separated data",
        }
    }
}

impl From<serde_json::Error> for TaxQuantError {
    fn from(x: serde_json::Error) -> Self {
        Self::Json {
            source: x,
            context: "Error serializing JSON",
        }
    }
}

impl TaxQuantError {
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            TaxQuantError::Io { source, .. } => TaxQuantError::Io {
                source,
                path: Some(path.into()),
            },
            other => other,
        }
    }
}
