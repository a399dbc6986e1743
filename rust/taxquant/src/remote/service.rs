use crate::errors::ServiceError;
use crate::models::Taxon;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde::{
    Deserialize,
    Serialize,
};
use std::time::Duration;
use tracing::debug;

/// Body of the batched lineage lookup.
#[derive(Debug, Clone, Serialize)]
pub struct LineageRequest<'a> {
    pub peptides: &'a [String],
    pub equate_il: bool,
    pub missed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineageResponse {
    pub peptides: Vec<PeptideLineage>,
}

/// Lineage of one peptide. `lineage` holds one nullable taxon id per ladder
/// rank, coarsest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeptideLineage {
    pub sequence: String,
    pub lca: u32,
    pub lineage: Vec<Option<u32>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxaRequest<'a> {
    pub taxids: &'a [u32],
}

/// The two endpoints of the remote taxonomy service.
pub trait TaxonomyService {
    fn fetch_lineages(&self, request: &LineageRequest<'_>) -> Result<LineageResponse, ServiceError>;
    fn fetch_taxa(&self, request: &TaxaRequest<'_>) -> Result<Vec<Taxon>, ServiceError>;
}

impl<T: TaxonomyService + ?Sized> TaxonomyService for &T {
    fn fetch_lineages(&self, request: &LineageRequest<'_>) -> Result<LineageResponse, ServiceError> {
        (**self).fetch_lineages(request)
    }

    fn fetch_taxa(&self, request: &TaxaRequest<'_>) -> Result<Vec<Taxon>, ServiceError> {
        (**self).fetch_taxa(request)
    }
}

/// Blocking JSON-over-HTTP client for a Unipept compatible service.
#[derive(Debug, Clone)]
pub struct HttpTaxonomyService {
    client: reqwest::blocking::Client,
    lineage_url: String,
    taxa_url: String,
}

impl HttpTaxonomyService {
    pub const DEFAULT_LINEAGE_URL: &'static str = "https://unipept.ugent.be/mpa/pept2data";
    pub const DEFAULT_TAXA_URL: &'static str = "https://unipept.ugent.be/private_api/taxa";

    pub fn new(
        lineage_url: impl Into<String>,
        taxa_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Protocol {
                context: "HTTP client setup",
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            lineage_url: lineage_url.into(),
            taxa_url: taxa_url.into(),
        })
    }

    fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        context: &'static str,
    ) -> Result<T, ServiceError> {
        let transient = |message: String| ServiceError::Transient { context, message };

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .map_err(|e| transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transient(format!("{} answered with status {}", url, status)));
        }

        let text = response.text().map_err(|e| transient(e.to_string()))?;
        debug!("{} returned {} bytes", url, text.len());
        serde_json::from_str(&text).map_err(|e| ServiceError::Protocol {
            context,
            message: format!("unexpected response body: {}", e),
        })
    }
}

impl TaxonomyService for HttpTaxonomyService {
    fn fetch_lineages(&self, request: &LineageRequest<'_>) -> Result<LineageResponse, ServiceError> {
        self.post(&self.lineage_url, request, "lineage lookup")
    }

    fn fetch_taxa(&self, request: &TaxaRequest<'_>) -> Result<Vec<Taxon>, ServiceError> {
        self.post(&self.taxa_url, request, "taxon metadata lookup")
    }
}
