use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::Url;
use serde::de::DeserializeOwned;

use crate::donor_search::{Reply, SearchTransport};
use crate::error::{AppError, Result};
use crate::models::{
    BarChartPayload, Candidate, ContractMatches, ContributionGroupRecord, RepeatFrequency,
    RepeatedDonor, SearchResponse, TopDonorRow, TotalDonations, VendorMatches,
};

const TIMEOUT: Duration = Duration::from_secs(15);

/// Blocking client for the donortrail API. The base URL is fixed at
/// construction; every endpoint path is built from it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL plus percent-encoded path segments and query pairs.
    pub fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Settings(format!("Invalid API URL '{}': {e}", self.base_url)))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| AppError::Settings(format!("API URL cannot take a path: {}", self.base_url)))?;
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url(segments, &[])?;
        tracing::debug!(%url, "GET");
        let resp = self.client.get(url).send()?;
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(AppError::Other(message));
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn candidate_json<T: DeserializeOwned>(&self, endpoint: &str, candidate: &str) -> Result<T> {
        self.get_json(&["api", endpoint, candidate])
    }

    pub fn candidates(&self) -> Result<Vec<Candidate>> {
        self.get_json(&["api", "candidates"])
    }

    pub fn contributions(&self, candidate: &str) -> Result<Vec<ContributionGroupRecord>> {
        self.candidate_json("contributions", candidate)
    }

    pub fn top_donors_bar(&self, candidate: &str) -> Result<BarChartPayload> {
        self.candidate_json("top_donors_bar", candidate)
    }

    pub fn top_employers_bar(&self, candidate: &str) -> Result<BarChartPayload> {
        self.candidate_json("top_employers_bar", candidate)
    }

    pub fn top_donors_table(&self, candidate: &str) -> Result<Vec<TopDonorRow>> {
        self.candidate_json("top_donors_csv", candidate)
    }

    pub fn repeated_donors(&self, candidate: &str) -> Result<Vec<RepeatedDonor>> {
        self.candidate_json("repeated_donors", candidate)
    }

    pub fn repeat_frequency(&self, candidate: &str) -> Result<RepeatFrequency> {
        self.candidate_json("repeat_donors", candidate)
    }

    pub fn donations_over_time(&self, candidate: &str) -> Result<BarChartPayload> {
        self.candidate_json("donations_over_time", candidate)
    }

    pub fn total_donations(&self, candidate: &str) -> Result<TotalDonations> {
        self.candidate_json("total_donations", candidate)
    }

    pub fn vendors(&self, candidate: &str) -> Result<VendorMatches> {
        self.candidate_json("vendors", candidate)
    }

    pub fn contracts(&self, candidate: &str) -> Result<ContractMatches> {
        self.candidate_json("contracts", candidate)
    }

    /// Raw bytes of the combined contributions CSV.
    pub fn download_csv(&self, slug: &str) -> Result<Vec<u8>> {
        let file = crate::reports::export_filename(slug);
        let url = self.url(&["download", &file], &[])?;
        let resp = self.client.get(url).send()?.error_for_status()?;
        Ok(resp.bytes()?.to_vec())
    }
}

impl SearchTransport for ApiClient {
    /// Any HTTP status is accepted; the body decides the outcome.
    fn search_donor(&self, candidate: &str, query: &str) -> Reply {
        let url = match self.url(&["api", "search_donor", candidate], &[("q", query)]) {
            Ok(url) => url,
            Err(e) => return Reply::Failed(e.to_string()),
        };
        let body = match self.client.get(url).send().and_then(|r| r.text()) {
            Ok(body) => body,
            Err(e) => return Reply::Failed(e.to_string()),
        };
        let value: serde_json::Value = match serde_json::from_str(&body) {
            Ok(v) => v,
            Err(e) => return Reply::Failed(format!("response is not JSON: {e}")),
        };
        match serde_json::from_value::<SearchResponse>(value) {
            Ok(resp) => Reply::Response(resp),
            Err(_) => Reply::Unrecognized,
        }
    }
}
