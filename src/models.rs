use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// `null` reads as the type's default, same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Stored entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub slug: String,
    pub display_name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    pub recipient_first: String,
    pub recipient_last: String,
}

/// Intermediate representation from a contribution parser before DB insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedContribution {
    pub contributor_group: String,
    pub amount: f64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub business_name: Option<String>,
    pub contribution_date: Option<String>,
    pub employer: Option<String>,
    pub occupation: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// One pay-to-play workbook row, not yet attributed to a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedP2pRow {
    pub recipient_name: String,
    pub contribution: ParsedContribution,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVendor {
    pub business_name: String,
    pub gross_sale_revenue: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedContract {
    pub vendor: String,
    pub dollars_spent: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// API payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionGroupRecord {
    #[serde(rename = "ContributorGroup")]
    pub contributor_group: String,
    #[serde(rename = "ContributionAmount")]
    pub contribution_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorRecord {
    #[serde(rename = "ContributorName", default, deserialize_with = "null_as_default")]
    pub contributor_name: String,
    #[serde(rename = "ContributionAmount", default, deserialize_with = "null_as_default")]
    pub contribution_amount: f64,
    #[serde(rename = "Employer", default)]
    pub employer: Option<String>,
    #[serde(rename = "Donor_City", default)]
    pub donor_city: Option<String>,
    #[serde(rename = "ContributionDate", default)]
    pub contribution_date: Option<String>,
    #[serde(rename = "ContributorGroup", default)]
    pub contributor_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopDonorRow {
    #[serde(rename = "ContributorName")]
    pub contributor_name: String,
    #[serde(rename = "ContributionAmount")]
    pub contribution_amount: f64,
    #[serde(rename = "Employer", default)]
    pub employer: Option<String>,
    #[serde(rename = "Donor_City", default)]
    pub donor_city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub data: Vec<f64>,
    #[serde(rename = "backgroundColor", default, skip_serializing_if = "Vec::is_empty")]
    pub background_color: Vec<String>,
    #[serde(rename = "borderColor", default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
}

/// Chart-library shaped payload. Used for bar and line charts alike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChartPayload {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatedDonor {
    #[serde(rename = "ContributorName")]
    pub contributor_name: String,
    #[serde(rename = "TotalAmount")]
    pub total_amount: f64,
}

/// Donor name -> month (`YYYY-MM`) -> number of contributions that month.
pub type RepeatFrequency = BTreeMap<String, BTreeMap<String, i64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalDonations {
    pub candidate: String,
    pub total_donations: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorMatch {
    #[serde(rename = "Business_Name")]
    pub business_name: String,
    #[serde(rename = "ContributionAmount")]
    pub contribution_amount: f64,
    #[serde(rename = "Matched_Vendor")]
    pub matched_vendor: String,
    #[serde(rename = "Similarity")]
    pub similarity: f64,
    #[serde(rename = "Gross_Sale_Revenue", default)]
    pub gross_sale_revenue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractMatch {
    #[serde(rename = "Donor Business")]
    pub donor_business: String,
    #[serde(rename = "Donated")]
    pub donated: f64,
    #[serde(rename = "Matched Vendor")]
    pub matched_vendor: String,
    #[serde(rename = "Contract Value", default)]
    pub contract_value: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Similarity")]
    pub similarity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorMatches {
    #[serde(default)]
    pub vendor_matches: Vec<VendorMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContractMatches {
    #[serde(default)]
    pub contract_matches: Vec<ContractMatch>,
}

// ---------------------------------------------------------------------------
// Donor search
// ---------------------------------------------------------------------------

/// Body of `/api/search_donor/{candidate}`.
///
/// A body carrying `error` is an error no matter what else it holds, so that
/// variant is tried first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Error { error: String },
    Outcome(SearchOutcome),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchOutcome {
    Found {
        #[serde(default, deserialize_with = "null_as_default")]
        donor: String,
        #[serde(default, deserialize_with = "null_as_default")]
        records: Vec<DonorRecord>,
    },
    NotFound {
        #[serde(default)]
        query: String,
        #[serde(default)]
        suggestions: Vec<String>,
    },
}

impl SearchResponse {
    pub fn found(donor: &str, records: Vec<DonorRecord>) -> Self {
        Self::Outcome(SearchOutcome::Found {
            donor: donor.to_string(),
            records,
        })
    }

    pub fn not_found(query: &str, suggestions: Vec<String>) -> Self {
        Self::Outcome(SearchOutcome::NotFound {
            query: query.to_string(),
            suggestions,
        })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_response_found_shape() {
        let body = json!({
            "status": "found",
            "donor": "mcmanimon",
            "records": [{"ContributorName": "McManimon Scotland & Baumann LLC", "ContributionAmount": 5400}]
        });
        let parsed: SearchResponse = serde_json::from_value(body).unwrap();
        match parsed {
            SearchResponse::Outcome(SearchOutcome::Found { records, .. }) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].contribution_amount, 5400.0);
                assert!(records[0].employer.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_found_record_with_null_fields_is_still_found() {
        let body = json!({
            "status": "found",
            "records": [{"ContributorName": "X LLC", "ContributionAmount": null, "Employer": null}]
        });
        let parsed: SearchResponse = serde_json::from_value(body).unwrap();
        match parsed {
            SearchResponse::Outcome(SearchOutcome::Found { records, .. }) => {
                assert_eq!(records[0].contributor_name, "X LLC");
                assert_eq!(records[0].contribution_amount, 0.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_search_response_error_wins_over_status() {
        let body = json!({"status": "found", "records": [], "error": "File not found"});
        let parsed: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed, SearchResponse::error("File not found"));
    }

    #[test]
    fn test_search_response_not_found_without_suggestions_key() {
        let parsed: SearchResponse = serde_json::from_value(json!({"status": "not_found"})).unwrap();
        assert_eq!(parsed, SearchResponse::not_found("", vec![]));
    }

    #[test]
    fn test_search_response_unknown_status_is_rejected() {
        let parsed = serde_json::from_value::<SearchResponse>(json!({"status": "maybe"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_search_response_serializes_status_tag() {
        let value = serde_json::to_value(SearchResponse::not_found("sal", vec!["Sal's Electric Co.".into()])).unwrap();
        assert_eq!(value["status"], "not_found");
        assert_eq!(value["query"], "sal");
        assert_eq!(value["suggestions"][0], "Sal's Electric Co.");
    }

    #[test]
    fn test_contract_match_uses_spaced_keys() {
        let m = ContractMatch {
            donor_business: "ACME PAVING LLC".into(),
            donated: 2600.0,
            matched_vendor: "ACME PAVING LLC".into(),
            contract_value: Some("$120,000".into()),
            status: Some("Awarded".into()),
            similarity: 100.0,
        };
        let value = serde_json::to_value(&m).unwrap();
        assert_eq!(value["Donor Business"], "ACME PAVING LLC");
        assert_eq!(value["Contract Value"], "$120,000");
    }
}
