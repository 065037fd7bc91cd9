use std::sync::OnceLock;

use regex::Regex;

use crate::matcher::ratio;

/// Individual contributions strictly above this are "Individual - Large".
pub const LARGE_INDIVIDUAL_THRESHOLD: f64 = 4000.0;

/// Recipient names scoring at least this against "first last" are attributed
/// to the candidate even without both names appearing verbatim.
pub const RECIPIENT_SIMILARITY: f64 = 80.0;

const TYPE_MAPPING: &[(&str, &str)] = &[
    ("INDIVIDUAL", "Individual"),
    ("BUSINESS/CORP", "Corporate"),
    ("BUSINESS/ CORP ASSOC/ PAC", "Corporate"),
    ("UNION", "Union"),
    ("UNION PAC", "Union"),
    ("POLITICAL CMTE", "Political Committee"),
    ("POLITICAL PARTY CMTE", "Political Committee"),
    ("POLITICAL CLUB", "Political Committee"),
    ("TRADE ASSOCIATION PAC", "Corporate"),
    ("IDEOLOGICAL ASSOC/ PAC", "Interest Group"),
    ("INTEREST", "Interest Group"),
    ("CANDIDATE COMMITTEE", "Candidate"),
    ("MISC/ OTHER", "Other"),
    ("NOT PROVIDED", "Unknown"),
    ("P2P_INDIVIDUAL", "Individual"),
    ("P2P_CORPORATE", "Corporate"),
];

fn business_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(LLC|INC|PC|CORP|CORPORATION|L\.L\.C\.|L\.P\.|LP)\b")
            .expect("business keyword pattern is valid")
    })
}

pub fn group_for_type(contributor_type: &str) -> &'static str {
    let key = contributor_type.trim().to_uppercase();
    TYPE_MAPPING
        .iter()
        .find(|(t, _)| *t == key)
        .map(|(_, g)| *g)
        .unwrap_or("Other")
}

fn individual_by_size(amount: f64) -> &'static str {
    if amount > LARGE_INDIVIDUAL_THRESHOLD {
        "Individual - Large"
    } else {
        "Individual - Small"
    }
}

/// Group for an ELEC contribution row.
pub fn classify_elec(contributor_type: &str, amount: f64) -> String {
    match group_for_type(contributor_type) {
        "Individual" => individual_by_size(amount).to_string(),
        other => other.to_string(),
    }
}

pub fn is_business_name(name: &str) -> bool {
    business_pattern().is_match(name)
}

/// Group for a pay-to-play row, which carries no contributor type.
pub fn classify_p2p(contributor_name: &str, aggregate_amount: f64) -> String {
    if is_business_name(contributor_name) {
        "Corporate".to_string()
    } else {
        individual_by_size(aggregate_amount).to_string()
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|v| !v.is_empty())
}

/// "First Last" when either part is present, else the business name,
/// else "Unknown".
pub fn contributor_name(first: Option<&str>, last: Option<&str>, business: Option<&str>) -> String {
    let first = non_blank(first);
    let last = non_blank(last);
    if first.is_some() || last.is_some() {
        return format!("{} {}", first.unwrap_or(""), last.unwrap_or(""))
            .trim()
            .to_string();
    }
    non_blank(business).unwrap_or("Unknown").to_string()
}

fn normalize_person(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Whether a pay-to-play recipient name refers to the given candidate.
pub fn recipient_matches(recipient: &str, first: &str, last: &str) -> bool {
    let name = normalize_person(recipient);
    let first = normalize_person(first);
    let last = normalize_person(last);
    if name.is_empty() || last.is_empty() {
        return false;
    }
    if name.contains(&first) && name.contains(&last) {
        return true;
    }
    ratio(&format!("{first} {last}"), &name) >= RECIPIENT_SIMILARITY
}
