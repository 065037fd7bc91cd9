//! Donor search widget.
//!
//! The widget owns one [`SearchState`] and a request counter. Every request
//! it issues is described by a [`Ticket`] carrying a sequence number; the
//! caller performs the lookup (on any thread, through any
//! [`SearchTransport`]) and hands the reply back with [`DonorSearch::resolve`].
//! Replies for anything but the most recent ticket are dropped, so a slow
//! earlier search can never overwrite a later one.

use crate::models::{DonorRecord, SearchOutcome, SearchResponse};

pub const SEARCHING: &str = "Searching...";
pub const LOADING_HISTORY: &str = "Loading donor history...";
pub const NOT_FOUND: &str = "This person or business cannot be found.";
pub const SEARCH_FAILED: &str = "Search failed, please try again.";
pub const NO_HISTORY: &str = "No donation history found for this donor.";
pub const HISTORY_FAILED: &str = "Failed to load donor history.";

/// What came back from one lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Response(SearchResponse),
    /// Valid JSON that is not a search response.
    Unrecognized,
    /// Connection failure or a body that is not JSON.
    Failed(String),
}

/// Something that can run a donor lookup for a candidate. Implementations
/// must not retry or reinterpret the server's answer.
pub trait SearchTransport: Send + Sync {
    fn search_donor(&self, candidate: &str, query: &str) -> Reply;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Free-text submit; may fall back to suggestions.
    Submit,
    /// Exact lookup of a chosen suggestion; never offers suggestions again.
    Suggestion,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchState {
    Idle,
    Searching(RequestKind),
    Found(Vec<DonorRecord>),
    Suggestions(Vec<String>),
    NotFound(&'static str),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub kind: RequestKind,
    pub query: String,
}

#[derive(Debug)]
pub struct DonorSearch {
    candidate: String,
    input: String,
    state: SearchState,
    latest: u64,
}

impl DonorSearch {
    pub fn new(candidate: &str) -> Self {
        Self {
            candidate: candidate.to_string(),
            input: String::new(),
            state: SearchState::Idle,
            latest: 0,
        }
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SearchState::Searching(_))
    }

    /// Status line shown under the search box, if any.
    pub fn status_line(&self) -> Option<&str> {
        match &self.state {
            SearchState::Searching(RequestKind::Submit) => Some(SEARCHING),
            SearchState::Searching(RequestKind::Suggestion) => Some(LOADING_HISTORY),
            SearchState::NotFound(msg) => Some(*msg),
            SearchState::Error(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    pub fn history(&self) -> &[DonorRecord] {
        match &self.state {
            SearchState::Found(records) => records.as_slice(),
            _ => &[],
        }
    }

    pub fn suggestions(&self) -> &[String] {
        match &self.state {
            SearchState::Suggestions(names) => names.as_slice(),
            _ => &[],
        }
    }

    fn issue(&mut self, kind: RequestKind, query: String) -> Ticket {
        self.latest += 1;
        self.state = SearchState::Searching(kind);
        Ticket {
            seq: self.latest,
            kind,
            query,
        }
    }

    /// Submit the current input. A blank input clears everything and issues
    /// nothing; in-flight replies are invalidated either way.
    pub fn submit(&mut self) -> Option<Ticket> {
        let query = self.input.trim().to_string();
        if query.is_empty() {
            self.latest += 1;
            self.state = SearchState::Idle;
            return None;
        }
        Some(self.issue(RequestKind::Submit, query))
    }

    /// Replace the input and submit it.
    pub fn submit_query(&mut self, query: &str) -> Option<Ticket> {
        self.set_input(query);
        self.submit()
    }

    /// Follow a suggestion: the name becomes the input and is looked up as is.
    pub fn select_suggestion(&mut self, name: &str) -> Ticket {
        self.set_input(name);
        self.issue(RequestKind::Suggestion, name.to_string())
    }

    /// Apply a reply. Returns false, leaving the state untouched, when the
    /// ticket is not the latest one issued.
    pub fn resolve(&mut self, ticket: &Ticket, reply: Reply) -> bool {
        if ticket.seq != self.latest {
            tracing::debug!(seq = ticket.seq, latest = self.latest, "dropping stale search reply");
            return false;
        }
        self.state = match ticket.kind {
            RequestKind::Submit => submit_outcome(reply),
            RequestKind::Suggestion => suggestion_outcome(reply),
        };
        true
    }

    /// Issue and resolve in one step on the calling thread.
    pub fn run(&mut self, ticket: Option<Ticket>, transport: &dyn SearchTransport) {
        if let Some(ticket) = ticket {
            let reply = transport.search_donor(&self.candidate, &ticket.query);
            self.resolve(&ticket, reply);
        }
    }
}

fn submit_outcome(reply: Reply) -> SearchState {
    match reply {
        Reply::Response(SearchResponse::Error { error }) => SearchState::Error(error),
        Reply::Response(SearchResponse::Outcome(SearchOutcome::Found { records, .. })) => {
            SearchState::Found(records)
        }
        Reply::Response(SearchResponse::Outcome(SearchOutcome::NotFound { suggestions, .. }))
            if !suggestions.is_empty() =>
        {
            SearchState::Suggestions(suggestions)
        }
        Reply::Response(_) | Reply::Unrecognized => SearchState::NotFound(NOT_FOUND),
        Reply::Failed(reason) => {
            tracing::warn!(%reason, "donor search failed");
            SearchState::Error(SEARCH_FAILED.to_string())
        }
    }
}

fn suggestion_outcome(reply: Reply) -> SearchState {
    match reply {
        Reply::Response(SearchResponse::Outcome(SearchOutcome::Found { records, .. })) => {
            SearchState::Found(records)
        }
        Reply::Failed(reason) => {
            tracing::warn!(%reason, "donor history lookup failed");
            SearchState::Error(HISTORY_FAILED.to_string())
        }
        _ => SearchState::NotFound(NO_HISTORY),
    }
}
