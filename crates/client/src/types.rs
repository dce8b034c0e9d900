use serde::{Deserialize, Serialize};

pub use sgsearch_config::PatternType;

pub const CASE_SENSITIVE_TOKEN: &str = "case:yes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub pattern_type: PatternType,
    pub case_sensitive: bool,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, pattern_type: PatternType) -> Self {
        Self {
            query: query.into(),
            pattern_type,
            case_sensitive: false,
        }
    }

    pub fn literal(query: impl Into<String>) -> Self {
        Self::new(query, PatternType::Literal)
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// The query string as sent to the service. Case sensitivity only folds into
    /// literal queries, and the token is never duplicated.
    pub fn dispatched_query(&self) -> String {
        if self.pattern_type == PatternType::Literal
            && self.case_sensitive
            && !self.query.contains(CASE_SENSITIVE_TOKEN)
        {
            format!("{} {CASE_SENSITIVE_TOKEN}", self.query)
        } else {
            self.query.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetAndLength {
    pub offset: u32,
    pub length: u32,
}

impl OffsetAndLength {
    pub fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    pub line_number: u32,
    pub preview: String,
    pub offset_and_lengths: Vec<OffsetAndLength>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    pub repository: String,
    pub file_name: String,
    pub path: String,
    pub content: String,
    pub line_matches: Vec<LineMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMatch {
    pub name: String,
}

/// One entry of the service's result list, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawResult {
    FileMatch(FileMatch),
    RepositoryMatch(RepositoryMatch),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    File,
    Repository,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::File => "file",
            ResultKind::Repository => "repository",
        }
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat result record handed to the UI. File results carry one matching line each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_and_length: Option<OffsetAndLength>,
}

impl SearchResult {
    pub fn repository(name: impl Into<String>) -> Self {
        Self {
            kind: ResultKind::Repository,
            repo: name.into(),
            file: None,
            path: None,
            content: None,
            preview: None,
            line_number: None,
            offset_and_length: None,
        }
    }

    /// The highlighted slice of the preview, if the span lies within it.
    pub fn matched_text(&self) -> Option<&str> {
        let preview = self.preview.as_deref()?;
        let span = self.offset_and_length?;
        let start = span.offset as usize;
        let end = start.checked_add(span.length as usize)?;
        preview.get(start..end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Search {
    pub query: String,
    pub results: Vec<SearchResult>,
}

impl Search {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
