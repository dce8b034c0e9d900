fn extract_error_message(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = v["errors"][0]["message"].as_str() {
            return msg.to_string();
        }
        if let Some(msg) = v["error"].as_str() {
            return msg.to_string();
        }
        if let Some(msg) = v["message"].as_str() {
            return msg.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.chars().count() > 200 {
        let cut: String = trimmed.chars().take(200).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{status}: {}", extract_error_message(body))]
    Http { status: u16, body: String },

    #[error("GraphQL error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("Response contained no search results payload")]
    MissingData,

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Unrecognized search result type '{0}'")]
    UnrecognizedResultVariant(String),
}

impl SearchError {
    pub fn from_http(status: u16, body: String) -> Self {
        Self::Http { status, body }
    }

    /// The service returned something outside the schema this client was built
    /// against. Not a transient condition.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::UnrecognizedResultVariant(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_prefers_graphql_message() {
        let err = SearchError::from_http(
            401,
            r#"{"errors":[{"message":"Invalid access token."}]}"#.into(),
        );
        assert_eq!(err.to_string(), "401: Invalid access token.");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn http_error_truncates_long_bodies() {
        let err = SearchError::from_http(502, "x".repeat(500));
        let msg = err.to_string();
        assert!(msg.starts_with("502: "));
        assert!(msg.ends_with("..."));
        assert!(msg.len() < 220);
    }

    #[test]
    fn only_unrecognized_variant_is_contract_violation() {
        assert!(SearchError::UnrecognizedResultVariant("CommitSearchResult".into())
            .is_contract_violation());
        assert!(!SearchError::MissingData.is_contract_violation());
        assert!(!SearchError::GraphQl(vec!["boom".into()]).is_contract_violation());
    }
}
