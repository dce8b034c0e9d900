use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::{json, Value};
use sgsearch_auth::Credential;
use sgsearch_config::Location;

use crate::types::*;
use crate::{Result, SearchError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const SEARCH_DOCUMENT: &str = r#"query Search($query: String!, $patternType: SearchPatternType) {
  search(query: $query, version: V2, patternType: $patternType) {
    results {
      results {
        __typename
        ... on FileMatch {
          repository { name }
          file { name path content }
          lineMatches { preview lineNumber offsetAndLengths }
        }
        ... on Repository { name }
      }
    }
  }
}"#;

/// Executes one search against the remote service and returns its raw result list.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, query: &SearchQuery) -> Result<Vec<RawResult>>;
}

pub struct GraphQlTransport {
    client: reqwest::Client,
    endpoint: String,
    credential: Option<Credential>,
}

impl GraphQlTransport {
    pub fn new(location: &Location, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(concat!("sgsearch/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            endpoint: location.graphql_url(),
            credential: Credential::from_location(location),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    fn request(&self, body: &Value) -> reqwest::RequestBuilder {
        let mut req = self.client.post(&self.endpoint).json(body);
        if let Some(cred) = &self.credential {
            req = req.header(AUTHORIZATION, cred.header_value());
        }
        req
    }

    fn transport_error(&self, source: reqwest::Error) -> SearchError {
        SearchError::Transport {
            url: self.endpoint.clone(),
            source,
        }
    }
}

#[async_trait]
impl Transport for GraphQlTransport {
    async fn execute(&self, query: &SearchQuery) -> Result<Vec<RawResult>> {
        let body = json!({
            "query": SEARCH_DOCUMENT,
            "variables": {
                "query": query.dispatched_query(),
                "patternType": query.pattern_type,
            },
        });

        let resp = self
            .request(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(SearchError::from_http(status.as_u16(), text));
        }

        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        decode_response(&text)
    }
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Deserialize)]
struct GraphQlErrorEntry {
    message: String,
}

#[derive(Deserialize)]
struct ResponseData {
    #[serde(default)]
    search: Option<SearchPayload>,
}

#[derive(Deserialize)]
struct SearchPayload {
    results: ResultsPayload,
}

#[derive(Deserialize)]
struct ResultsPayload {
    results: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFileMatch {
    repository: WireRepository,
    file: WireFile,
    #[serde(default)]
    line_matches: Vec<WireLineMatch>,
}

#[derive(Deserialize)]
struct WireRepository {
    name: String,
}

#[derive(Deserialize)]
struct WireFile {
    name: String,
    path: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireLineMatch {
    preview: String,
    line_number: u32,
    #[serde(default)]
    offset_and_lengths: Vec<(u32, u32)>,
}

impl From<WireFileMatch> for FileMatch {
    fn from(wire: WireFileMatch) -> Self {
        FileMatch {
            repository: wire.repository.name,
            file_name: wire.file.name,
            path: wire.file.path,
            content: wire.file.content.unwrap_or_default(),
            line_matches: wire
                .line_matches
                .into_iter()
                .map(|line| LineMatch {
                    line_number: line.line_number,
                    preview: line.preview,
                    offset_and_lengths: line
                        .offset_and_lengths
                        .into_iter()
                        .map(|(offset, length)| OffsetAndLength::new(offset, length))
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Decodes a GraphQL search response body. Any GraphQL error, a missing payload,
/// or a single unrecognized result type fails the whole response.
pub fn decode_response(body: &str) -> Result<Vec<RawResult>> {
    let response: GraphQlResponse = serde_json::from_str(body)
        .map_err(|e| SearchError::Deserialization(e.to_string()))?;

    if !response.errors.is_empty() {
        let messages: Vec<String> = response.errors.into_iter().map(|e| e.message).collect();
        tracing::warn!(errors = ?messages, "Search returned GraphQL errors");
        return Err(SearchError::GraphQl(messages));
    }

    let results = response
        .data
        .and_then(|d| d.search)
        .map(|s| s.results.results)
        .ok_or(SearchError::MissingData)?;

    results.into_iter().map(decode_result).collect()
}

fn decode_result(value: Value) -> Result<RawResult> {
    let typename = value
        .get("__typename")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    match typename.as_str() {
        "FileMatch" => serde_json::from_value::<WireFileMatch>(value)
            .map(|m| RawResult::FileMatch(m.into()))
            .map_err(|e| SearchError::Deserialization(format!("FileMatch: {e}"))),
        "Repository" => serde_json::from_value::<WireRepository>(value)
            .map(|r| RawResult::RepositoryMatch(RepositoryMatch { name: r.name }))
            .map_err(|e| SearchError::Deserialization(format!("Repository: {e}"))),
        _ => Err(SearchError::UnrecognizedResultVariant(typename)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgsearch_config::AuthScheme;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_body(results: Value) -> Value {
        json!({"data": {"search": {"results": {"results": results}}}})
    }

    fn sample_results() -> Value {
        json!([
            {
                "__typename": "FileMatch",
                "repository": {"name": "github.com/acme/widgets"},
                "file": {"name": "main.go", "path": "cmd/main.go", "content": "package main\n"},
                "lineMatches": [
                    {"preview": "func foo() {}", "lineNumber": 10, "offsetAndLengths": [[5, 3]]},
                    {"preview": "foo()", "lineNumber": 20, "offsetAndLengths": []}
                ]
            },
            {"__typename": "Repository", "name": "github.com/acme/foo"}
        ])
    }

    #[test]
    fn decodes_both_variants_in_order() {
        let body = search_body(sample_results()).to_string();
        let raw = decode_response(&body).unwrap();
        assert_eq!(raw.len(), 2);
        match &raw[0] {
            RawResult::FileMatch(m) => {
                assert_eq!(m.repository, "github.com/acme/widgets");
                assert_eq!(m.file_name, "main.go");
                assert_eq!(m.path, "cmd/main.go");
                assert_eq!(m.line_matches.len(), 2);
                assert_eq!(
                    m.line_matches[0].offset_and_lengths,
                    vec![OffsetAndLength::new(5, 3)]
                );
                assert!(m.line_matches[1].offset_and_lengths.is_empty());
            }
            other => panic!("expected file match, got {other:?}"),
        }
        assert_eq!(
            raw[1],
            RawResult::RepositoryMatch(RepositoryMatch {
                name: "github.com/acme/foo".into()
            })
        );
    }

    #[test]
    fn null_content_decodes_as_empty() {
        let body = search_body(json!([{
            "__typename": "FileMatch",
            "repository": {"name": "r"},
            "file": {"name": "a", "path": "a", "content": null},
            "lineMatches": []
        }]))
        .to_string();
        match &decode_response(&body).unwrap()[0] {
            RawResult::FileMatch(m) => assert!(m.content.is_empty()),
            other => panic!("expected file match, got {other:?}"),
        }
    }

    #[test]
    fn unknown_typename_fails_whole_response() {
        let body = search_body(json!([
            {"__typename": "Repository", "name": "ok/repo"},
            {"__typename": "CommitSearchResult"}
        ]))
        .to_string();
        let err = decode_response(&body).unwrap_err();
        assert!(
            matches!(&err, SearchError::UnrecognizedResultVariant(t) if t == "CommitSearchResult")
        );
        assert!(err.is_contract_violation());
    }

    #[test]
    fn graphql_errors_are_surfaced() {
        let body = json!({"data": null, "errors": [{"message": "invalid query"}]}).to_string();
        let err = decode_response(&body).unwrap_err();
        assert!(matches!(&err, SearchError::GraphQl(m) if m == &vec!["invalid query".to_string()]));
    }

    #[test]
    fn missing_data_is_an_error() {
        assert!(matches!(
            decode_response(r#"{"data": null}"#),
            Err(SearchError::MissingData)
        ));
        assert!(matches!(
            decode_response(r#"{"data": {"search": null}}"#),
            Err(SearchError::MissingData)
        ));
    }

    #[test]
    fn malformed_body_is_deserialization_error() {
        assert!(matches!(
            decode_response("<html>bad gateway</html>"),
            Err(SearchError::Deserialization(_))
        ));
    }

    #[tokio::test]
    async fn sends_query_variables_and_token_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/.api/graphql"))
            .and(header("Authorization", "token sgp_test"))
            .and(body_partial_json(json!({
                "variables": {"query": "foo case:yes", "patternType": "literal"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(sample_results())))
            .expect(1)
            .mount(&mock_server)
            .await;

        let location = Location::new(mock_server.uri()).with_token("sgp_test", AuthScheme::Token);
        let transport = GraphQlTransport::new(&location, DEFAULT_TIMEOUT);
        assert!(transport.is_authenticated());

        let query = SearchQuery::literal("foo").with_case_sensitive(true);
        let raw = transport.execute(&query).await.unwrap();
        assert_eq!(raw.len(), 2);
    }

    #[tokio::test]
    async fn anonymous_location_sends_no_authorization() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/.api/graphql"))
            .and(body_partial_json(json!({"variables": {"patternType": "structural"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!([]))))
            .mount(&mock_server)
            .await;

        let location = Location::new(mock_server.uri());
        let transport = GraphQlTransport::new(&location, DEFAULT_TIMEOUT);
        let raw = transport
            .execute(&SearchQuery::new("fmt.Println(:[x])", PatternType::Structural))
            .await
            .unwrap();
        assert!(raw.is_empty());

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn bearer_scheme_header() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!([]))))
            .expect(1)
            .mount(&mock_server)
            .await;

        let location = Location::new(mock_server.uri()).with_token("abc", AuthScheme::Bearer);
        let transport = GraphQlTransport::new(&location, DEFAULT_TIMEOUT);
        transport.execute(&SearchQuery::literal("x")).await.unwrap();
    }

    #[tokio::test]
    async fn http_status_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"errors": [{"message": "Invalid access token."}]})),
            )
            .mount(&mock_server)
            .await;

        let location = Location::new(mock_server.uri());
        let transport = GraphQlTransport::new(&location, DEFAULT_TIMEOUT);
        let err = transport
            .execute(&SearchQuery::literal("x"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("Invalid access token."));
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let location = Location::new(format!("http://127.0.0.1:{port}"));
        let transport = GraphQlTransport::new(&location, Duration::from_secs(5));
        let err = transport
            .execute(&SearchQuery::literal("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Transport { .. }), "got {err:?}");
    }
}
