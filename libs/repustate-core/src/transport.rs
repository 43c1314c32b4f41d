use crate::config::Config;
use crate::{CoreError, Result, USER_AGENT};
use repustate_protocol::{
    decode_body, decode_body_or_default, Endpoint, DEMO_BASE_PATH, IndexParams, IndexRequest, IndexResult,
    Method, RegisterRequest, SearchParams, SearchResult, ACCEPT_JSON,
};
use reqwest::header::ACCEPT;
use reqwest::{Request, RequestBuilder, StatusCode, Url};
use tracing::debug;

/// Client for the demo endpoints. Every method sends one request and waits
/// for the full response. Nothing is retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    base_path: String,
}

impl ApiClient {
    pub fn new(base: Url) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base,
            base_path: DEMO_BASE_PATH.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.server_url()?)?.with_base_path(&config.base_path))
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.to_string();
        self
    }

    pub fn endpoint_url(&self, endpoint: Endpoint) -> Result<Url> {
        self.base
            .join(&endpoint.path_under(&self.base_path))
            .map_err(|e| CoreError::BadServerUrl(e.to_string()))
    }

    fn builder(&self, endpoint: Endpoint) -> Result<RequestBuilder> {
        let url = self.endpoint_url(endpoint)?;
        let method = match endpoint.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        Ok(self.http.request(method, url).header(ACCEPT, ACCEPT_JSON))
    }

    pub fn register_request(&self, username: &str) -> Result<Request> {
        let body = RegisterRequest {
            username: username.to_string(),
        };
        Ok(self.builder(Endpoint::Register)?.json(&body).build()?)
    }

    pub fn index_request(&self, text: &str, lang: Option<&str>, username: &str) -> Result<Request> {
        let body = IndexRequest {
            username: username.to_string(),
            text: text.to_string(),
        };
        let params = IndexParams {
            lang: lang.map(str::to_string),
        };
        Ok(self
            .builder(Endpoint::Index)?
            .query(&params)
            .json(&body)
            .build()?)
    }

    pub fn search_request(&self, query: &str, lang: Option<&str>, username: &str) -> Result<Request> {
        let params = SearchParams {
            username: username.to_string(),
            query: query.to_string(),
            lang: lang.map(str::to_string),
        };
        Ok(self.builder(Endpoint::Search)?.query(&params).build()?)
    }

    pub async fn register(&self, username: &str) -> Result<()> {
        let request = self.register_request(username)?;
        self.send(request).await?;
        Ok(())
    }

    pub async fn index(&self, text: &str, lang: Option<&str>, username: &str) -> Result<IndexResult> {
        let request = self.index_request(text, lang, username)?;
        let body = self.send(request).await?;
        Ok(decode_body_or_default(&body)?)
    }

    pub async fn search(&self, query: &str, lang: Option<&str>, username: &str) -> Result<SearchResult> {
        let request = self.search_request(query, lang, username)?;
        let body = self.send(request).await?;
        Ok(decode_body(&body)?)
    }

    async fn send(&self, request: Request) -> Result<Vec<u8>> {
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let response = self.http.execute(request).await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(status = status.as_u16(), bytes = body.len(), "received response");

        if status != StatusCode::OK {
            return Err(CoreError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).trim().to_string(),
            });
        }

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve_once;
    use pretty_assertions::assert_eq;
    use reqwest::header::CONTENT_TYPE;
    use std::collections::HashMap;
    use std::io::Write;

    fn client() -> ApiClient {
        ApiClient::new(Url::parse("http://localhost:9000/").unwrap()).unwrap()
    }

    fn query_pairs(request: &Request) -> HashMap<String, String> {
        request.url().query_pairs().into_owned().collect()
    }

    fn json_body(request: &Request) -> serde_json::Value {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        serde_json::from_slice(bytes).unwrap()
    }

    #[test]
    fn test_register_request() {
        let request = client().register_request("alice").unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "http://localhost:9000/demo/register");
        assert_eq!(request.headers()[ACCEPT], ACCEPT_JSON);
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(json_body(&request), serde_json::json!({"username": "alice"}));
    }

    #[test]
    fn test_index_request_lang_in_query() {
        let request = client().index_request("Paris is nice", Some("fr"), "alice").unwrap();

        assert_eq!(request.url().path(), "/demo/index");
        assert_eq!(query_pairs(&request).get("lang").map(String::as_str), Some("fr"));
        assert_eq!(
            json_body(&request),
            serde_json::json!({"username": "alice", "text": "Paris is nice"})
        );

        let request = client().index_request("Paris is nice", None, "alice").unwrap();
        assert!(query_pairs(&request).is_empty());
    }

    #[test]
    fn test_search_request() {
        let request = client()
            .search_request("sentiment:pos AND theme:sports", None, "alice")
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/demo/search");
        assert!(request.body().is_none());

        let pairs = query_pairs(&request);
        assert_eq!(pairs["username"], "alice");
        assert_eq!(pairs["query"], "sentiment:pos AND theme:sports");
        assert!(!pairs.contains_key("lang"));
    }

    #[test]
    fn test_endpoint_url_follows_configured_base_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server_url = \"http://localhost:9000/api\"").unwrap();
        writeln!(file, "base_path = \"v2/deepsearch\"").unwrap();
        let config = Config::load_from(file.path()).unwrap();

        let client = ApiClient::from_config(&config).unwrap();
        assert_eq!(
            client.endpoint_url(Endpoint::Search).unwrap().as_str(),
            "http://localhost:9000/api/v2/deepsearch/search"
        );

        let client = ApiClient::from_config(&Config::default()).unwrap();
        assert_eq!(
            client.endpoint_url(Endpoint::Index).unwrap().as_str(),
            "http://try.repustate.com:9000/demo/index"
        );
    }

    #[tokio::test]
    async fn test_search_round_trip() {
        let body = r#"{"total": 1, "matches": [{"text": "Go team", "entities": []}]}"#;
        let (base, server) = serve_once("200 OK", body).await;

        let client = ApiClient::new(base).unwrap();
        let res = client.search("theme:sports", None, "alice").await.unwrap();
        assert_eq!(res.total, 1);
        assert_eq!(res.documents[0].text, "Go team");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /demo/search?"));
    }

    #[tokio::test]
    async fn test_non_ok_status_is_an_error() {
        let (base, server) = serve_once("409 Conflict", "user exists").await;

        let client = ApiClient::new(base).unwrap();
        match client.register("alice").await {
            Err(CoreError::Status { status, body }) => {
                assert_eq!(status, 409);
                assert_eq!(body, "user exists");
            }
            other => panic!("expected status error, got {:?}", other),
        }

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /demo/register"));
        assert!(raw.contains(r#"{"username":"alice"}"#));
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let (base, _server) = serve_once("200 OK", "{\"total\": ").await;

        let client = ApiClient::new(base).unwrap();
        let err = client.search("theme:sports", None, "alice").await.unwrap_err();
        assert!(matches!(err, CoreError::Decode(_)));
    }

    #[tokio::test]
    async fn test_empty_index_body_is_accepted() {
        let (base, _server) = serve_once("200 OK", "").await;

        let client = ApiClient::new(base).unwrap();
        let res = client.index("Hello", None, "alice").await.unwrap();
        assert_eq!(res, IndexResult::default());
    }
}
