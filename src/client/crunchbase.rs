//! Crunchbase client module
//!
//! Provides `CrunchbaseClient` for the three endpoints the connector uses:
//! autocomplete search, single organization lookup and bulk organization search.

use super::Auth;
use crate::config::ConnectorConfig;
use crate::crunchbase::{
    AutocompleteResponse, LookupResponse, RawOrganization, SearchRequest, SearchResponse,
};
use crate::error::ConnectorError;
use eyre::Result;
use reqwest::{Client, RequestBuilder, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

pub const SEARCH_PATH: &str = "autocompletes";
pub const LOOKUP_PATH: &str = "entities/organizations";
pub const FULL_PATH: &str = "searches/organizations";

/// Fields requested from the lookup endpoint
pub const LOOKUP_FIELD_IDS: &[&str] = &[
    "name",
    "categories",
    "identifier",
    "permalink",
    "linkedin",
    "entity_def_id",
    "updated_at",
    "location_identifiers",
    "created_at",
    "website_url",
    "short_description",
];

/// Crunchbase client for making API requests.
///
/// Every request carries `accept: application/json`,
/// `Content-Type: application/json` and the credential header.
/// Requests are sent one at a time and never retried.
///
/// # Example
/// ```no_run
/// use crunchbase_connector::client::{Auth, CrunchbaseClient};
/// use url::Url;
///
/// # async fn example() -> eyre::Result<()> {
/// let url = Url::parse("https://api.crunchbase.com/api/v4/")?;
/// let client = CrunchbaseClient::try_new(url, Auth::Apikey("key".to_string()))?;
///
/// let record = client.lookup_organization("superside").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct CrunchbaseClient {
    client: Client,
    url: Url,
}

impl CrunchbaseClient {
    /// Create a new client from an API base URL and credential.
    ///
    /// # Errors
    /// Returns an error if the credential is not a valid header value
    /// or the HTTP client cannot be built
    pub fn try_new(url: Url, auth: Auth) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, "application/json".parse()?);
        headers.insert(header::CONTENT_TYPE, "application/json".parse()?);
        auth.apply(&mut headers)?;

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, url })
    }

    /// Create a client from the connector configuration
    pub fn from_config(config: &ConnectorConfig) -> Result<Self> {
        Self::try_new(config.api_url.clone(), Auth::Apikey(config.api_key.clone()))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let path_stripped = path.strip_prefix('/').unwrap_or(path);
        self.url.join(path_stripped).map_err(|e| {
            ConnectorError::Configuration(format!("Invalid endpoint path '{}': {}", path, e))
                .into()
        })
    }

    /// GET `path` with `query` parameters and decode the JSON body
    pub async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.get_url(self.endpoint(path)?, query).await
    }

    async fn get_url<T, Q>(&self, url: Url, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        log::debug!("GET {}", url);
        let request = self.client.get(url.clone()).query(query);
        self.send(request, &url).await
    }

    /// POST `body` as JSON to `path` with `query` parameters and decode the JSON body
    pub async fn post<T, Q, B>(&self, path: &str, query: &Q, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(path)?;
        log::debug!("POST {}", url);
        let request = self.client.post(url.clone()).query(query).json(body);
        self.send(request, &url).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, url: &Url) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| ConnectorError::transport(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                ConnectorError::transport(url.as_str(), format!("{}: {}", status, body)).into(),
            );
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ConnectorError::transport(url.as_str(), e))?;

        serde_json::from_slice(&bytes).map_err(|e| {
            ConnectorError::transport(url.as_str(), format!("Failed to decode response: {}", e))
                .into()
        })
    }

    /// Query the autocomplete endpoint for organizations named like `query`
    pub async fn autocomplete(
        &self,
        query: &str,
        collection_ids: &str,
        limit: usize,
    ) -> Result<AutocompleteResponse> {
        let limit = limit.to_string();
        let params = [
            ("query", query),
            ("collection_ids", collection_ids),
            ("limit", limit.as_str()),
        ];
        self.get(SEARCH_PATH, &params).await
    }

    /// Fetch the full record of one organization by permalink or UUID
    ///
    /// The record is read from `cards.fields` when present, otherwise from
    /// the top-level `fields`.
    ///
    /// The key is sent as a single, percent-encoded path segment.
    pub async fn lookup_organization(&self, entity_key: &str) -> Result<RawOrganization> {
        let mut url = self.endpoint(LOOKUP_PATH)?;
        url.path_segments_mut()
            .map_err(|_| {
                ConnectorError::Configuration(format!("Invalid API URL '{}'", self.url))
            })?
            .pop_if_empty()
            .push(entity_key);

        let field_ids = LOOKUP_FIELD_IDS.join(",");
        let params = [("field_ids", field_ids.as_str()), ("card_ids", "fields")];

        let response: LookupResponse = self.get_url(url, &params).await?;
        Ok(response.into_record()?)
    }

    /// Request one page of the ranked organization catalog
    pub async fn search_organizations(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let no_params: [(&str, &str); 0] = [];
        self.post(FULL_PATH, &no_params, request).await
    }
}

impl std::fmt::Display for CrunchbaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> CrunchbaseClient {
        let url = crate::config::parse_api_url(&server.uri()).unwrap();
        CrunchbaseClient::try_new(url, Auth::Apikey("test-key".to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_get_sends_fixed_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header("accept", "application/json"))
            .and(header("content-type", "application/json"))
            .and(header("x-cb-user-key", "test-key"))
            .and(query_param("a", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"key": "value"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let body: Value = client.get("/ping", &[("a", "1")]).await.unwrap();
        assert_eq!(body, json!({"key": "value"}));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(body_json(json!({"limit": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let no_params: [(&str, &str); 0] = [];
        let body: Value = client
            .post("echo", &no_params, &json!({"limit": 5}))
            .await
            .unwrap();
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.get::<Value, _>("ping", &[("a", "1")]).await.unwrap_err();
        let typed = ConnectorError::find(&err).unwrap();
        assert!(matches!(typed, ConnectorError::Transport { .. }));
        assert!(typed.to_string().contains("bad key"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.get::<Value, _>("ping", &[("a", "1")]).await.unwrap_err();
        assert!(matches!(
            ConnectorError::find(&err),
            Some(ConnectorError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn test_autocomplete_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/autocompletes"))
            .and(query_param("query", "Acme"))
            .and(query_param("collection_ids", "organization.companies"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "entities": [{"identifier": {"value": "Acme", "permalink": "acme", "uuid": "u-1"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let response = client
            .autocomplete("Acme", "organization.companies", 10)
            .await
            .unwrap();
        assert_eq!(response.entities.len(), 1);
    }

    #[tokio::test]
    async fn test_lookup_prefers_cards_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/entities/organizations/acme"))
            .and(query_param("card_ids", "fields"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cards": {"fields": {"short_description": "from cards"}},
                "fields": {"short_description": "top level"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let record = client.lookup_organization("acme").await.unwrap();
        assert_eq!(record.short_description.as_deref(), Some("from cards"));
    }

    #[tokio::test]
    async fn test_lookup_falls_back_to_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/entities/organizations/u-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fields": {"short_description": "top level"}
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let record = client.lookup_organization("u-1").await.unwrap();
        assert_eq!(record.short_description.as_deref(), Some("top level"));
    }

    #[tokio::test]
    async fn test_lookup_key_is_one_path_segment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/entities/organizations/a%2Fb%3Fc%23d"))
            .and(query_param("card_ids", "fields"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "fields": {"short_description": "escaped"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let record = client.lookup_organization("a/b?c#d").await.unwrap();
        assert_eq!(record.short_description.as_deref(), Some("escaped"));
    }

    #[tokio::test]
    async fn test_lookup_without_fields_is_missing_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"properties": {}})))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.lookup_organization("acme").await.unwrap_err();
        assert!(matches!(
            ConnectorError::find(&err),
            Some(ConnectorError::MissingField { field: "fields" })
        ));
    }
}
