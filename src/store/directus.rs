//! Directus REST implementation of [`DealStore`].

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use super::wire::{
    Envelope, WireAccount, WireDeal, WireErrors, WirePerson, WireStage, WireStageUpdate,
    ACCOUNT_FIELDS, DEAL_FIELDS, OWNER_FIELDS, STAGE_FIELDS,
};
use super::{DealQuery, DealStore, StageAssignment};
use crate::config::BackendConfig;
use crate::error::StoreError;
use crate::models::{AccountRef, Deal, PersonRef, Stage};

pub(crate) const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;

const DEALS_COLLECTION: &str = "deals";
const STAGES_COLLECTION: &str = "deal_stages";
const ACCOUNTS_COLLECTION: &str = "accounts";

/// Blocking Directus client authenticated with a static token.
pub struct DirectusStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl DirectusStore {
    pub fn new(config: &BackendConfig) -> Result<Self, StoreError> {
        let url = config.url.as_deref().ok_or_else(|| {
            StoreError::InvalidInput("backend URL is not configured".to_string())
        })?;

        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("dealboard/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn items_url(&self, collection: &str) -> String {
        format!("{}/items/{collection}", self.base_url)
    }

    pub(crate) fn item_url(&self, collection: &str, id: &str) -> String {
        format!("{}/items/{collection}/{id}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn get_list<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
        what: &str,
    ) -> Result<Vec<T>, StoreError> {
        let url = Url::parse_with_params(url, params)
            .map_err(|e| StoreError::InvalidInput(format!("bad backend URL: {e}")))?;
        debug!(%url, "GET");
        let response = self.authorized(self.client.get(url)).send()?;
        let response = check_status(response, what, None)?;
        decode::<Vec<T>>(response, what)
    }
}

/// Build the query string for a deals read.
pub(crate) fn deal_query_params(query: &DealQuery) -> Vec<(String, String)> {
    let mut params = vec![
        ("fields".to_string(), DEAL_FIELDS.join(",")),
        ("sort".to_string(), query.sort.clone()),
        ("limit".to_string(), limit_param(query.limit)),
    ];
    let filters = [
        ("owner", &query.owner),
        ("account", &query.account),
        ("stage", &query.stage),
    ];
    for (field, value) in filters {
        if let Some(value) = value {
            params.push((format!("filter[{field}][_eq]"), value.clone()));
        }
    }
    params
}

fn limit_param(limit: Option<usize>) -> String {
    limit.map_or_else(|| "-1".to_string(), |n| n.to_string())
}

/// Map a non-success response onto a [`StoreError`].
fn check_status(
    response: Response,
    what: &str,
    id: Option<&str>,
) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<WireErrors>(&body)
        .ok()
        .and_then(|e| e.first_message().map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound {
            collection: what.to_string(),
            id: id.unwrap_or_default().to_string(),
        });
    }
    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, StoreError> {
    let body = response.text()?;
    decode_body(&body, what)
}

fn decode_body<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, StoreError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| StoreError::Decode {
            what: what.to_string(),
            message: e.to_string(),
        })
}

impl DealStore for DirectusStore {
    fn fetch_stages(&self) -> Result<Vec<Stage>, StoreError> {
        let params = vec![
            ("fields".to_string(), STAGE_FIELDS.join(",")),
            ("sort".to_string(), "sort,key".to_string()),
            ("limit".to_string(), limit_param(None)),
        ];
        let stages: Vec<WireStage> =
            self.get_list(&self.items_url(STAGES_COLLECTION), &params, "stages")?;
        Ok(stages.into_iter().map(Stage::from).collect())
    }

    fn fetch_deals(&self, query: &DealQuery) -> Result<Vec<Deal>, StoreError> {
        let params = deal_query_params(query);
        let deals: Vec<WireDeal> =
            self.get_list(&self.items_url(DEALS_COLLECTION), &params, "deals")?;
        Ok(deals.into_iter().map(Deal::from).collect())
    }

    fn fetch_owners(&self) -> Result<Vec<PersonRef>, StoreError> {
        let params = vec![
            ("fields".to_string(), OWNER_FIELDS.join(",")),
            ("filter[status][_eq]".to_string(), "active".to_string()),
            ("limit".to_string(), limit_param(None)),
        ];
        let url = format!("{}/users", self.base_url);
        let users: Vec<WirePerson> = self.get_list(&url, &params, "users")?;
        Ok(users.into_iter().map(PersonRef::from).collect())
    }

    fn fetch_accounts(&self) -> Result<Vec<AccountRef>, StoreError> {
        let params = vec![
            ("fields".to_string(), ACCOUNT_FIELDS.join(",")),
            ("sort".to_string(), "name".to_string()),
            ("limit".to_string(), limit_param(None)),
        ];
        let accounts: Vec<WireAccount> =
            self.get_list(&self.items_url(ACCOUNTS_COLLECTION), &params, "accounts")?;
        Ok(accounts.into_iter().map(AccountRef::from).collect())
    }

    fn update_deal_stage(
        &self,
        deal_id: &str,
        stage_id: &str,
    ) -> Result<StageAssignment, StoreError> {
        if stage_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("stage is required".to_string()));
        }

        let url = self.item_url(DEALS_COLLECTION, deal_id);
        info!(deal_id, stage_id, "PATCH deal stage");
        let response = self
            .authorized(self.client.patch(&url).json(&json!({ "stage": stage_id })))
            .send()?;
        let response = check_status(response, "deal", Some(deal_id))?;

        // Without read access on the item Directus answers 204 with no body.
        let requested = StageAssignment {
            deal_id: deal_id.to_string(),
            stage_id: stage_id.to_string(),
        };
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(requested);
        }
        let body = response.text()?;
        if body.trim().is_empty() {
            return Ok(requested);
        }
        let updated: WireStageUpdate = decode_body(&body, "deal")?;

        let confirmed_id = updated.id.clone().into_string();
        let confirmed_stage = updated.stage_id().unwrap_or_else(|| stage_id.to_string());
        Ok(StageAssignment {
            deal_id: confirmed_id,
            stage_id: confirmed_stage,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use super::*;

    /// Answer a single request with `response` and hand back the raw request.
    fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Should bind");
        let url = format!("http://{}", listener.local_addr().expect("Should have addr"));
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("Should accept");
            let request = read_request(&mut stream);
            stream
                .write_all(response.as_bytes())
                .expect("Should write response");
            request
        });
        (url, handle)
    }

    fn read_request(stream: &mut impl Read) -> String {
        let mut raw = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).expect("Should read");
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&raw);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&raw).into_owned()
    }

    fn local_store(url: String) -> DirectusStore {
        DirectusStore::new(&BackendConfig {
            url: Some(url),
            token: Some("secret".to_string()),
            timeout_secs: Some(5),
        })
        .expect("Should build client")
    }

    fn store() -> DirectusStore {
        DirectusStore::new(&BackendConfig {
            url: Some("https://crm.example.com/".to_string()),
            token: Some("secret".to_string()),
            timeout_secs: None,
        })
        .expect("client builds")
    }

    #[test]
    fn test_new_requires_url() {
        let result = DirectusStore::new(&BackendConfig::default());
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let store = store();
        assert_eq!(store.base_url(), "https://crm.example.com");
        assert_eq!(
            store.items_url("deals"),
            "https://crm.example.com/items/deals"
        );
        assert_eq!(
            store.item_url("deals", "d1"),
            "https://crm.example.com/items/deals/d1"
        );
    }

    #[test]
    fn test_deal_query_params_default() {
        let params = deal_query_params(&DealQuery::default());
        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("sort"), Some("-date_created"));
        assert_eq!(get("limit"), Some("-1"));
        assert!(get("fields").is_some_and(|f| f.contains("stage.id")));
        assert!(params.iter().all(|(k, _)| !k.starts_with("filter")));
    }

    #[test]
    fn test_deal_query_params_with_filters() {
        let query = DealQuery {
            owner: Some("u1".to_string()),
            stage: Some("s2".to_string()),
            limit: Some(50),
            ..DealQuery::default()
        };
        let params = deal_query_params(&query);
        assert!(params.contains(&("filter[owner][_eq]".to_string(), "u1".to_string())));
        assert!(params.contains(&("filter[stage][_eq]".to_string(), "s2".to_string())));
        assert!(params.contains(&("limit".to_string(), "50".to_string())));
        assert!(!params.iter().any(|(k, _)| k == "filter[account][_eq]"));
    }

    #[test]
    fn test_empty_stage_is_rejected_before_sending() {
        let result = store().update_deal_stage("d1", "  ");
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
    }

    #[test]
    fn test_update_with_no_content_is_success() {
        let (url, server) = serve_once("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n");

        let assignment = local_store(url)
            .update_deal_stage("d1", "s2")
            .expect("Should accept an empty success response");

        assert_eq!(assignment.deal_id, "d1");
        assert_eq!(assignment.stage_id, "s2");
        let request = server.join().expect("Server thread should finish");
        assert!(request.starts_with("PATCH /items/deals/d1 "));
        assert!(request.contains(r#""stage":"s2""#));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer secret"));
    }

    #[test]
    fn test_update_reads_confirmed_stage() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 33\r\nConnection: close\r\n\r\n{\"data\":{\"id\":\"d1\",\"stage\":\"s2\"}}",
        );

        let assignment = local_store(url)
            .update_deal_stage("d1", "s2")
            .expect("Should decode the updated item");

        assert_eq!(assignment.stage_id, "s2");
        server.join().expect("Server thread should finish");
    }

    #[test]
    fn test_update_rejected_status_is_an_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 403 Forbidden\r\nContent-Type: application/json\r\nContent-Length: 48\r\nConnection: close\r\n\r\n{\"errors\":[{\"message\":\"You don't have access\"}]}",
        );

        let result = local_store(url).update_deal_stage("d1", "s2");

        match result {
            Err(StoreError::Status { status, message }) => {
                assert_eq!(status, 403);
                assert_eq!(message, "You don't have access");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
        server.join().expect("Server thread should finish");
    }
}
