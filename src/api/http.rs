//! Blocking HTTP implementation of the LoadForge API (reqwest-based).

use crate::api::LoadForgeApi;
use crate::config::Settings;
use crate::error::{LfError, Result};
use crate::model::{HostCreated, HostSpec, JsonMap, RemoteHost, RemoteTest, RunResult};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::debug;

/// Longest error-body excerpt carried into an [`LfError::Api`].
const MAX_ERROR_BODY: usize = 512;

/// LoadForge client over reqwest's blocking API with bearer auth.
#[derive(Debug, Clone)]
pub struct HttpApi {
    http: Client,
    base_url: String,
}

impl HttpApi {
    /// Build a client from resolved settings.
    ///
    /// # Errors
    ///
    /// Fails when the API key is not a valid header value or the
    /// underlying client cannot be constructed.
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
            .map_err(|_| LfError::validation("API_KEY", "contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("lf-cli/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Map a non-success response to a status-carrying error.
    fn check(response: Response, endpoint: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut message = response.text().unwrap_or_default();
        if message.len() > MAX_ERROR_BODY {
            let mut end = MAX_ERROR_BODY;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }
        Err(LfError::Api {
            status: status.as_u16(),
            endpoint: endpoint.to_string(),
            message,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        debug!(endpoint, "GET");
        let response = self.http.get(self.url(endpoint)).send()?;
        Ok(Self::check(response, endpoint)?.json()?)
    }

    fn post_json<T: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<T> {
        debug!(endpoint, "POST");
        let response = self.http.post(self.url(endpoint)).json(body).send()?;
        Ok(Self::check(response, endpoint)?.json()?)
    }

    /// Fetch a list endpoint, enforcing the array contract before
    /// deserializing the elements.
    fn get_array<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let value: Value = self.get_json(endpoint)?;
        if !value.is_array() {
            return Err(LfError::Protocol {
                endpoint: endpoint.to_string(),
            });
        }
        Ok(serde_json::from_value(value)?)
    }
}

impl LoadForgeApi for HttpApi {
    fn list_tests(&self) -> Result<Vec<RemoteTest>> {
        self.get_array("/tests")
    }

    fn create_test(&self, payload: &JsonMap) -> Result<Value> {
        self.post_json("/tests", &Value::Object(payload.clone()))
    }

    fn update_test(&self, id: i64, payload: &JsonMap) -> Result<Value> {
        let endpoint = format!("/tests/{id}");
        debug!(endpoint = %endpoint, "PATCH");
        let response = self
            .http
            .patch(self.url(&endpoint))
            .json(&Value::Object(payload.clone()))
            .send()?;
        Ok(Self::check(response, &endpoint)?.json()?)
    }

    fn delete_test(&self, id: i64) -> Result<Value> {
        let endpoint = format!("/tests/{id}");
        debug!(endpoint = %endpoint, "DELETE");
        let response = self.http.delete(self.url(&endpoint)).send()?;
        // Delete responses are sometimes empty; treat that as null.
        let body = Self::check(response, &endpoint)?.text()?;
        Ok(serde_json::from_str(&body).unwrap_or(Value::Null))
    }

    fn list_hosts(&self) -> Result<Vec<RemoteHost>> {
        self.get_array("/hosts")
    }

    fn create_host(&self, spec: &HostSpec) -> Result<HostCreated> {
        self.post_json(
            "/hosts",
            &json!({
                "protocol": spec.protocol.as_str(),
                "url": spec.host,
                "port": spec.port,
            }),
        )
    }

    fn start_run(&self, test_id: i64, duration: u32) -> Result<Value> {
        self.post_json("/run", &json!({ "test_id": test_id, "duration": duration }))
    }

    fn get_result(&self, result_id: &str) -> Result<RunResult> {
        self.get_json(&format!("/result/{result_id}"))
    }
}
