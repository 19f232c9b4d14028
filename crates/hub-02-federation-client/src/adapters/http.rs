//! reqwest adapter for the WoM HTTP API.

use crate::domain::{
    AssetUpload, ConnectionRequest, DisconnectionRequest, FederationError, ReportSubmission,
    ERROR_RESPONSE_CODE,
};
use crate::ports::FederationClient;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared_types::{Address, HubIdentity, HubReport};
use std::time::Duration;
use tracing::{debug, warn};

/// Public WoM server.
pub const DEFAULT_WOM_URL: &str = "https://wom.meeds.io";

const HUBS_PATH: &str = "/api/hubs";
const REPORTS_PATH: &str = "/api/hub/reports";

/// HTTP client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederationClientConfig {
    /// WoM server base URL.
    pub base_url: String,
    /// Whole-request timeout.
    pub request_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl Default for FederationClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WOM_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message_key: Option<String>,
}

/// Federation client over HTTP.
pub struct HttpFederationClient {
    client: Client,
    base_url: String,
}

impl HttpFederationClient {
    /// Build a client for `config.base_url`.
    pub fn new(config: &FederationClientConfig) -> Result<Self, FederationError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| FederationError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Configured base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send `request`. `Ok(None)` only for a 404 when `missing_is_none`.
    async fn exchange(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        missing_is_none: bool,
    ) -> Result<Option<String>, FederationError> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(operation, e))?;

        debug!(operation, status = status.as_u16(), "[hub-02] WoM response");

        if status.is_success() {
            Ok(Some(body))
        } else if status == StatusCode::NOT_FOUND && missing_is_none {
            Ok(None)
        } else {
            let error = rejection(status, &body);
            warn!(operation, status = status.as_u16(), code = error.code(), "[hub-02] WoM request rejected");
            Err(error)
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Option<T>, FederationError> {
        match self.exchange(operation, request, true).await? {
            Some(body) => decode(&body).map(Some),
            None => Ok(None),
        }
    }

    async fn text(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<String, FederationError> {
        self.exchange(operation, request, false)
            .await
            .map(Option::unwrap_or_default)
    }
}

fn transport_error(operation: &'static str, error: reqwest::Error) -> FederationError {
    warn!(
        operation,
        timeout = error.is_timeout(),
        connect = error.is_connect(),
        "[hub-02] WoM server unreachable: {}",
        error
    );
    FederationError::Unavailable(error.to_string())
}

/// Error code of a non-2xx response.
fn rejection(status: StatusCode, body: &str) -> FederationError {
    let code = if body.contains("wom.") && body.contains('{') {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|error| error.message_key)
            .filter(|key| key.starts_with("wom."))
    } else {
        None
    };
    FederationError::Rejected {
        code: code.unwrap_or_else(|| ERROR_RESPONSE_CODE.to_string()),
        status: status.as_u16(),
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FederationError> {
    serde_json::from_str(body).map_err(|e| FederationError::InvalidResponse(e.to_string()))
}

/// Plain-text bodies may arrive JSON-quoted.
fn unquote(body: &str) -> &str {
    body.trim().trim_matches('"')
}

#[async_trait]
impl FederationClient for HttpFederationClient {
    async fn get_hub_by_address(
        &self,
        address: &Address,
    ) -> Result<Option<HubIdentity>, FederationError> {
        let url = self.url(&format!("{HUBS_PATH}/{address}"));
        self.fetch("get_hub", self.client.get(url)).await
    }

    async fn get_hub_by_deed_id(
        &self,
        deed_id: i64,
    ) -> Result<Option<HubIdentity>, FederationError> {
        let url = self.url(&format!("{HUBS_PATH}/byNftId/{deed_id}"));
        self.fetch("get_hub_by_deed", self.client.get(url)).await
    }

    async fn is_deed_manager(&self, address: &str, deed_id: i64) -> Result<bool, FederationError> {
        let request = self
            .client
            .get(self.url(&format!("{HUBS_PATH}/manager")))
            .query(&[("nftId", deed_id.to_string()), ("address", address.to_string())]);
        let body = self.text("is_deed_manager", request).await?;
        Ok(unquote(&body).eq_ignore_ascii_case("true"))
    }

    async fn generate_token(&self) -> Result<String, FederationError> {
        let request = self.client.get(self.url(&format!("{HUBS_PATH}/token")));
        let body = self.text("generate_token", request).await?;
        Ok(unquote(&body).to_string())
    }

    async fn connect(&self, request: &ConnectionRequest) -> Result<Address, FederationError> {
        let http = self.client.post(self.url(HUBS_PATH)).json(request);
        let body = self.text("connect", http).await?;
        match unquote(&body) {
            "" => request
                .address
                .ok_or_else(|| FederationError::InvalidResponse("empty connect response".into())),
            address => address
                .parse()
                .map_err(|e| FederationError::InvalidResponse(format!("hub address: {e}"))),
        }
    }

    async fn disconnect(&self, request: &DisconnectionRequest) -> Result<(), FederationError> {
        let http = self.client.delete(self.url(HUBS_PATH)).json(request);
        self.text("disconnect", http).await.map(|_| ())
    }

    async fn submit_report(
        &self,
        submission: &ReportSubmission,
    ) -> Result<HubReport, FederationError> {
        let http = self.client.post(self.url(REPORTS_PATH)).json(submission);
        let body = self.text("submit_report", http).await?;
        decode(&body)
    }

    async fn get_report_by_hash(&self, hash: &str) -> Result<Option<HubReport>, FederationError> {
        let url = self.url(&format!("{REPORTS_PATH}/{hash}"));
        self.fetch("get_report", self.client.get(url)).await
    }

    async fn upload_asset(&self, upload: AssetUpload) -> Result<(), FederationError> {
        let url = self.url(&format!(
            "{HUBS_PATH}/{}/{}",
            upload.hub_address,
            upload.kind.path_segment()
        ));
        let file = Part::bytes(upload.bytes).file_name(upload.kind.path_segment());
        let form = Form::new()
            .part("file", file)
            .text("hubAddress", upload.hub_address.to_hex())
            .text("signedMessage", upload.signed_message)
            .text("rawMessage", upload.raw_message)
            .text("token", upload.token);
        self.text("upload_asset", self.client.post(url).multipart(form))
            .await
            .map(|_| ())
    }
}
