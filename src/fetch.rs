//! Paged datapoint retrieval and the loading state machine.
//!
//! The controller owns the only `TimeIndex` instance and replaces it
//! wholesale on every successful load. Retrieval itself sits behind the
//! `DatapointSource` trait so the state machine can be driven without a
//! network.
//!
//! Overlapping loads are resolved by request sequencing: each load is tagged
//! with a monotonically increasing token and a completion only applies if
//! its token is still the latest issued. A stale completion is discarded
//! without touching state.

use std::fmt;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::Config;
use crate::index::{Datapoint, TimeIndex};
use crate::logging::{json_log, obj, v_num, Level};

/// Loading state exposed to the presentation layer. A tagged variant rather
/// than sentinel constants, so an error always carries its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded,
    LoadingError { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 401 or 403. Suppressed from the visible error surface; a higher
    /// layer owns the redirect.
    AuthRequired { status: u16 },
    /// Any other non-2xx, with the best-effort decoded body.
    RetrievalFailure { status: u16, message: String },
    /// Response body was neither the expected JSON nor readable text.
    DecodeFailure { detail: String },
    /// The request never produced a response.
    Transport { detail: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::AuthRequired { status } => {
                write!(f, "authentication required (status {})", status)
            }
            FetchError::RetrievalFailure { status, message } => {
                write!(f, "retrieval failed (status {}): {}", status, message)
            }
            FetchError::DecodeFailure { detail } => write!(f, "undecodable response: {}", detail),
            FetchError::Transport { detail } => write!(f, "transport error: {}", detail),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport { detail: err.to_string() }
    }
}

impl FetchError {
    /// The text the `LoadingError` state retains for display.
    fn display_message(&self) -> String {
        match self {
            FetchError::RetrievalFailure { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

const AUTH_STATUSES: [StatusCode; 2] = [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN];

/// Classify a non-2xx status and its body text. The body decode is
/// best-effort: the `error` field of a JSON object if one parses, else the
/// raw text.
pub fn classify_failure(status: StatusCode, text: String) -> FetchError {
    if AUTH_STATUSES.contains(&status) {
        return FetchError::AuthRequired { status: status.as_u16() };
    }
    let message = match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(serde_json::Value::Object(map)) => match map.get("error") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => text,
        },
        _ => text,
    };
    FetchError::RetrievalFailure { status: status.as_u16(), message }
}

pub(crate) async fn failure_from_response(resp: Response) -> FetchError {
    let status = resp.status();
    if AUTH_STATUSES.contains(&status) {
        return FetchError::AuthRequired { status: status.as_u16() };
    }
    match resp.text().await {
        Ok(text) => classify_failure(status, text),
        Err(err) => FetchError::DecodeFailure { detail: err.to_string() },
    }
}

#[derive(Debug, Deserialize)]
struct DatapointsBody {
    datapoints: Vec<Datapoint>,
}

/// Retrieval seam for the controller.
#[async_trait]
pub trait DatapointSource: Send + Sync {
    async fn fetch_datapoints(&self, camera: &str, pages: u32)
        -> Result<Vec<Datapoint>, FetchError>;
}

/// Live source against the datapoints endpoint.
pub struct HttpSource {
    client: Client,
    api_base: Url,
}

impl HttpSource {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let client = Client::builder().cookie_store(cfg.send_credentials).build()?;
        Ok(Self { client, api_base: Url::parse(&cfg.api_base)? })
    }

    fn datapoints_url(&self, camera: &str, pages: u32) -> Result<Url, FetchError> {
        let mut url = self
            .api_base
            .join("api/datapoints")
            .map_err(|err| FetchError::Transport { detail: err.to_string() })?;
        url.query_pairs_mut()
            .append_pair("camera", camera)
            .append_pair("pages", &pages.to_string());
        Ok(url)
    }
}

#[async_trait]
impl DatapointSource for HttpSource {
    async fn fetch_datapoints(
        &self,
        camera: &str,
        pages: u32,
    ) -> Result<Vec<Datapoint>, FetchError> {
        let url = self.datapoints_url(camera, pages)?;
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(failure_from_response(resp).await);
        }
        let body: DatapointsBody = resp
            .json()
            .await
            .map_err(|err| FetchError::DecodeFailure { detail: err.to_string() })?;
        Ok(body.datapoints)
    }
}

/// Drives retrieval for one camera view across a sliding page window.
pub struct FetchController {
    source: Box<dyn DatapointSource>,
    state: LoadState,
    page_window: u32,
    index: TimeIndex,
    issued: u64,
}

impl FetchController {
    pub fn new(source: Box<dyn DatapointSource>) -> Self {
        Self {
            source,
            state: LoadState::Loading,
            page_window: 1,
            index: TimeIndex::default(),
            issued: 0,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn page_window(&self) -> u32 {
        self.page_window
    }

    /// The current index. Replaced, never mutated in place, by each
    /// successful load.
    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// Start a load: transition to `Loading` and take a request token. The
    /// previous index and any detail selection stay visible until a
    /// completion replaces them.
    pub fn begin_load(&mut self) -> u64 {
        self.state = LoadState::Loading;
        self.issued += 1;
        self.issued
    }

    /// Apply a completed retrieval. Stale tokens are discarded; the last
    /// issued request wins.
    pub fn complete_load(&mut self, token: u64, result: Result<Vec<Datapoint>, FetchError>) {
        if token != self.issued {
            json_log(
                Level::Debug,
                "fetch",
                "stale_response_discarded",
                obj(&[("token", v_num(token)), ("latest", v_num(self.issued))]),
            );
            return;
        }
        match result {
            Ok(datapoints) => {
                self.index = TimeIndex::build(datapoints);
                self.state = LoadState::Loaded;
            }
            Err(FetchError::AuthRequired { status }) => {
                // Not surfaced as an error; a higher layer redirects.
                json_log(
                    Level::Warn,
                    "fetch",
                    "auth_required",
                    obj(&[("status", v_num(status as u64))]),
                );
            }
            Err(err) => {
                self.state = LoadState::LoadingError { message: err.display_message() };
            }
        }
    }

    /// One full load cycle for `camera` at the current page window.
    pub async fn load_page(&mut self, camera: &str) {
        let token = self.begin_load();
        let result = self.source.fetch_datapoints(camera, self.page_window).await;
        self.complete_load(token, result);
    }

    /// Widen the window by one page of older data and reload.
    pub async fn extend_window(&mut self, camera: &str) {
        self.page_window += 1;
        self.load_page(camera).await;
    }

    /// Narrow the window by one page, floored at 1. At the floor this is a
    /// no-op: no reload.
    pub async fn narrow_window(&mut self, camera: &str) {
        if self.page_window == 1 {
            return;
        }
        self.page_window -= 1;
        self.load_page(camera).await;
    }
}
