//! Camera state client.
//!
//! Thin wrapper over the cameras endpoint: read a camera's enabled/disabled
//! state and flip it. Failure classification matches the datapoint source:
//! 401/403 come back as `AuthRequired`, everything else as a retrieval
//! failure with the decoded body.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::config::Config;
use crate::fetch::{failure_from_response, FetchError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraState {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "State")]
    pub state: String,
}

impl CameraState {
    pub fn is_enabled(&self) -> bool {
        self.state == "enabled"
    }

    /// The state a toggle would move to.
    pub fn toggled(&self) -> &'static str {
        if self.is_enabled() {
            "disabled"
        } else {
            "enabled"
        }
    }
}

#[derive(Debug, Deserialize)]
struct CameraStateBody {
    #[serde(rename = "cameraState")]
    camera_state: CameraState,
}

pub struct CameraClient {
    client: Client,
    api_base: Url,
}

impl CameraClient {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let client = Client::builder().cookie_store(cfg.send_credentials).build()?;
        Ok(Self { client, api_base: Url::parse(&cfg.api_base)? })
    }

    fn cameras_url(&self) -> Result<Url, FetchError> {
        self.api_base
            .join("api/cameras")
            .map_err(|err| FetchError::Transport { detail: err.to_string() })
    }

    pub async fn get_state(&self, camera: &str) -> Result<CameraState, FetchError> {
        let mut url = self.cameras_url()?;
        url.query_pairs_mut().append_pair("camera", camera);
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(failure_from_response(resp).await);
        }
        let body: CameraStateBody = resp
            .json()
            .await
            .map_err(|err| FetchError::DecodeFailure { detail: err.to_string() })?;
        Ok(body.camera_state)
    }

    pub async fn set_state(&self, camera: &str, state: &str) -> Result<CameraState, FetchError> {
        let resp = self
            .client
            .put(self.cameras_url()?)
            .json(&json!({ "camera": camera, "state": state }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(failure_from_response(resp).await);
        }
        let body: CameraStateBody = resp
            .json()
            .await
            .map_err(|err| FetchError::DecodeFailure { detail: err.to_string() })?;
        Ok(body.camera_state)
    }
}
