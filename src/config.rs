//! Deployment configuration.
//!
//! Everything the fetch and camera clients need is read once here and passed
//! in at construction; no component reaches for the environment itself.

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the API origin, e.g. `https://watch.example.com`.
    pub api_base: String,
    /// Base URL video assets resolve against. Defaults to `api_base`.
    pub media_base: String,
    /// Cameras to drive, in display order.
    pub cameras: Vec<String>,
    /// Attach deployment cookies to every request.
    pub send_credentials: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let api_base = std::env::var("HOMEWATCH_API_BASE")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let media_base =
            std::env::var("HOMEWATCH_MEDIA_BASE").unwrap_or_else(|_| api_base.clone());
        Self {
            api_base,
            media_base,
            cameras: std::env::var("HOMEWATCH_CAMERAS")
                .map(|v| Self::split_cameras(&v))
                .unwrap_or_else(|_| vec!["DemoCamera1".to_string(), "DemoCamera2".to_string()]),
            send_credentials: std::env::var("HOMEWATCH_SEND_CREDENTIALS")
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(true),
        }
    }

    fn split_cameras(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}
