use anyhow::{Context, Result};
use reqwest::Url;
use std::{env, time::Duration};

const DEFAULT_DEVICE_URL: &str = "http://192.168.4.1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_UPLOAD_CHUNK_BYTES: usize = 16 * 1024;

/// Shell configuration loaded from the environment at startup
#[derive(Clone, Debug)]
pub struct ShellConfig {
    /// Origin the device API paths are resolved against; always ends in `/`
    pub device_url: Url,

    /// Timeout of JSON requests. Firmware uploads are not limited.
    pub request_timeout: Duration,

    /// Size of the slices a firmware image is streamed in
    pub upload_chunk_bytes: usize,
}

impl ShellConfig {
    /// Load from `PAX_*` environment variables; `device` overrides
    /// `PAX_DEVICE_URL`.
    pub fn load(device: Option<&str>) -> Result<Self> {
        Self::from_lookup(device, |key| env::var(key).ok())
    }

    fn from_lookup(device: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let device_url = match device {
            Some(url) => url.to_string(),
            None => lookup("PAX_DEVICE_URL").unwrap_or_else(|| DEFAULT_DEVICE_URL.to_string()),
        };
        let device_url = parse_device_url(&device_url)?;

        let request_timeout = match lookup("PAX_REQUEST_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse::<u64>()
                .context("failed to parse PAX_REQUEST_TIMEOUT_SECS: invalid format")?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let upload_chunk_bytes = match lookup("PAX_UPLOAD_CHUNK_BYTES") {
            Some(bytes) => bytes
                .parse::<usize>()
                .context("failed to parse PAX_UPLOAD_CHUNK_BYTES: invalid format")?,
            None => DEFAULT_UPLOAD_CHUNK_BYTES,
        };
        anyhow::ensure!(
            upload_chunk_bytes > 0,
            "failed to configure upload: PAX_UPLOAD_CHUNK_BYTES must not be 0"
        );

        Ok(Self {
            device_url,
            request_timeout: Duration::from_secs(request_timeout),
            upload_chunk_bytes,
        })
    }
}

fn parse_device_url(url: &str) -> Result<Url> {
    let mut url =
        Url::parse(url).with_context(|| format!("failed to parse device url {url:?}"))?;
    anyhow::ensure!(
        matches!(url.scheme(), "http" | "https"),
        "failed to use device url {url}: only http and https are supported"
    );
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
