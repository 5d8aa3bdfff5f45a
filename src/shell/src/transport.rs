use anyhow::{Context, Result};
use crux_http::{
    protocol::{HttpRequest, HttpResponse, HttpResult},
    HttpError,
};
use futures_util::{stream, Stream};
use log::debug;
use pax_console_core::{http_helpers::endpoint_of, TransportOutcome};
use reqwest::{
    header::{CONTENT_LENGTH, CONTENT_TYPE},
    Body, Client, Method, Url,
};
use std::{io, path::Path, time::Duration};
use tokio::{fs::File, io::AsyncReadExt};

use crate::config::ShellConfig;

/// HTTP access to one device
#[derive(Clone, Debug)]
pub struct DeviceClient {
    client: Client,
    base: Url,
    request_timeout: Duration,
    chunk_bytes: usize,
}

impl DeviceClient {
    pub fn new(config: &ShellConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("failed to create device HTTP client")?;

        Ok(Self {
            client,
            base: config.device_url.clone(),
            request_timeout: config.request_timeout,
            chunk_bytes: config.upload_chunk_bytes,
        })
    }

    /// Map a core URL (dummy base + device path) onto the device origin.
    pub fn resolve_url(&self, url: &str) -> Result<Url> {
        let path = endpoint_of(url).trim_start_matches('/');
        self.base
            .join(path)
            .with_context(|| format!("failed to build device url for {url:?}"))
    }

    /// Run one JSON request of the core. Any status is a response; only
    /// transport failures become errors.
    pub async fn execute(&self, request: HttpRequest) -> HttpResult {
        match self.send(request).await {
            Ok(response) => HttpResult::Ok(response),
            Err(e) => HttpResult::Err(HttpError::Io(format!("{e:#}"))),
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = self.resolve_url(&request.url)?;
        let method = Method::from_bytes(request.method.as_bytes())
            .with_context(|| format!("failed to parse method {:?}", request.method))?;
        debug!("{method} {url}");

        let mut builder = self
            .client
            .request(method, url)
            .timeout(self.request_timeout);
        for header in request.headers {
            builder = builder.header(header.name, header.value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.context("failed to send request")?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .context("failed to read response body")?;

        Ok(HttpResponse::status(status).body(body.to_vec()).build())
    }

    /// POST the file at `path` as raw body, calling `progress(sent, total)`
    /// after each chunk handed to the connection.
    pub async fn upload<P>(&self, url: &str, path: &Path, progress: P) -> TransportOutcome
    where
        P: Fn(u64, u64) + Send + Sync + 'static,
    {
        match self.send_file(url, path, progress).await {
            Ok(outcome) => outcome,
            Err(e) => TransportOutcome::NetworkError {
                message: format!("{e:#}"),
            },
        }
    }

    async fn send_file<P>(&self, url: &str, path: &Path, progress: P) -> Result<TransportOutcome>
    where
        P: Fn(u64, u64) + Send + Sync + 'static,
    {
        let url = self.resolve_url(url)?;
        let file = File::open(path)
            .await
            .with_context(|| format!("failed to open firmware image {path:?}"))?;
        let total = file
            .metadata()
            .await
            .context("failed to read firmware image size")?
            .len();
        debug!("uploading {total} bytes to {url}");

        let body = Body::wrap_stream(chunk_stream(file, self.chunk_bytes, total, progress));
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, total)
            .body(body)
            .send()
            .await
            .context("failed to send firmware image")?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .context("failed to read upload response")?;
        Ok(TransportOutcome::from_status(status, text))
    }
}

/// Read `file` in `chunk_bytes` slices. A read error ends the stream after
/// being yielded once.
pub fn chunk_stream<P>(
    file: File,
    chunk_bytes: usize,
    total: u64,
    progress: P,
) -> impl Stream<Item = io::Result<Vec<u8>>> + Send + 'static
where
    P: Fn(u64, u64) + Send + Sync + 'static,
{
    stream::unfold(Some((file, 0u64, progress)), move |state| async move {
        let (mut file, sent, progress) = state?;
        let mut chunk = vec![0; chunk_bytes];
        match file.read(&mut chunk).await {
            Ok(0) => None,
            Ok(n) => {
                chunk.truncate(n);
                let sent = sent + n as u64;
                progress(sent, total);
                Some((Ok(chunk), Some((file, sent, progress))))
            }
            Err(e) => Some((Err(e), None)),
        }
    })
}
