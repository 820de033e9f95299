//! HTTP data source.
//!
//! Fetches the maintenance log from the content API once per load.

use std::time::Duration;

use reqwest::Client;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::error::FetchError;
use super::response::{records_url, ApiResponse};
use super::DataSource;
use crate::data::MaintenanceRecord;

type FetchResult = Result<Vec<MaintenanceRecord>, FetchError>;

/// A data source that loads records from the remote API.
///
/// Each load issues a single GET on the given runtime and hands the
/// normalized records back through `poll()` once the response arrives.
/// At most one request is in flight: `reload()` aborts the previous one,
/// and dropping the source aborts whatever is still pending.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use oilwatch::source::{build_client, HttpSource};
///
/// # tokio_test::block_on(async {
/// let client = build_client(Duration::from_secs(30)).unwrap();
/// let source = HttpSource::spawn(
///     tokio::runtime::Handle::current(),
///     client,
///     "https://maintenance.example.com",
/// )
/// .unwrap();
/// # });
/// ```
#[derive(Debug)]
pub struct HttpSource {
    handle: Handle,
    client: Client,
    url: String,
    description: String,
    in_flight: Option<InFlight>,
    last_error: Option<String>,
}

#[derive(Debug)]
struct InFlight {
    task: JoinHandle<()>,
    receiver: oneshot::Receiver<FetchResult>,
}

impl HttpSource {
    /// Validate the base URL and start the initial fetch.
    pub fn spawn(handle: Handle, client: Client, base_url: &str) -> Result<Self, FetchError> {
        let url = records_url(base_url);
        reqwest::Url::parse(&url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;

        let mut source = Self {
            handle,
            client,
            description: format!("api: {}", base_url.trim_end_matches('/')),
            url,
            in_flight: None,
            last_error: None,
        };
        source.start_fetch();
        Ok(source)
    }

    /// The full records endpoint being queried.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn start_fetch(&mut self) {
        self.cancel();

        let (tx, rx) = oneshot::channel();
        let client = self.client.clone();
        let url = self.url.clone();

        tracing::info!(url = %url, "fetching maintenance records");
        let task = self.handle.spawn(async move {
            let result = fetch_records(&client, &url).await;
            // Receiver gone means the source was dropped or reloaded
            let _ = tx.send(result);
        });

        self.in_flight = Some(InFlight { task, receiver: rx });
    }

    fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            tracing::debug!(url = %self.url, "aborting in-flight fetch");
            in_flight.task.abort();
        }
    }
}

impl DataSource for HttpSource {
    fn poll(&mut self) -> Option<Vec<MaintenanceRecord>> {
        let in_flight = self.in_flight.as_mut()?;

        let outcome = match in_flight.receiver.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return None,
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(FetchError::Http("fetch task ended without a result".to_string()))
            }
        };
        self.in_flight = None;

        match outcome {
            Ok(records) => {
                tracing::info!(count = records.len(), "loaded maintenance records");
                self.last_error = None;
                Some(records)
            }
            Err(e) => {
                tracing::error!(url = %self.url, error = %e, "failed to load maintenance records");
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    fn reload(&mut self) {
        self.last_error = None;
        self.start_fetch();
    }
}

impl Drop for HttpSource {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Build the HTTP client used for API requests.
pub fn build_client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("oilwatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(FetchError::from)
}

/// Fetch and normalize the records behind `url` (the full endpoint URL).
pub async fn fetch_records(client: &Client, url: &str) -> FetchResult {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    let body = response.bytes().await?;
    let parsed: ApiResponse = serde_json::from_slice(&body)?;
    Ok(parsed.normalize())
}
