//! PokeAPI client and page fetcher

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::normalize::normalize;
use crate::pagination::PageRequest;
use crate::state::Item;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed response: {0}")]
    MalformedData(String),
}

/// One entry of a list page; `url` is the detail reference.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ItemRef {
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListPage {
    pub results: Vec<ItemRef>,
    pub next: Option<String>,
}

/// Continuation signal returned with every page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cursor {
    /// The provider advertised another page.
    More(String),
    /// The provider has no further pages.
    End,
    /// The list request itself failed; no further pages are assumed.
    Failed(FetchError),
}

impl Cursor {
    pub fn has_more(&self) -> bool {
        matches!(self, Cursor::More(_))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Item>,
    pub cursor: Cursor,
}

impl Page {
    pub fn failed(error: FetchError) -> Self {
        Self {
            items: Vec::new(),
            cursor: Cursor::Failed(error),
        }
    }
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn list_page(&self, limit: usize, offset: usize) -> Result<ListPage, FetchError>;

    async fn item_detail(&self, reference: &str) -> Result<Value, FetchError>;
}

pub struct PokeApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl PokeApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Absolute URLs are used as-is; anything else is treated as a name or id.
    fn detail_url(&self, reference: &str) -> String {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            reference.to_string()
        } else {
            format!("{}/pokemon/{}", self.base_url, reference.to_ascii_lowercase())
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response
            .json::<T>()
            .await
            .map_err(|err| FetchError::MalformedData(err.to_string()))
    }
}

#[async_trait]
impl CatalogProvider for PokeApiClient {
    async fn list_page(&self, limit: usize, offset: usize) -> Result<ListPage, FetchError> {
        let url = format!("{}/pokemon?limit={limit}&offset={offset}", self.base_url);
        self.get_json(&url).await
    }

    async fn item_detail(&self, reference: &str) -> Result<Value, FetchError> {
        let url = self.detail_url(reference);
        self.get_json(&url).await
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("page fetcher already installed")]
pub struct AlreadyInstalled;

/// Provider plus the per-page detail concurrency, shared by every page task.
pub struct PageFetcher {
    provider: Arc<dyn CatalogProvider>,
    concurrency: usize,
}

impl PageFetcher {
    pub fn new(provider: Arc<dyn CatalogProvider>, concurrency: usize) -> Self {
        Self {
            provider,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn fetch(&self, request: PageRequest) -> Page {
        fetch_page(
            Arc::clone(&self.provider),
            request.limit,
            request.offset,
            self.concurrency,
        )
        .await
    }
}

static FETCHER: OnceLock<PageFetcher> = OnceLock::new();

/// Install the process-wide fetcher. A second install is rejected and the
/// first one stays in place.
pub fn install_fetcher(fetcher: PageFetcher) -> Result<(), AlreadyInstalled> {
    FETCHER.set(fetcher).map_err(|_| AlreadyInstalled)
}

pub fn installed_fetcher() -> Option<&'static PageFetcher> {
    FETCHER.get()
}

/// Fetch one list page and every detail on it.
///
/// Detail requests run concurrently (at most `concurrency` at a time) and the
/// page is returned only after all of them have settled. A failed or missing
/// detail shrinks the page; a failed list request yields an empty page with a
/// `Cursor::Failed`.
pub async fn fetch_page(
    provider: Arc<dyn CatalogProvider>,
    limit: usize,
    offset: usize,
    concurrency: usize,
) -> Page {
    debug!(limit, offset, "requesting list page");
    let list = match provider.list_page(limit, offset).await {
        Ok(list) => list,
        Err(err) => {
            warn!(limit, offset, error = %err, "list page failed");
            return Page::failed(err);
        }
    };

    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut join_set = JoinSet::new();
    for entry in list.results {
        let provider = Arc::clone(&provider);
        let semaphore = Arc::clone(&semaphore);
        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|_| FetchError::Transport("detail semaphore closed".to_string()))?;
            provider.item_detail(&entry.url).await
        });
    }

    let mut items = Vec::with_capacity(join_set.len());
    while let Some(result) = join_set.join_next().await {
        let raw = match result {
            Ok(Ok(raw)) => raw,
            Ok(Err(FetchError::NotFound(reference))) => {
                warn!(%reference, "detail not found, skipping");
                continue;
            }
            Ok(Err(err)) => {
                warn!(error = %err, "detail request failed, skipping");
                continue;
            }
            Err(err) => {
                warn!(error = %err, "detail task aborted, skipping");
                continue;
            }
        };
        match normalize(Some(&raw)) {
            Ok(item) => items.push(item),
            Err(err) => warn!(error = %err, "dropping malformed record"),
        }
    }
    items.sort_by_key(|item| item.id);

    let cursor = match list.next {
        Some(next) => Cursor::More(next),
        None => Cursor::End,
    };
    debug!(offset, loaded = items.len(), more = cursor.has_more(), "page settled");
    Page { items, cursor }
}
