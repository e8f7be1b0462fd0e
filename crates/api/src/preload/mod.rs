mod error;
mod validator;

use core::future::Future;
use dashmap::DashMap;
use http_body_util::{BodyExt, Empty};
use hyper::{body::Bytes, Uri};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::collections::BTreeSet;

pub use error::{FetchError, Result};
pub use validator::is_fetchable_uri;

/// Anything that can download an image.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, uri: Uri) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Fetches images over HTTP(S).
pub struct HttpFetcher(Client<HttpsConnector<HttpConnector>, Empty<Bytes>>);

impl HttpFetcher {
    pub fn new() -> std::io::Result<Self> {
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()?
            .https_or_http()
            .enable_http1()
            .build();
        Ok(Self(Client::builder(TokioExecutor::new()).build(connector)))
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, uri: Uri) -> Result<Bytes> {
        let response = self.0.get(uri).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.into_body().collect().await?.to_bytes())
    }
}

/// Image bytes keyed by their original URL.
#[derive(Default)]
pub struct ImageCache(DashMap<Box<str>, Bytes>);

impl ImageCache {
    pub fn get(&self, url: &str) -> Option<Bytes> {
        self.0.get(url).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.0.contains_key(url)
    }

    pub fn insert(&self, url: Box<str>, bytes: Bytes) {
        self.0.insert(url, bytes);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.0.len()
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PreloadReport {
    /// Newly downloaded into the cache.
    pub loaded: usize,
    /// Already in the cache.
    pub cached: usize,
    /// Unfetchable URLs and failed downloads.
    pub failed: usize,
}

/// Downloads every distinct URL into `cache` concurrently. Individual failures
/// are only counted, so this always completes.
pub async fn preload<F, I>(fetcher: &F, cache: &ImageCache, urls: I) -> PreloadReport
where
    F: Fetch,
    I: IntoIterator,
    I::Item: Into<Box<str>>,
{
    let urls: BTreeSet<Box<str>> = urls.into_iter().map(Into::into).collect();
    let mut report = PreloadReport::default();
    let mut pending = Vec::with_capacity(urls.len());
    for url in urls {
        if cache.contains(&url) {
            report.cached += 1;
            continue;
        }

        let uri = match url.parse::<Uri>() {
            Ok(uri) if is_fetchable_uri(&uri) => uri,
            _ => {
                log::warn!("skipping unfetchable image {url}");
                report.failed += 1;
                continue;
            }
        };

        pending.push(async move {
            let result = fetcher.fetch(uri).await;
            (url, result)
        });
    }

    for (url, result) in futures_util::future::join_all(pending).await {
        match result {
            Ok(bytes) => {
                cache.insert(url, bytes);
                report.loaded += 1;
            }
            Err(err) => {
                log::warn!("failed to preload {url}: {err}");
                report.failed += 1;
            }
        }
    }

    log::info!("preloaded {} images ({} cached, {} failed)", report.loaded, report.cached, report.failed);
    report
}
