//! In-memory release source
//!
//! Serves a fixed release and records how often each endpoint was hit, so
//! tests can assert that no download happened.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use futures_util::StreamExt;
use inplace_update::{ByteStream, Credential, Release, ReleaseSource, UpdateError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type StreamFactory = Box<dyn Fn() -> ByteStream + Send + Sync>;

/// Release source serving one release and one asset body
pub struct FakeReleaseSource {
    release: Release,
    stream: StreamFactory,
    lookups: Arc<AtomicUsize>,
    downloads: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<u64>>>,
}

impl FakeReleaseSource {
    pub fn new(release: Release, content: &'static [u8]) -> Self {
        Self::with_stream(release, move || {
            stream::iter(vec![Ok(Bytes::from_static(content))]).boxed()
        })
    }

    pub fn with_stream(
        release: Release,
        stream: impl Fn() -> ByteStream + Send + Sync + 'static,
    ) -> Self {
        Self {
            release,
            stream: Box::new(stream),
            lookups: Arc::new(AtomicUsize::new(0)),
            downloads: Arc::new(AtomicUsize::new(0)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Counter handles that stay valid after the source moves into an updater
    pub fn counters(&self) -> SourceCounters {
        SourceCounters {
            lookups: self.lookups.clone(),
            downloads: self.downloads.clone(),
            requested: self.requested.clone(),
        }
    }
}

#[async_trait]
impl ReleaseSource for FakeReleaseSource {
    async fn fetch_latest_release(
        &self,
        _owner: &str,
        _repo: &str,
        _credential: &Credential,
    ) -> Result<Release, UpdateError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.release.clone())
    }

    async fn open_asset_download(
        &self,
        _owner: &str,
        _repo: &str,
        asset_id: u64,
        _credential: &Credential,
    ) -> Result<ByteStream, UpdateError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(asset_id);
        Ok((self.stream)())
    }
}

/// Shared view of a [`FakeReleaseSource`]'s call counts
#[derive(Clone)]
pub struct SourceCounters {
    lookups: Arc<AtomicUsize>,
    downloads: Arc<AtomicUsize>,
    requested: Arc<Mutex<Vec<u64>>>,
}

impl SourceCounters {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    pub fn requested_assets(&self) -> Vec<u64> {
        self.requested.lock().unwrap().clone()
    }
}
