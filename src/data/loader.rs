use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::error::LoadError;

use super::model::Dataset;
use super::parse::parse_csv;

// ---------------------------------------------------------------------------
// Fetchers – where the bytes come from
// ---------------------------------------------------------------------------

/// Retrieves the raw content behind a URL.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError>;
}

/// Plain HTTP GET; anything but a 2xx answer is a failure.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::FetchFailed {
                url: String::new(),
                reason: format!("http client error: {e}"),
            })?;
        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let failed = |reason: String| LoadError::FetchFailed {
            url: url.to_string(),
            reason,
        };
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("HTTP status {status}")));
        }
        let body = response.bytes().map_err(|e| failed(e.to_string()))?;
        Ok(body.to_vec())
    }
}

/// Reads `file://` URLs or bare paths from the local disk.
#[derive(Debug, Default)]
pub struct FileFetcher;

impl Fetcher for FileFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
        std::fs::read(&path).map_err(|e| LoadError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Pick a fetcher from the scheme of a base URL.
pub fn fetcher_for(base_url: &str, timeout: Duration) -> Result<Arc<dyn Fetcher>, LoadError> {
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        Ok(Arc::new(HttpFetcher::new(timeout)?))
    } else {
        Ok(Arc::new(FileFetcher))
    }
}

// ---------------------------------------------------------------------------
// Loader – fetch once, cache, notify
// ---------------------------------------------------------------------------

/// What every subscriber receives: the shared dataset, or why there is none.
pub type Delivery = Result<Arc<Dataset>, Arc<LoadError>>;

type Handler = Box<dyn FnOnce(Delivery) + Send + 'static>;

enum Slot {
    /// Still fetching; handlers wait here in subscription order.
    Pending(Vec<Handler>),
    Arrived(Delivery),
}

/// Coarse view of a loader for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready { rows: usize },
    Failed(String),
}

/// Owns the fetch → parse → cache lifecycle of one data source.
///
/// The dataset goes from absent to present exactly once. Clones share the
/// same slot, so handing a `Loader` around never triggers another fetch.
#[derive(Clone)]
pub struct Loader {
    url: Arc<str>,
    slot: Arc<Mutex<Slot>>,
}

impl Loader {
    /// Start fetching `base_url + path` on a background thread.
    pub fn load(fetcher: Arc<dyn Fetcher>, base_url: &str, path: &str) -> Loader {
        let url: Arc<str> = Arc::from(format!("{base_url}{path}"));
        let loader = Loader {
            url: url.clone(),
            slot: Arc::new(Mutex::new(Slot::Pending(Vec::new()))),
        };

        let worker = loader.clone();
        thread::spawn(move || {
            log::debug!("Fetching {url}");
            let delivery = fetcher
                .fetch(&url)
                .and_then(|bytes| parse_csv(&url, &bytes))
                .map(Arc::new)
                .map_err(Arc::new);
            worker.arrive(delivery);
        });

        loader
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Hand the dataset to `handler`.
    ///
    /// Runs the handler right away when the data is already here, otherwise
    /// queues it until arrival. Either way it runs exactly once.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: FnOnce(Delivery) + Send + 'static,
    {
        let ready = {
            let mut slot = self.lock();
            match &mut *slot {
                Slot::Pending(queue) => {
                    queue.push(Box::new(handler));
                    return;
                }
                Slot::Arrived(delivery) => delivery.clone(),
            }
        };
        handler(ready);
    }

    pub fn state(&self) -> LoadState {
        match &*self.lock() {
            Slot::Pending(_) => LoadState::Pending,
            Slot::Arrived(Ok(ds)) => LoadState::Ready { rows: ds.len() },
            Slot::Arrived(Err(e)) => LoadState::Failed(e.to_string()),
        }
    }

    /// The cached dataset, if it has arrived successfully.
    pub fn dataset(&self) -> Option<Arc<Dataset>> {
        match &*self.lock() {
            Slot::Arrived(Ok(ds)) => Some(ds.clone()),
            _ => None,
        }
    }

    fn arrive(&self, delivery: Delivery) {
        match &delivery {
            Ok(ds) => log::info!("Loaded {} rows from {}", ds.len(), self.url),
            Err(e) => log::error!("Failed to load {}: {e}", self.url),
        }

        let waiting = {
            let mut slot = self.lock();
            match std::mem::replace(&mut *slot, Slot::Arrived(delivery.clone())) {
                Slot::Pending(queue) => queue,
                // Only the worker arrives, and only once.
                Slot::Arrived(previous) => {
                    *slot = Slot::Arrived(previous);
                    return;
                }
            }
        };

        for handler in waiting {
            handler(delivery.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // Handlers never run under the lock, so a poisoned slot still holds
        // a consistent value.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

// ---------------------------------------------------------------------------
// SourceRegistry – one loader per path
// ---------------------------------------------------------------------------

/// Hands out one [`Loader`] per source path under a common base URL.
pub struct SourceRegistry {
    base_url: String,
    fetcher: Arc<dyn Fetcher>,
    loaders: HashMap<String, Loader>,
}

impl SourceRegistry {
    pub fn new(base_url: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        SourceRegistry {
            base_url: base_url.into(),
            fetcher,
            loaders: HashMap::new(),
        }
    }

    /// Loader for `path`, starting the fetch on first request.
    pub fn get_or_load(&mut self, path: &str) -> Loader {
        self.loaders
            .entry(path.to_string())
            .or_insert_with(|| Loader::load(self.fetcher.clone(), &self.base_url, path))
            .clone()
    }

    /// Forget every cached loader; the next request fetches again.
    pub fn clear(&mut self) {
        self.loaders.clear();
    }

    /// Known sources sorted by path.
    pub fn sources(&self) -> Vec<(String, Loader)> {
        let mut out: Vec<(String, Loader)> = self
            .loaders
            .iter()
            .map(|(p, l)| (p.clone(), l.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;

    use crate::data::model::CellValue;

    const CSV: &[u8] = b"year,val\n2020,1\n2021,2\n";

    /// Serves fixed bytes once `release` fires, counting every fetch.
    struct GatedFetcher {
        body: Result<Vec<u8>, String>,
        calls: AtomicUsize,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl GatedFetcher {
        fn new(body: Result<&[u8], &str>) -> (Arc<Self>, mpsc::Sender<()>) {
            let (tx, rx) = mpsc::channel();
            let fetcher = Arc::new(GatedFetcher {
                body: body.map(|b| b.to_vec()).map_err(|e| e.to_string()),
                calls: AtomicUsize::new(0),
                release: Mutex::new(rx),
            });
            (fetcher, tx)
        }
    }

    impl Fetcher for GatedFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.release.lock().unwrap().recv().ok();
            self.body.clone().map_err(|reason| LoadError::FetchFailed {
                url: url.to_string(),
                reason,
            })
        }
    }

    fn wait_for_arrival(loader: &Loader) {
        let (tx, rx) = mpsc::channel();
        loader.subscribe(move |_| {
            tx.send(()).unwrap();
        });
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
    }

    #[test]
    fn queued_handlers_run_in_subscription_order() {
        let (fetcher, release) = GatedFetcher::new(Ok(CSV));
        let loader = Loader::load(fetcher, "mem://", "/a.csv");
        let (tx, rx) = mpsc::channel();

        for id in 0..3 {
            let tx = tx.clone();
            loader.subscribe(move |d| tx.send((id, d.unwrap().len())).unwrap());
        }
        assert_eq!(loader.state(), LoadState::Pending);
        release.send(()).unwrap();

        let got: Vec<(i32, usize)> = (0..3)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(got, vec![(0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn early_and_late_subscribers_share_one_dataset_and_one_fetch() {
        let (fetcher, release) = GatedFetcher::new(Ok(CSV));
        let loader = Loader::load(fetcher.clone(), "mem://", "/a.csv");

        let (tx, rx) = mpsc::channel();
        let early = tx.clone();
        loader.subscribe(move |d| early.send(d.unwrap()).unwrap());
        release.send(()).unwrap();
        let first = rx.recv_timeout(Duration::from_secs(5)).unwrap();

        loader.subscribe(move |d| tx.send(d.unwrap()).unwrap());
        let second = rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.column("val"), vec![CellValue::Number(1.0), CellValue::Number(2.0)]);
        assert_eq!(loader.dataset().map(|d| d.len()), Some(2));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn late_subscriber_runs_on_the_calling_thread() {
        let (fetcher, release) = GatedFetcher::new(Ok(CSV));
        let loader = Loader::load(fetcher, "mem://", "/a.csv");
        release.send(()).unwrap();
        wait_for_arrival(&loader);

        let caller = thread::current().id();
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        loader.subscribe(move |_| *sink.lock().unwrap() = Some(thread::current().id()));
        assert_eq!(*seen.lock().unwrap(), Some(caller));
    }

    #[test]
    fn fetch_failure_reaches_every_subscriber() {
        let (fetcher, release) = GatedFetcher::new(Err("connection refused"));
        let loader = Loader::load(fetcher, "http://host", "/missing.csv");
        let (tx, rx) = mpsc::channel();
        let early = tx.clone();
        loader.subscribe(move |d| early.send(d.map(|_| ())).unwrap());
        release.send(()).unwrap();

        let err = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap_err();
        assert!(matches!(&*err, LoadError::FetchFailed { url, .. } if url == "http://host/missing.csv"));

        loader.subscribe(move |d| tx.send(d.map(|_| ())).unwrap());
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap().is_err());
        assert!(matches!(loader.state(), LoadState::Failed(_)));
        assert!(loader.dataset().is_none());
    }

    #[test]
    fn malformed_csv_is_delivered_as_parse_failure() {
        let (fetcher, release) = GatedFetcher::new(Ok(b"a,b\n1\n"));
        let loader = Loader::load(fetcher, "mem://", "/bad.csv");
        let (tx, rx) = mpsc::channel();
        loader.subscribe(move |d| tx.send(d.map(|_| ())).unwrap());
        release.send(()).unwrap();

        let err = rx.recv_timeout(Duration::from_secs(5)).unwrap().unwrap_err();
        assert!(matches!(&*err, LoadError::ParseFailed { .. }));
    }

    #[test]
    fn registry_reuses_loaders_until_cleared() {
        let (fetcher, release) = GatedFetcher::new(Ok(CSV));
        let mut registry = SourceRegistry::new("mem://", fetcher.clone());

        let a = registry.get_or_load("/a.csv");
        let again = registry.get_or_load("/a.csv");
        assert_eq!(a.url(), "mem:///a.csv");
        release.send(()).unwrap();
        wait_for_arrival(&again);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(registry.sources().len(), 1);

        registry.clear();
        assert!(registry.sources().is_empty());
        let fresh = registry.get_or_load("/a.csv");
        release.send(()).unwrap();
        wait_for_arrival(&fresh);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn file_fetcher_reads_local_sources() {
        let dir = std::env::temp_dir().join(format!("csv-timeline-fetch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("series.csv"), CSV).unwrap();

        let base = format!("file://{}", dir.display());
        let bytes = FileFetcher.fetch(&format!("{base}/series.csv")).unwrap();
        assert_eq!(bytes, CSV);
        assert!(matches!(
            FileFetcher.fetch(&format!("{base}/nope.csv")),
            Err(LoadError::FetchFailed { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
