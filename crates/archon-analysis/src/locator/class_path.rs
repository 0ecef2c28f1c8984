//! Auxiliary lookup path for units referenced but not imported.

use std::io::Read;
use std::path::PathBuf;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use archon_core::errors::LocateError;
use archon_core::types::FxHashMap;
use crossbeam_channel::{RecvTimeoutError, Sender};

use super::types::{entry_name, UnitSource};

/// Finds the bytes of a single unit by its dotted name.
pub trait UnitLookup: Send + Sync {
    /// `Ok(None)` when the unit is not on this path.
    fn resolve_by_name(&self, name: &str) -> Result<Option<Vec<u8>>, LocateError>;
}

#[derive(Debug, Clone)]
enum ClassPathRoot {
    Directory(PathBuf),
    Archive(PathBuf),
}

/// Ordered list of directories and archives searched first-match-wins.
#[derive(Debug, Clone, Default)]
pub struct ClassPath {
    roots: Vec<ClassPathRoot>,
}

impl ClassPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(ClassPathRoot::Directory(path.into()));
        self
    }

    pub fn archive(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(ClassPathRoot::Archive(path.into()));
        self
    }

    /// Build a class path from file-system sources; memory sources are
    /// ignored.
    pub fn from_sources(sources: &[UnitSource]) -> Self {
        let roots = sources
            .iter()
            .filter_map(|s| match s {
                UnitSource::Directory(p) => Some(ClassPathRoot::Directory(p.clone())),
                UnitSource::Archive(p) => Some(ClassPathRoot::Archive(p.clone())),
                UnitSource::Memory { .. } => None,
            })
            .collect();
        Self { roots }
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

impl UnitLookup for ClassPath {
    fn resolve_by_name(&self, name: &str) -> Result<Option<Vec<u8>>, LocateError> {
        let entry = entry_name(name);
        for root in &self.roots {
            match root {
                ClassPathRoot::Directory(dir) => {
                    let path = dir.join(&entry);
                    if path.is_file() {
                        return std::fs::read(&path)
                            .map(Some)
                            .map_err(|source| LocateError::Io { path, source });
                    }
                }
                ClassPathRoot::Archive(path) => {
                    let file = match std::fs::File::open(path) {
                        Ok(f) => f,
                        Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                        Err(source) => {
                            return Err(LocateError::Io {
                                path: path.clone(),
                                source,
                            })
                        }
                    };
                    let mut archive =
                        zip::ZipArchive::new(file).map_err(|e| LocateError::Archive {
                            path: path.clone(),
                            message: e.to_string(),
                        })?;
                    let mut found = match archive.by_name(&entry) {
                        Ok(f) => f,
                        Err(zip::result::ZipError::FileNotFound) => continue,
                        Err(e) => {
                            return Err(LocateError::Archive {
                                path: path.clone(),
                                message: e.to_string(),
                            })
                        }
                    };
                    let mut bytes = Vec::new();
                    found
                        .read_to_end(&mut bytes)
                        .map_err(|source| LocateError::Io {
                            path: path.clone(),
                            source,
                        })?;
                    return Ok(Some(bytes));
                }
            }
        }
        Ok(None)
    }
}

/// In-memory lookup keyed by dotted unit name.
#[derive(Debug, Clone, Default)]
pub struct MemoryLookup {
    units: FxHashMap<String, Vec<u8>>,
}

impl MemoryLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.units.insert(name.into(), bytes);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.units.insert(name.into(), bytes);
    }
}

impl UnitLookup for MemoryLookup {
    fn resolve_by_name(&self, name: &str) -> Result<Option<Vec<u8>>, LocateError> {
        Ok(self.units.get(name).cloned())
    }
}

/// Live lookup threads a single worker may hold, stalled ones included.
pub const MAX_LOOKUP_THREADS: usize = 4;

type LookupResult = Result<Option<Vec<u8>>, LocateError>;
type LookupRequest = (String, Sender<LookupResult>);

/// Runs lookups on a reused background thread with a per-call timeout.
///
/// A thread whose lookup overruns is retired and a fresh one takes the
/// next request, as long as fewer than `max_threads` are alive. Past
/// that, requests queue behind the stalled thread and time out on their
/// own deadline. Retired threads exit once their lookup returns.
pub struct LookupWorker {
    lookup: Arc<dyn UnitLookup>,
    requests: Option<Sender<LookupRequest>>,
    live: Arc<AtomicUsize>,
    spawned: usize,
    max_threads: usize,
}

impl LookupWorker {
    pub fn new(lookup: Arc<dyn UnitLookup>) -> Self {
        Self {
            lookup,
            requests: None,
            live: Arc::new(AtomicUsize::new(0)),
            spawned: 0,
            max_threads: MAX_LOOKUP_THREADS,
        }
    }

    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads.max(1);
        self
    }

    /// Threads started over the worker's lifetime.
    pub fn threads_spawned(&self) -> usize {
        self.spawned
    }

    /// Look `name` up, giving up after `timeout`.
    pub fn resolve(&mut self, name: &str, timeout: Duration) -> LookupResult {
        let failed = |message: String| LocateError::LookupFailed {
            name: name.to_string(),
            message,
        };
        let (reply, response) = crossbeam_channel::bounded(1);
        if self.requests(name)?.send((name.to_string(), reply)).is_err() {
            self.requests = None;
            return Err(failed("lookup worker exited".to_string()));
        }

        match response.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                if self.live.load(Ordering::Acquire) < self.max_threads {
                    self.requests = None;
                }
                Err(LocateError::Timeout {
                    name: name.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.requests = None;
                Err(failed("lookup worker exited without a result".to_string()))
            }
        }
    }

    fn requests(&mut self, name: &str) -> Result<Sender<LookupRequest>, LocateError> {
        if let Some(requests) = &self.requests {
            return Ok(requests.clone());
        }
        let (tx, rx) = crossbeam_channel::unbounded::<LookupRequest>();
        let lookup = Arc::clone(&self.lookup);
        let live = Arc::clone(&self.live);
        self.live.fetch_add(1, Ordering::AcqRel);
        let spawned = std::thread::Builder::new()
            .name("archon-lookup".into())
            .spawn(move || {
                for (name, reply) in rx {
                    let result = panic::catch_unwind(AssertUnwindSafe(|| lookup.resolve_by_name(&name)))
                        .unwrap_or_else(|_| {
                            Err(LocateError::LookupFailed {
                                name: name.clone(),
                                message: "lookup panicked".to_string(),
                            })
                        });
                    let _ = reply.send(result);
                }
                live.fetch_sub(1, Ordering::AcqRel);
            });
        if let Err(e) = spawned {
            self.live.fetch_sub(1, Ordering::AcqRel);
            return Err(LocateError::LookupFailed {
                name: name.to_string(),
                message: e.to_string(),
            });
        }
        self.spawned += 1;
        tracing::debug!(threads = self.spawned, "started lookup thread");
        self.requests = Some(tx.clone());
        Ok(tx)
    }
}
