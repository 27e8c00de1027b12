//! Asset loader boundary: encoded bytes in, decoded pixels out, asynchronously.
//!
//! The editor submits [`DecodeJob`]s and later drains [`DecodeCompletion`]s on its own
//! thread. Loaders never touch the scene.

use std::{
    collections::{HashMap, VecDeque},
    panic::{AssertUnwindSafe, catch_unwind},
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
};

use crate::{
    assets::decode::{DecodedImage, decode_image},
    assets::source::ImageSource,
    foundation::error::{EditorError, EditorResult},
};

/// Correlates a submitted job with its completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecodeTicket(pub u64);

#[derive(Clone, Debug)]
pub struct DecodeJob {
    pub ticket: DecodeTicket,
    pub source: ImageSource,
}

#[derive(Debug)]
pub struct DecodeCompletion {
    pub ticket: DecodeTicket,
    pub result: EditorResult<Arc<DecodedImage>>,
}

pub trait AssetLoader {
    /// Queue a decode. Never blocks on decoding.
    fn submit(&mut self, job: DecodeJob);

    /// Drain completions that are ready now.
    fn poll(&mut self) -> Vec<DecodeCompletion>;

    /// Block until at least one completion is ready, unless nothing is in flight.
    fn wait(&mut self) -> Vec<DecodeCompletion> {
        self.poll()
    }

    /// Jobs submitted but not yet returned by `poll`/`wait`.
    fn in_flight(&self) -> usize;
}

/// Turns an [`ImageSource`] into encoded bytes.
///
/// Linked URIs resolve first against registered bytes, then against an optional
/// filesystem root using normalized relative paths.
#[derive(Clone, Debug, Default)]
pub struct SourceResolver {
    root: Option<PathBuf>,
    registered: HashMap<String, Arc<Vec<u8>>>,
}

impl SourceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            registered: HashMap::new(),
        }
    }

    /// Make `uri` resolvable without touching the filesystem.
    pub fn register(&mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.registered.insert(uri.into(), Arc::new(bytes.into()));
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn resolve(&self, source: &ImageSource) -> EditorResult<Arc<Vec<u8>>> {
        match source {
            ImageSource::Embedded { bytes } => Ok(Arc::clone(bytes)),
            ImageSource::Linked { uri } => {
                if let Some(bytes) = self.registered.get(uri) {
                    return Ok(Arc::clone(bytes));
                }
                let Some(root) = &self.root else {
                    return Err(EditorError::rejected(format!(
                        "linked image '{uri}' is not registered and no asset root is set"
                    )));
                };
                let norm = normalize_rel_path(uri)?;
                let path = root.join(Path::new(&norm));
                let bytes = std::fs::read(&path).map_err(|e| {
                    EditorError::decode(format!("failed to read '{}': {e}", path.display()))
                })?;
                Ok(Arc::new(bytes))
            }
        }
    }

    fn load(&self, source: &ImageSource) -> EditorResult<Arc<DecodedImage>> {
        let bytes = self.resolve(source)?;
        decode_image(&bytes).map(Arc::new)
    }
}

/// Normalize a relative asset path: forward slashes, no `.`/`..`, not absolute.
pub fn normalize_rel_path(source: &str) -> EditorResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(EditorError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(EditorError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(EditorError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(EditorError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Decodes on the caller's thread at submit time and hands results out on the next poll.
///
/// Completion order equals submit order, which keeps tests deterministic.
#[derive(Debug, Default)]
pub struct InlineLoader {
    resolver: SourceResolver,
    ready: VecDeque<DecodeCompletion>,
}

impl InlineLoader {
    pub fn new(resolver: SourceResolver) -> Self {
        Self {
            resolver,
            ready: VecDeque::new(),
        }
    }

    pub fn resolver_mut(&mut self) -> &mut SourceResolver {
        &mut self.resolver
    }
}

impl AssetLoader for InlineLoader {
    fn submit(&mut self, job: DecodeJob) {
        let result = self.resolver.load(&job.source);
        self.ready.push_back(DecodeCompletion {
            ticket: job.ticket,
            result,
        });
    }

    fn poll(&mut self) -> Vec<DecodeCompletion> {
        self.ready.drain(..).collect()
    }

    fn in_flight(&self) -> usize {
        self.ready.len()
    }
}

/// Decodes on the rayon pool; completions come back over a channel.
#[derive(Debug)]
pub struct ThreadedLoader {
    resolver: Arc<SourceResolver>,
    tx: mpsc::Sender<DecodeCompletion>,
    rx: mpsc::Receiver<DecodeCompletion>,
    in_flight: usize,
}

impl ThreadedLoader {
    pub fn new(resolver: SourceResolver) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            resolver: Arc::new(resolver),
            tx,
            rx,
            in_flight: 0,
        }
    }
}

impl AssetLoader for ThreadedLoader {
    fn submit(&mut self, job: DecodeJob) {
        let resolver = Arc::clone(&self.resolver);
        let tx = self.tx.clone();
        self.in_flight += 1;
        rayon::spawn(move || {
            let result = contain_panic(|| resolver.load(&job.source));
            // The receiver lives as long as the loader; a send error means it was dropped.
            let _ = tx.send(DecodeCompletion {
                ticket: job.ticket,
                result,
            });
        });
    }

    fn poll(&mut self) -> Vec<DecodeCompletion> {
        let out: Vec<_> = self.rx.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(out.len());
        out
    }

    fn wait(&mut self) -> Vec<DecodeCompletion> {
        if self.in_flight == 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        if let Ok(first) = self.rx.recv() {
            out.push(first);
        }
        out.extend(self.rx.try_iter());
        self.in_flight = self.in_flight.saturating_sub(out.len());
        out
    }

    fn in_flight(&self) -> usize {
        self.in_flight
    }
}

/// Run a decode on a pool thread, turning a panic into a decode error so the
/// completion is still delivered.
fn contain_panic<T>(f: impl FnOnce() -> EditorResult<T>) -> EditorResult<T> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        tracing::error!(panic = %msg, "image decode panicked");
        Err(EditorError::decode(format!("decoder panicked: {msg}")))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
