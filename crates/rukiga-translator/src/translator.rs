use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use rukiga_dict::{Dictionary, FileSource, ForwardLookup, LoadError, LoadMode, TextSource};
use rukiga_types::{DictionaryEntry, Direction};
use serde::Serialize;
use tracing::{debug, error, info};

pub const UNAVAILABLE_MESSAGE: &str = "Dictionary not available";
const LOADER_THREAD_NAME: &str = "rukiga-dictionary-loader";

/// Process-wide handle to the dictionary, parsed on first use.
///
/// Any number of threads may query concurrently. The first one to find the
/// dictionary missing takes the load lock and parses the source; the rest
/// wait on the lock and then see the published result. A failed load is not
/// remembered, so the next query tries again.
pub struct Translator {
    source: Box<dyn TextSource>,
    ready: AtomicBool,
    preloading: AtomicBool,
    load_lock: Mutex<()>,
    dictionary: OnceLock<Arc<Dictionary>>,
}

/// Snapshot of the load state, cheap to take and never triggers a load.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct LoadStatus {
    pub loaded: bool,
    pub headwords: usize,
    pub entries: usize,
}

/// Result of [`Translator::translate`], shaped by direction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Translation {
    ToEnglish(ForwardLookup),
    ToRukiga(Vec<DictionaryEntry>),
}

impl Translation {
    pub fn is_found(&self) -> bool {
        match self {
            Translation::ToEnglish(lookup) => lookup.is_found(),
            Translation::ToRukiga(entries) => !entries.is_empty(),
        }
    }
}

impl Translator {
    pub fn new(source: impl TextSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            ready: AtomicBool::new(false),
            preloading: AtomicBool::new(false),
            load_lock: Mutex::new(()),
            dictionary: OnceLock::new(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>, mode: LoadMode) -> Self {
        Self::new(FileSource::with_mode(path, mode))
    }

    pub fn source_name(&self) -> String {
        self.source.describe()
    }

    pub fn is_loaded(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub fn status(&self) -> LoadStatus {
        match self.loaded() {
            Some(dict) => LoadStatus {
                loaded: true,
                headwords: dict.headword_count(),
                entries: dict.entry_count(),
            },
            None => LoadStatus::default(),
        }
    }

    fn loaded(&self) -> Option<&Arc<Dictionary>> {
        if self.ready.load(Ordering::Acquire) {
            self.dictionary.get()
        } else {
            None
        }
    }

    /// Return the dictionary, parsing the source first if nobody has yet.
    pub fn ensure_loaded(&self) -> Result<Arc<Dictionary>, LoadError> {
        if let Some(dict) = self.loaded() {
            return Ok(Arc::clone(dict));
        }

        // The lock only serialises loaders; a panic while holding it leaves
        // nothing half-written behind.
        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(dict) = self.dictionary.get() {
            return Ok(Arc::clone(dict));
        }

        let start = Instant::now();
        let parsed = Arc::new(Dictionary::load(self.source.as_ref())?);
        let dict = Arc::clone(self.dictionary.get_or_init(|| parsed));
        self.ready.store(true, Ordering::Release);
        info!(
            "dictionary {} ready in {} ms",
            self.source.describe(),
            start.elapsed().as_millis()
        );
        Ok(dict)
    }

    /// Warm the dictionary on a background thread.
    ///
    /// Returns `None` without doing anything when the dictionary is already
    /// loaded or another preload is still running. Errors are logged only.
    pub fn preload(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.is_loaded()
            || self
                .preloading
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return None;
        }

        let this = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name(LOADER_THREAD_NAME.to_string())
            .spawn(move || {
                if let Err(err) = this.ensure_loaded() {
                    error!("failed to preload dictionary: {err}");
                }
                this.preloading.store(false, Ordering::Release);
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!("failed to spawn dictionary loader thread: {err}");
                self.preloading.store(false, Ordering::Release);
                None
            }
        }
    }

    /// Runyankore/Rukiga headword to English definitions.
    pub fn lookup_forward(&self, query: &str) -> Result<ForwardLookup, LoadError> {
        if query.trim().is_empty() {
            return Ok(ForwardLookup::Empty);
        }
        let dict = self.ensure_loaded()?;
        let result = dict.lookup_forward(query);
        debug!(query, found = result.is_found(), "forward lookup");
        Ok(result)
    }

    /// English text to Runyankore/Rukiga headwords.
    pub fn lookup_reverse(&self, query: &str) -> Result<Vec<DictionaryEntry>, LoadError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let dict = self.ensure_loaded()?;
        let matches: Vec<DictionaryEntry> =
            dict.lookup_reverse(query).into_iter().cloned().collect();
        debug!(query, matches = matches.len(), "reverse lookup");
        Ok(matches)
    }

    pub fn translate(&self, direction: Direction, query: &str) -> Result<Translation, LoadError> {
        match direction {
            Direction::RukigaToEnglish => self.lookup_forward(query).map(Translation::ToEnglish),
            Direction::EnglishToRukiga => self.lookup_reverse(query).map(Translation::ToRukiga),
        }
    }

    /// Forward lookup rendered as display text; a load failure becomes
    /// [`UNAVAILABLE_MESSAGE`].
    pub fn translate_to_target(&self, query: &str) -> String {
        match self.lookup_forward(query) {
            Ok(result) => result.to_string(),
            Err(err) => {
                error!("dictionary lookup failed while loading: {err}");
                UNAVAILABLE_MESSAGE.to_string()
            }
        }
    }

    /// Reverse lookup; a load failure yields an empty list. Check
    /// [`Translator::is_loaded`] to tell the two apart.
    pub fn translate_to_source(&self, query: &str) -> Vec<DictionaryEntry> {
        self.lookup_reverse(query).unwrap_or_else(|err| {
            error!("dictionary reverse lookup failed while loading: {err}");
            Vec::new()
        })
    }
}
