use std::fs::File;
use std::io::{BufRead, Cursor, Read};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::LoadError;

/// Default name of the bundled dictionary asset.
pub const DEFAULT_ASSET_NAME: &str = "rukiga_dictionary.txt";

/// Narrow "open and read lines" capability the loader depends on.
///
/// Implementations decide where the text lives (a file, an embedded string,
/// a bundled asset); the loader only ever asks for a fresh line reader.
pub trait TextSource: Send + Sync {
    /// Human-readable name used in logs and errors.
    fn describe(&self) -> String;

    /// Open a new reader positioned at the start of the text.
    fn open(&self) -> Result<Box<dyn BufRead + Send + '_>, LoadError>;
}

/// Strategy for reading a dictionary file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, no copy of the raw text).
    #[default]
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

impl LoadMode {
    pub fn from_name(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mmap" => Some(LoadMode::Mmap),
            "owned" => Some(LoadMode::Owned),
            _ => None,
        }
    }
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Dictionary text stored in a file on disk.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
    mode: LoadMode,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_mode(path, LoadMode::Mmap)
    }

    pub fn with_mode(path: impl Into<PathBuf>, mode: LoadMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    fn open_error(&self, source: std::io::Error) -> LoadError {
        LoadError::Open {
            source_name: self.describe(),
            source,
        }
    }
}

impl TextSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> Result<Box<dyn BufRead + Send + '_>, LoadError> {
        let mut file = File::open(&self.path).map_err(|e| self.open_error(e))?;
        let buffer = match self.mode {
            LoadMode::Mmap => {
                let len = file.metadata().map_err(|e| self.open_error(e))?.len();
                // Zero-length mappings are rejected by some platforms.
                if len == 0 {
                    Buffer::Owned(Vec::new())
                } else {
                    unsafe { Mmap::map(&file) }
                        .map(Buffer::Mmap)
                        .map_err(|e| self.open_error(e))?
                }
            }
            LoadMode::Owned => {
                let mut buf = Vec::new();
                file.read_to_end(&mut buf).map_err(|e| self.open_error(e))?;
                Buffer::Owned(buf)
            }
        };
        Ok(Box::new(Cursor::new(buffer)))
    }
}

/// Dictionary text held in memory, e.g. an `include_str!` resource.
#[derive(Clone, Debug)]
pub struct StaticSource {
    name: String,
    text: String,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

impl TextSource for StaticSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn open(&self) -> Result<Box<dyn BufRead + Send + '_>, LoadError> {
        Ok(Box::new(Cursor::new(self.text.as_bytes())))
    }
}
