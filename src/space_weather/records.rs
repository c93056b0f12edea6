//! Line-oriented historical record sources
//!
//! The index files are never written. A source is either re-opened read-only
//! on every scan ([`RecordFile`]) or read once and held for the process
//! lifetime ([`RecordCache`]).

use crate::errors::{DensityError, ResolveResult};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A read-only source of historical index records
pub trait RecordSource: Send + Sync {
    /// Visit every line in file order
    fn scan(&self, visit: &mut dyn FnMut(&str)) -> ResolveResult<()>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}

/// Record file opened fresh on every scan
#[derive(Debug, Clone)]
pub struct RecordFile {
    path: PathBuf,
}

impl RecordFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File re-read by each scan
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for RecordFile {
    /// Stray non-UTF-8 bytes are replaced rather than failing the scan
    fn scan(&self, visit: &mut dyn FnMut(&str)) -> ResolveResult<()> {
        let file = File::open(&self.path).map_err(|e| DensityError::io(&self.path, e))?;
        let mut reader = BufReader::new(file);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| DensityError::io(&self.path, e))?;
            if read == 0 {
                break;
            }
            visit(&String::from_utf8_lossy(trim_line_end(&buf)));
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Record lines loaded once and shared
#[derive(Debug, Clone)]
pub struct RecordCache {
    origin: String,
    lines: Arc<[String]>,
}

impl RecordCache {
    /// Read a record file into memory
    pub fn load(path: impl AsRef<Path>) -> ResolveResult<Self> {
        let path = path.as_ref();
        log::info!("Loading index records from {:?}", path);

        let mut lines = Vec::new();
        RecordFile::new(path).scan(&mut |line| lines.push(line.to_string()))?;

        log::info!("Loaded {} index records from {:?}", lines.len(), path);
        Ok(Self {
            origin: path.display().to_string(),
            lines: lines.into(),
        })
    }

    /// Wrap in-memory record text
    pub fn from_text(origin: impl Into<String>, text: &str) -> Self {
        Self {
            origin: origin.into(),
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    /// Number of held lines
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl RecordSource for RecordCache {
    fn scan(&self, visit: &mut dyn FnMut(&str)) -> ResolveResult<()> {
        for line in self.lines.iter() {
            visit(line);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        self.origin.clone()
    }
}

/// Open a record path either cached or per call
pub fn open_records(path: impl AsRef<Path>, cache: bool) -> ResolveResult<Box<dyn RecordSource>> {
    let path = path.as_ref();
    if cache {
        Ok(Box::new(RecordCache::load(path)?))
    } else {
        Ok(Box::new(RecordFile::new(path)))
    }
}
