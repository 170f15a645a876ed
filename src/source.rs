//! abstracts over providers of statistics.

use std::{
    cell::RefCell,
    collections::VecDeque,
    fs::File,
    io::{self, BufReader, Cursor, Read},
    path::PathBuf,
};

/// a source of kernel statistics.
pub trait StatsSource {
    /// returns a reader.
    fn open(&self) -> io::Result<impl Read>;
}

/// stats backed by `/proc/stat`, or a file in the same format.
#[derive(Clone, Debug)]
pub struct ProcStatFile {
    path: PathBuf,
}

/// a mock stat source.
///
/// each call to [`StatsSource::open()`] yields the next scripted file. once the script is
/// exhausted, opening fails.
#[derive(Debug, Default)]
pub struct MockStatFile {
    stats: RefCell<VecDeque<String>>,
}

// === impl ProcStatFile ===

impl StatsSource for ProcStatFile {
    fn open(&self) -> io::Result<impl Read> {
        File::open(&self.path).map(BufReader::new)
    }
}

impl ProcStatFile {
    pub const STAT: &str = "/proc/stat";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcStatFile {
    fn default() -> Self {
        Self::new(Self::STAT)
    }
}

// === impl MockStatFile ===

impl StatsSource for MockStatFile {
    fn open(&self) -> io::Result<impl Read> {
        let Self { stats } = self;

        stats.borrow_mut().pop_front().map(Cursor::new).ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "mock stats are exhausted")
        })
    }
}

impl<S: Into<String>> FromIterator<S> for MockStatFile {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let stats = iter.into_iter().map(Into::into).collect();
        Self {
            stats: RefCell::new(stats),
        }
    }
}
