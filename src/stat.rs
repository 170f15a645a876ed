use {
    crate::source::StatsSource,
    std::{
        collections::BTreeMap,
        fmt::{self, Display},
        io::{self, Read},
        num::ParseIntError,
        str::FromStr,
    },
    thiserror::Error,
};

pub use self::{
    cpu_time::{CpuTime, Measurement},
    user_hz::UserHz,
};

mod cpu_time;
mod user_hz;

#[cfg(test)]
mod tests;

/// a snapshot of the cpus' statistics at a moment in time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    /// the aggregate of all cpus.
    pub system: CpuTime,
    /// each cpu, in ascending order.
    pub cpus: BTreeMap<CpuId, CpuTime>,
}

/// an entry in the `/proc/stat` kernel statistics table.
///
/// see `proc_stat(5)` for more information.
#[derive(Debug, Eq, PartialEq)]
pub enum Entry {
    /// the amount of time that the system ("cpu" line) spent in various states.
    AllCpu { time: CpuTime },
    /// the amount of time that a specific cpu ("cpuN" line) spent in various states.
    Cpu { id: CpuId, time: CpuTime },
    /// any other line. paging, interrupts, context switches and the like are not used here.
    Other,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CpuId(u32);

#[derive(Debug, Eq, Error, PartialEq)]
pub enum EntryParseError {
    #[error("invalid cpu id")]
    CpuIdParse(#[source] ParseIntError),
    #[error("invalid time value")]
    UserHzParse(#[source] ParseIntError),
    #[error("expected 8 to 10 time values, found {found}")]
    CpuTime { found: usize },
}

#[derive(Debug, Error)]
pub enum StatReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed line {line}")]
    Entry {
        line: usize,
        #[source]
        error: EntryParseError,
    },
    #[error("no aggregate cpu line")]
    MissingAggregate,
    #[error("line {line}: duplicate {row} entry")]
    Duplicate { line: usize, row: Row },
}

/// names a cpu line, for diagnostics.
#[derive(Debug, Eq, PartialEq)]
pub enum Row {
    AllCpu,
    Cpu(CpuId),
}

// === impl Snapshot ===

impl Snapshot {
    /// uses the given source to parse a snapshot of the cpu statistics.
    ///
    /// the source is read to completion before any parsing happens, so every cpu in the
    /// snapshot is observed at the same moment.
    pub fn read(stats: &impl StatsSource) -> Result<Snapshot, StatReadError> {
        let contents = {
            let mut contents = String::new();
            stats.open()?.read_to_string(&mut contents)?;
            contents
        };

        contents.parse()
    }
}

impl FromStr for Snapshot {
    type Err = StatReadError;
    fn from_str(contents: &str) -> Result<Self, Self::Err> {
        let mut system = None;
        let mut cpus = BTreeMap::new();

        for (i, line) in contents.lines().enumerate() {
            let line_no = i + 1;
            let entry = line.parse::<Entry>().map_err(|error| StatReadError::Entry {
                line: line_no,
                error,
            })?;

            let duplicate = match entry {
                Entry::AllCpu { time } => system.replace(time).map(|_| Row::AllCpu),
                Entry::Cpu { id, time } => cpus.insert(id, time).map(|_| Row::Cpu(id)),
                Entry::Other => None,
            };

            if let Some(row) = duplicate {
                return Err(StatReadError::Duplicate { line: line_no, row });
            }
        }

        let system = system.ok_or(StatReadError::MissingAggregate)?;

        Ok(Snapshot { system, cpus })
    }
}

// === impl Entry ===

impl FromStr for Entry {
    type Err = EntryParseError;
    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let mut tokens = entry.split_whitespace();

        let Some(suffix) = tokens.next().and_then(|kind| kind.strip_prefix("cpu")) else {
            return Ok(Self::Other);
        };

        let id = Self::parse_cpu_id(suffix)?;

        let time = tokens
            .map(str::parse::<UserHz>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(EntryParseError::UserHzParse)
            .and_then(CpuTime::try_from)?;

        Ok(if let Some(id) = id {
            Self::Cpu { id, time }
        } else {
            Self::AllCpu { time }
        })
    }
}

impl Entry {
    /// parses what follows the "cpu" prefix of a line.
    fn parse_cpu_id(suffix: &str) -> Result<Option<CpuId>, EntryParseError> {
        // if there is no suffix, this is the aggregate line.
        if suffix.is_empty() {
            return Ok(None);
        }

        suffix
            .parse::<u32>()
            .map(CpuId)
            .map(Some)
            .map_err(EntryParseError::CpuIdParse)
    }
}

// === impl CpuId ===

impl From<u32> for CpuId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for CpuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(id) = self;
        write!(f, "cpu{id}")
    }
}

// === impl Row ===

impl Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllCpu => f.write_str("cpu"),
            Self::Cpu(id) => Display::fmt(id, f),
        }
    }
}
