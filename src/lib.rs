pub mod config;
pub mod cursor;
pub mod error;
pub mod hash;
pub mod report;
pub mod scan;
pub mod table;
pub mod temp;

#[cfg(test)]
mod test;

use std::{
    fs::File,
    io::{BufWriter, Write},
    ops::Deref,
    path::Path,
    time::Instant,
};

use log::{debug, info};
use memmap2::Mmap;

pub use config::{CollisionPolicy, Config, HashStrategy, InputMode};
pub use error::{Error, MalformedInput, MalformedKind, Result};
pub use hash::{FxHash, KeyHasher, RollingHash, SlotKey};
pub use report::{Report, Row, Summary};
pub use scan::{partition, scan_into, Record, Records, ScanOptions};
pub use table::{Station, StationTable};
pub use temp::Tenths;

/// The whole input file, mapped read-only and unmapped on drop.
pub struct InputBuffer {
    mmap: Option<Mmap>,
}

impl InputBuffer {
    pub fn open(path: &Path) -> Result<Self> {
        let file_open = |source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(file_open)?;
        let len = file.metadata().map_err(file_open)?.len();
        if len == 0 {
            // Zero-length mappings are rejected by the OS.
            return Ok(Self { mmap: None });
        }
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| Error::Map {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("mapped {} bytes of {}", mmap.len(), path.display());
        Ok(Self { mmap: Some(mmap) })
    }
}

impl Deref for InputBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.mmap.as_deref().unwrap_or_default()
    }
}

/// Aggregate every line of `buf` with the configured hash strategy.
pub fn aggregate(buf: &[u8], config: &Config) -> Result<StationTable> {
    match config.hash {
        HashStrategy::Rolling => aggregate_with::<RollingHash>(buf, config),
        HashStrategy::Fx => aggregate_with::<FxHash>(buf, config),
    }
}

pub fn aggregate_with<H: KeyHasher>(buf: &[u8], config: &Config) -> Result<StationTable> {
    let mut table = StationTable::new(config.collision_policy);
    let lines = scan_into::<H>(buf, &mut table, ScanOptions::from(config))?;
    debug!(
        "scanned {} lines into {} stations with the {} hash",
        lines,
        table.stations(),
        H::NAME
    );
    Ok(table)
}

/// Aggregate `buf` as up to `parts` newline-aligned partitions, each into its
/// own table, and merge the tables. Produces the same statistics as
/// [`aggregate`].
pub fn aggregate_partitioned(buf: &[u8], parts: usize, config: &Config) -> Result<StationTable> {
    let mut merged = StationTable::new(config.collision_policy);
    for range in partition(buf, parts) {
        let part = aggregate(&buf[range.clone()], config).map_err(|err| match err {
            Error::Malformed(err) => Error::Malformed(MalformedInput {
                line: err.line + lines_before(buf, range.start),
                offset: err.offset + range.start,
                kind: err.kind,
            }),
            err => err,
        })?;
        merged.merge(&part);
    }
    Ok(merged)
}

#[cold]
fn lines_before(buf: &[u8], offset: usize) -> u64 {
    buf[..offset].iter().filter(|&&c| c == b'\n').count() as u64
}

/// Aggregate the file at `path` and write the report to `out`.
///
/// The returned summary is meant for a diagnostic stream separate from `out`.
pub fn run<W: Write>(path: &Path, config: &Config, out: W) -> Result<Summary> {
    let input = InputBuffer::open(path)?;
    let start = Instant::now();
    let table = aggregate(&input, config)?;
    info!(
        "aggregated {} bytes in {:.2?} ({:?} input, {:?})",
        input.len(),
        start.elapsed(),
        config.input_mode,
        config.collision_policy
    );

    let report = Report::new(&table);
    let mut out = BufWriter::new(out);
    report.write_to(&mut out)?;
    out.flush()?;
    Ok(report.summary(config))
}
