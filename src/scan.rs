//! Single pass over the input buffer, one table update per line.

use std::{marker::PhantomData, ops::Range};

use crate::{
    config::{Config, InputMode},
    cursor::Cursor,
    error::{MalformedInput, MalformedKind},
    hash::{KeyHasher, SlotKey},
    table::{StationTable, NAME_CAPACITY},
    temp::{parse_tenths, try_parse_tenths},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    pub mode: InputMode,
    /// Clamped to [`NAME_CAPACITY`].
    pub max_name_len: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ScanOptions {
    fn from(config: &Config) -> Self {
        Self {
            mode: config.input_mode,
            max_name_len: config.max_name_len,
        }
    }
}

/// One parsed line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record<'a> {
    pub key: SlotKey,
    pub name: &'a [u8],
    pub temp: i32,
}

/// Iterator over the lines of a buffer.
///
/// Only the newline-terminated prefix of the buffer is parsed; trailing bytes
/// after the last `\n` come out as a [`MalformedKind::MissingNewline`] error.
/// Iteration stops after the first error.
pub struct Records<'a, H> {
    cursor: Cursor<'a>,
    tail: &'a [u8],
    mode: InputMode,
    max_name_len: usize,
    line: u64,
    done: bool,
    _hasher: PhantomData<H>,
}

impl<'a, H: KeyHasher> Records<'a, H> {
    pub fn new(buf: &'a [u8], options: ScanOptions) -> Self {
        let end = buf.iter().rposition(|&c| c == b'\n').map_or(0, |i| i + 1);
        Self {
            cursor: Cursor::new(&buf[..end]),
            tail: &buf[end..],
            mode: options.mode,
            max_name_len: options.max_name_len.min(NAME_CAPACITY),
            line: 0,
            done: false,
            _hasher: PhantomData,
        }
    }

    /// Lines yielded so far, including a failed one.
    pub fn lines(&self) -> u64 {
        self.line
    }

    #[inline]
    fn next_trusted(&mut self) -> Result<Record<'a>, MalformedKind> {
        let start = self.cursor.pos();
        let mut hasher = H::default();
        loop {
            match self.cursor.byte() {
                b';' => break,
                b'\n' => return Err(MalformedKind::MissingDelimiter),
                c => {
                    hasher.write_u8(c);
                    self.cursor.advance(1);
                }
            }
        }
        let name = self.cursor.since(start);
        if name.len() > self.max_name_len {
            return Err(self.name_too_long(name));
        }
        self.cursor.advance(1);
        let temp = parse_tenths(&mut self.cursor);
        Ok(Record {
            key: hasher.key(),
            name,
            temp,
        })
    }

    fn next_validated(&mut self) -> Result<Record<'a>, MalformedKind> {
        let start = self.cursor.pos();
        let mut hasher = H::default();
        loop {
            match self.cursor.peek() {
                Some(b';') => break,
                Some(b'\n') | None => return Err(MalformedKind::MissingDelimiter),
                Some(c) => {
                    hasher.write_u8(c);
                    self.cursor.advance(1);
                }
            }
        }
        let name = self.cursor.since(start);
        if name.is_empty() {
            return Err(MalformedKind::EmptyName);
        }
        if name.len() > self.max_name_len {
            return Err(self.name_too_long(name));
        }
        self.cursor.advance(1);
        let temp = try_parse_tenths(&mut self.cursor)?;
        Ok(Record {
            key: hasher.key(),
            name,
            temp,
        })
    }

    #[cold]
    fn name_too_long(&self, name: &[u8]) -> MalformedKind {
        MalformedKind::NameTooLong {
            len: name.len(),
            max: self.max_name_len,
        }
    }
}

impl<'a, H: KeyHasher> Iterator for Records<'a, H> {
    type Item = Result<Record<'a>, MalformedInput>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let offset = self.cursor.pos();
        if self.cursor.is_at_end() {
            self.done = true;
            if self.tail.is_empty() {
                return None;
            }
            self.line += 1;
            return Some(Err(MalformedInput {
                line: self.line,
                offset,
                kind: MalformedKind::MissingNewline,
            }));
        }

        self.line += 1;
        let record = match self.mode {
            InputMode::Trusted => self.next_trusted(),
            InputMode::Validated => self.next_validated(),
        };
        Some(record.map_err(|kind| {
            self.done = true;
            MalformedInput {
                line: self.line,
                offset,
                kind,
            }
        }))
    }
}

/// Scan every line of `buf` into `table`, returning the number of lines.
pub fn scan_into<H: KeyHasher>(
    buf: &[u8],
    table: &mut StationTable,
    options: ScanOptions,
) -> Result<u64, MalformedInput> {
    let mut records = Records::<H>::new(buf, options);
    for record in &mut records {
        let record = record?;
        table.record(record.key, record.name, record.temp);
    }
    Ok(records.lines())
}

/// Split `buf` into at most `parts` contiguous ranges that each end just
/// after a newline (the last one ends at `buf.len()`).
pub fn partition(buf: &[u8], parts: usize) -> Vec<Range<usize>> {
    let chunk_size = buf.len().div_ceil(parts.max(1));
    let mut ranges = vec![];
    let mut start = 0;
    while start < buf.len() {
        let target = (start + chunk_size).min(buf.len());
        let end = buf[target - 1..]
            .iter()
            .position(|&c| c == b'\n')
            .map_or(buf.len(), |i| target + i);
        ranges.push(start..end);
        start = end;
    }
    ranges
}
