//! Fixed-point temperatures in tenths of a degree.
//!
//! Parsing only understands the `%.1f` encoding the measurement files use, and
//! formatting only ever produces it. Neither goes through float parsing or
//! float formatting.

use std::fmt;

use crate::{cursor::Cursor, error::MalformedKind};

#[inline]
fn digit(c: u8) -> i32 {
    (c - b'0') as i32
}

/// Parse a temperature field and leave the cursor just past its newline.
///
/// Precondition: the cursor sits on `-?\d+\.\d\n`. Nothing is validated, a
/// field of any other shape yields an unspecified value or panics on a bounds
/// check once the cursor runs off the buffer.
#[inline]
pub fn parse_tenths(cur: &mut Cursor<'_>) -> i32 {
    let mut sign = 1;
    if cur.byte() == b'-' {
        sign = -1;
        cur.advance(1);
    }
    let (abs_temp, temp_len) = match cur.window(4) {
        [b, b'.', c, _] => (10 * digit(*b) + digit(*c), 3),
        [a, b, b'.', c] => (100 * digit(*a) + 10 * digit(*b) + digit(*c), 4),
        _ => return sign * parse_long_tenths(cur),
    };
    cur.advance(temp_len + 1);
    sign * abs_temp
}

/// Slow path for integer parts of three or more digits.
#[cold]
fn parse_long_tenths(cur: &mut Cursor<'_>) -> i32 {
    let mut t = 0;
    while cur.byte() != b'.' {
        t = t * 10 + digit(cur.byte());
        cur.advance(1);
    }
    cur.advance(1);
    t = t * 10 + digit(cur.byte());
    cur.advance(2);
    t
}

/// Parse exactly `-?\d{1,2}\.\d\n`, leaving the cursor past the newline.
///
/// On error the cursor position is unspecified.
pub fn try_parse_tenths(cur: &mut Cursor<'_>) -> Result<i32, MalformedKind> {
    let mut sign = 1;
    if cur.peek() == Some(b'-') {
        sign = -1;
        cur.advance(1);
    }
    let field = cur.take_until(b'\n').ok_or(MalformedKind::MissingNewline)?;
    let abs_temp = match field {
        [b, b'.', c] if b.is_ascii_digit() && c.is_ascii_digit() => 10 * digit(*b) + digit(*c),
        [a, b, b'.', c] if a.is_ascii_digit() && b.is_ascii_digit() && c.is_ascii_digit() => {
            100 * digit(*a) + 10 * digit(*b) + digit(*c)
        }
        _ => return Err(MalformedKind::BadTemperature),
    };
    cur.advance(1);
    Ok(sign * abs_temp)
}

/// Mean of `count` readings summing to `sum`, in tenths, rounded half away
/// from zero.
///
/// Exact integer arithmetic, so `.x5` boundaries round the same way on every
/// platform: `-0.05` becomes `-0.1` and `0.25` becomes `0.3`.
pub fn mean_tenths(sum: i64, count: u32) -> i32 {
    if count == 0 {
        return 0;
    }
    let count = count as i128;
    let abs = ((2 * (sum as i128).abs() + count) / (2 * count)) as i32;
    if sum < 0 {
        -abs
    } else {
        abs
    }
}

/// Longest rendering of an `i32` in tenths: `-214748364.8`.
pub const TENTHS_MAX_LEN: usize = 12;

/// Write `t` as `[-]<int>.<frac>` into the tail of `buf`, returning the
/// written bytes. Zero is always `0.0`, never `-0.0`.
pub fn write_tenths(t: i32, buf: &mut [u8; TENTHS_MAX_LEN]) -> &[u8] {
    let mut n = t.unsigned_abs();
    let mut p = TENTHS_MAX_LEN;

    p -= 1;
    buf[p] = (n % 10) as u8 + b'0';
    p -= 1;
    buf[p] = b'.';
    n /= 10;
    loop {
        p -= 1;
        buf[p] = (n % 10) as u8 + b'0';
        n /= 10;
        if n == 0 {
            break;
        }
    }
    if t < 0 {
        p -= 1;
        buf[p] = b'-';
    }
    &buf[p..]
}

/// A temperature in tenths of a degree, displayed with one fractional digit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tenths(pub i32);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; TENTHS_MAX_LEN];
        let bytes = write_tenths(self.0, &mut buf);
        // Only ASCII digits, '.' and '-' are ever written.
        f.write_str(std::str::from_utf8(bytes).map_err(|_| fmt::Error)?)
    }
}
