//! Station name → table slot hashing.

use std::{hash::Hasher, ops::BitXor};

/// Index into the station table.
pub type SlotKey = u16;

/// A hash strategy mapping station names straight to table slots.
///
/// Bytes are fed one at a time through [`Hasher::write_u8`] while the scanner
/// looks for the `;`, so `write` must be equivalent to `write_u8` over each
/// byte in order.
pub trait KeyHasher: Hasher + Default {
    /// Name used in logs and by the diagnostics tool.
    const NAME: &'static str;

    fn key(&self) -> SlotKey;

    #[inline]
    fn hash_name(name: &[u8]) -> SlotKey {
        let mut hasher = Self::default();
        hasher.write(name);
        hasher.key()
    }
}

/// `h = rotl16(h, 2) ^ byte`.
///
/// Cheap enough to run inline with the delimiter search. Distinct names are
/// assumed to land on distinct slots, which holds for the station pool it was
/// picked for but is easy to break: `"AD"` and `"BH"` share a key.
#[derive(Default, Clone, Copy)]
pub struct RollingHash {
    hash: u16,
}

impl Hasher for RollingHash {
    #[inline]
    fn write_u8(&mut self, i: u8) {
        self.hash = self.hash.rotate_left(2).bitxor(i as u16);
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_u8(b);
        }
    }

    fn finish(&self) -> u64 {
        self.hash as u64
    }
}

impl KeyHasher for RollingHash {
    const NAME: &'static str = "rolling";

    #[inline]
    fn key(&self) -> SlotKey {
        self.hash
    }
}

/// FxHash from firefox/rustc, fed byte-wise and folded to the top 16 bits.
#[derive(Default, Clone, Copy)]
pub struct FxHash {
    hash: u64,
}

impl FxHash {
    const K: u64 = 0x517cc1b727220a95;
}

impl Hasher for FxHash {
    #[inline]
    fn write_u8(&mut self, i: u8) {
        self.hash = self.hash.rotate_left(5).bitxor(i as u64).wrapping_mul(Self::K);
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_u8(b);
        }
    }

    fn finish(&self) -> u64 {
        self.hash
    }
}

impl KeyHasher for FxHash {
    const NAME: &'static str = "fx";

    #[inline]
    fn key(&self) -> SlotKey {
        (self.hash >> 48) as SlotKey
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incremental<H: KeyHasher>(name: &[u8]) -> SlotKey {
        let mut h = H::default();
        for &b in name {
            h.write_u8(b);
        }
        h.key()
    }

    #[test]
    fn test_rolling_hash() {
        assert_eq!(RollingHash::hash_name(b""), 0);
        assert_eq!(RollingHash::hash_name(b"A"), 0x41);
        // (0x41 << 2) ^ 0x44
        assert_eq!(RollingHash::hash_name(b"AD"), 0x140);
        // rotation wraps at 16 bits
        let mut h = RollingHash { hash: 0xC000 };
        h.write_u8(0);
        assert_eq!(h.key(), 0x0003);
    }

    #[test]
    fn test_rolling_hash_bytes_are_unsigned() {
        assert_eq!(RollingHash::hash_name(&[0xc3]), 0x00c3);
        // "é" = c3 a9: (0xc3 << 2) ^ 0xa9
        assert_eq!(RollingHash::hash_name("é".as_bytes()), 0x03a5);
    }

    #[test]
    fn test_rolling_hash_known_collision() {
        assert_eq!(RollingHash::hash_name(b"AD"), RollingHash::hash_name(b"BH"));
        assert_ne!(FxHash::hash_name(b"AD"), FxHash::hash_name(b"BH"));
    }

    #[test]
    fn test_incremental_matches_whole() {
        for name in [&b"Abha"[..], b"Petropavlovsk-Kamchatsky", "Zürich".as_bytes(), b""] {
            assert_eq!(incremental::<RollingHash>(name), RollingHash::hash_name(name));
            assert_eq!(incremental::<FxHash>(name), FxHash::hash_name(name));
        }
    }
}
