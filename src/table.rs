//! Fixed-size station table addressed directly by slot key.

use std::collections::HashMap;

use log::warn;

use crate::{config::CollisionPolicy, hash::SlotKey, temp::mean_tenths};

/// One slot per possible 16-bit key.
pub const TABLE_SLOTS: usize = 1 << 16;
/// Bytes of name stored inline in a slot. Callers must not record longer names.
pub const NAME_CAPACITY: usize = 100;

/// Running statistics of one station, in tenths of a degree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Station {
    pub sum: i64,
    pub count: u32,
    pub min: i32,
    pub max: i32,
}

impl Default for Station {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Station {
    /// No readings. The extrema sentinels lose against any real reading.
    pub const EMPTY: Station = Station {
        sum: 0,
        count: 0,
        min: i32::MAX,
        max: i32::MIN,
    };

    pub fn new(temp: i32) -> Self {
        Self {
            sum: temp as i64,
            count: 1,
            min: temp,
            max: temp,
        }
    }

    #[inline]
    pub fn update(&mut self, temp: i32) {
        self.sum += temp as i64;
        self.count += 1;
        self.min = self.min.min(temp);
        self.max = self.max.max(temp);
    }

    pub fn merge(&mut self, other: &Station) {
        self.sum += other.sum;
        self.count += other.count;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean in tenths, see [`mean_tenths`] for the rounding rule.
    pub fn mean(&self) -> i32 {
        mean_tenths(self.sum, self.count)
    }
}

#[derive(Clone)]
struct Slot {
    station: Station,
    name_len: u8,
    name: [u8; NAME_CAPACITY],
}

impl Slot {
    const EMPTY: Slot = Slot {
        station: Station::EMPTY,
        name_len: 0,
        name: [0; NAME_CAPACITY],
    };

    fn name(&self) -> &[u8] {
        &self.name[..self.name_len as usize]
    }

    fn set_name(&mut self, name: &[u8]) {
        self.name[..name.len()].copy_from_slice(name);
        self.name_len = name.len() as u8;
    }
}

/// A populated station as seen by the reporter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StationEntry<'a> {
    pub name: &'a [u8],
    pub station: Station,
}

/// Per-run aggregation state: [`TABLE_SLOTS`] slots indexed by key, plus an
/// overflow map that only [`CollisionPolicy::Verify`] ever fills.
pub struct StationTable {
    slots: Box<[Slot]>,
    policy: CollisionPolicy,
    /// Names that lost their slot to a different name, with the key they hashed to.
    overflow: HashMap<Box<[u8]>, (SlotKey, Station)>,
}

impl Default for StationTable {
    fn default() -> Self {
        Self::new(CollisionPolicy::default())
    }
}

impl StationTable {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            slots: vec![Slot::EMPTY; TABLE_SLOTS].into_boxed_slice(),
            policy,
            overflow: HashMap::new(),
        }
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Add one reading for `name`, which hashed to `key`.
    ///
    /// # Panics
    ///
    /// If `name` is longer than [`NAME_CAPACITY`] and is the first name seen
    /// for its slot.
    #[inline]
    pub fn record(&mut self, key: SlotKey, name: &[u8], temp: i32) {
        let verify = self.policy == CollisionPolicy::Verify;
        let slot = &mut self.slots[key as usize];
        if slot.station.count == 0 {
            slot.set_name(name);
        } else if verify && slot.name() != name {
            self.record_overflow(key, name, Station::new(temp));
            return;
        }
        slot.station.update(temp);
    }

    /// Fold already aggregated statistics for `name` into the table.
    fn absorb(&mut self, key: SlotKey, name: &[u8], station: &Station) {
        let verify = self.policy == CollisionPolicy::Verify;
        let slot = &mut self.slots[key as usize];
        if slot.station.count == 0 {
            slot.set_name(name);
        } else if verify && slot.name() != name {
            self.record_overflow(key, name, *station);
            return;
        }
        slot.station.merge(station);
    }

    #[cold]
    fn record_overflow(&mut self, key: SlotKey, name: &[u8], station: Station) {
        if let Some((_, existing)) = self.overflow.get_mut(name) {
            existing.merge(&station);
            return;
        }
        warn!(
            "slot {:#06x} already holds {:?}, moving {:?} to the overflow map",
            key,
            String::from_utf8_lossy(self.slots[key as usize].name()),
            String::from_utf8_lossy(name),
        );
        self.overflow.insert(name.into(), (key, station));
    }

    /// Merge a partial table built over a disjoint part of the input.
    ///
    /// Statistics combine commutatively and associatively. Under
    /// [`CollisionPolicy::FirstSeenWins`] the name kept for a shared slot is
    /// whichever `self` saw first.
    pub fn merge(&mut self, other: &StationTable) {
        for (key, slot) in other.slots.iter().enumerate() {
            if slot.station.count > 0 {
                self.absorb(key as SlotKey, slot.name(), &slot.station);
            }
        }
        for (name, (key, station)) in &other.overflow {
            self.absorb(*key, name, station);
        }
    }

    /// Every station with at least one reading, in no particular order.
    pub fn snapshot(&self) -> Vec<StationEntry<'_>> {
        self.slots
            .iter()
            .filter(|slot| slot.station.count > 0)
            .map(|slot| StationEntry {
                name: slot.name(),
                station: slot.station,
            })
            .chain(self.overflow.iter().map(|(name, (_, station))| StationEntry {
                name,
                station: *station,
            }))
            .collect()
    }

    /// Number of names diverted to the overflow map.
    pub fn collisions(&self) -> usize {
        self.overflow.len()
    }

    /// Number of distinct stations.
    pub fn stations(&self) -> usize {
        self.slots.iter().filter(|slot| slot.station.count > 0).count() + self.overflow.len()
    }

    /// Total readings recorded.
    pub fn records(&self) -> u64 {
        self.slots
            .iter()
            .map(|slot| slot.station.count as u64)
            .chain(self.overflow.values().map(|(_, station)| station.count as u64))
            .sum()
    }
}
