//! Slot load of the station hash strategies over a set of names.
//!
//! ```text
//! collisions <stations.txt | measurements.txt>
//! collisions --random <n> [seed]
//! ```
//!
//! Names are taken from the part of each line before the first `;`.

use std::{
    collections::{BTreeMap, HashSet},
    env, fmt, fs,
};

use anyhow::{bail, Context, Result};
use onebrc_scan::{
    hash::{FxHash, KeyHasher, RollingHash, SlotKey},
    table::TABLE_SLOTS,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

struct Stats {
    names: usize,
    occupied: usize,
    max: usize,
    avg: f32,
    collided: usize,
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "names: {}, occupied: {}/{}, max: {}, avg: {:.3}, collided names: {}",
            self.names, self.occupied, TABLE_SLOTS, self.max, self.avg, self.collided
        ))
    }
}

fn load_names(path: &str) -> Result<Vec<Vec<u8>>> {
    let content = fs::read(path).with_context(|| format!("reading {}", path))?;
    let mut seen = HashSet::new();
    Ok(content
        .split(|&c| c == b'\n')
        .map(|line| line.split(|&c| c == b';').next().unwrap_or(line))
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(<[u8]>::to_vec)
        .collect())
}

fn random_names(n: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    while seen.len() < n {
        let len = rng.gen_range(3..=24);
        let mut name = vec![rng.gen_range(b'A'..=b'Z')];
        name.extend((1..len).map(|_| rng.gen_range(b'a'..=b'z')));
        seen.insert(name);
    }
    seen.into_iter().collect()
}

fn statistics<H: KeyHasher>(names: &[Vec<u8>]) -> (Stats, Vec<Vec<&[u8]>>) {
    let mut slots = BTreeMap::<SlotKey, Vec<&[u8]>>::new();
    for name in names {
        slots.entry(H::hash_name(name)).or_default().push(name);
    }
    let groups = slots
        .values()
        .filter(|group| group.len() > 1)
        .cloned()
        .collect::<Vec<_>>();
    let stats = Stats {
        names: names.len(),
        occupied: slots.len(),
        max: slots.values().map(Vec::len).max().unwrap_or(0),
        avg: names.len() as f32 / slots.len().max(1) as f32,
        collided: groups.iter().map(Vec::len).sum(),
    };
    (stats, groups)
}

fn report<H: KeyHasher>(names: &[Vec<u8>], list_groups: bool) {
    let (stats, groups) = statistics::<H>(names);
    println!("{:>8}: {}", H::NAME, stats);
    if list_groups {
        for group in groups {
            let key = H::hash_name(group[0]);
            let group = group
                .iter()
                .map(|name| String::from_utf8_lossy(name))
                .collect::<Vec<_>>();
            println!("          {:#06x} {:?}", key, group);
        }
    }
}

fn main() -> Result<()> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let (names, list_groups) = match args.iter().map(String::as_str).collect::<Vec<_>>()[..] {
        ["--random", n] => (random_names(n.parse().context("name count")?, 0), false),
        ["--random", n, seed] => (
            random_names(
                n.parse().context("name count")?,
                seed.parse().context("seed")?,
            ),
            false,
        ),
        [path] => (load_names(path)?, true),
        _ => bail!("Usage: collisions <names.txt> | --random <n> [seed]"),
    };
    report::<RollingHash>(&names, list_groups);
    report::<FxHash>(&names, list_groups);
    Ok(())
}
