use std::collections::{HashMap, HashSet};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    hash::{FxHash, KeyHasher, RollingHash},
    report::Report,
    table::StationTable,
    temp::Tenths,
    Result,
};

struct Sample {
    name: &'static str,
    txt: &'static str,
    out: &'static str,
}

macro_rules! sample {
    ($name:literal) => {
        Sample {
            name: $name,
            txt: include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/tests/",
                concat!($name, ".txt")
            )),
            out: include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/tests/",
                concat!($name, ".out")
            )),
        }
    };
}

const SAMPLES: [Sample; 7] = [
    sample!("measurements-empty"),
    sample!("measurements-extremes"),
    sample!("measurements-long-names"),
    sample!("measurements-random"),
    sample!("measurements-rounding"),
    sample!("measurements-scenario"),
    sample!("measurements-utf8"),
];

pub fn render(table: &StationTable) -> String {
    let mut out: Vec<u8> = vec![];
    Report::new(table).write_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

pub fn correctness<F>(process: F)
where
    F: Fn(&[u8]) -> Result<StationTable>,
{
    for sample in SAMPLES {
        println!("Sample {}", sample.name);
        let table = process(sample.txt.as_bytes()).unwrap();
        let actual = render(&table);
        assert_eq!(actual, sample.out, "sample {}", sample.name);

        let lines = sample.txt.lines().count() as u64;
        check_report(&table, lines, sample.name);
    }
}

/// Properties every report must have whatever the input.
pub fn check_report(table: &StationTable, lines: u64, label: &str) {
    assert_eq!(table.records(), lines, "{}", label);
    let report = Report::new(table);
    assert_eq!(report.lines(), lines, "{}", label);
    for pair in report.rows().windows(2) {
        assert!(pair[0].name < pair[1].name, "{}", label);
    }
    for row in report.rows() {
        assert!(row.min <= row.mean && row.mean <= row.max, "{}", label);
    }
}

const NAME_CHARS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ -'.()éüÅøßçñΩЖ東京都";

fn random_name(rng: &mut StdRng, max_chars: usize) -> Vec<u8> {
    let chars = NAME_CHARS.chars().collect::<Vec<_>>();
    let len = rng.gen_range(1..=max_chars);
    (0..len)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect::<String>()
        .into_bytes()
}

/// Two names with the same rolling key: a shared prefix followed by
/// `[x, y]` and `[x ^ 1, y ^ 4]`, which both contribute `(x << 2) ^ y`.
fn colliding_pair(rng: &mut StdRng) -> [Vec<u8>; 2] {
    let prefix = random_name(rng, 8);
    let x = rng.gen_range(b'b'..=b'y');
    let y = rng.gen_range(b'a'..=b'z');
    let mut a = prefix.clone();
    a.extend([x, y]);
    let mut b = prefix;
    b.extend([x ^ 1, y ^ 4]);
    [a, b]
}

/// A seeded measurements file of `lines` lines over about `stations` names.
///
/// Without `collisions` every name has its own slot under both hashers;
/// with it, roughly a quarter of the names come in pairs sharing a rolling
/// key.
pub fn random_measurements(
    seed: u64,
    stations: usize,
    lines: usize,
    collisions: bool,
) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut names = vec![];
    let mut seen = HashSet::new();
    let mut rolling_keys = HashSet::new();
    let mut fx_keys = HashSet::new();
    while names.len() < stations {
        let candidates = if collisions && rng.gen_bool(0.25) {
            colliding_pair(&mut rng).to_vec()
        } else {
            vec![random_name(&mut rng, 10)]
        };
        if candidates.iter().any(|name| seen.contains(name)) {
            continue;
        }
        if !collisions
            && candidates.iter().any(|name| {
                rolling_keys.contains(&RollingHash::hash_name(name))
                    || fx_keys.contains(&FxHash::hash_name(name))
            })
        {
            continue;
        }
        for name in candidates {
            rolling_keys.insert(RollingHash::hash_name(&name));
            fx_keys.insert(FxHash::hash_name(&name));
            seen.insert(name.clone());
            names.push(name);
        }
    }

    let mut buf = vec![];
    for _ in 0..lines {
        let name = &names[rng.gen_range(0..names.len())];
        let temp = Tenths(rng.gen_range(-999..=999));
        buf.extend_from_slice(name);
        buf.push(b';');
        buf.extend_from_slice(temp.to_string().as_bytes());
        buf.push(b'\n');
    }
    buf
}

/// Exact per-name `(sum, count, min, max)` computed without the station table.
fn reference(buf: &[u8]) -> Vec<(&[u8], (i64, u32, i32, i32))> {
    let mut stations = HashMap::<&[u8], (i64, u32, i32, i32)>::new();
    for line in buf.split(|&c| c == b'\n').filter(|line| !line.is_empty()) {
        let delim = line.iter().rposition(|&c| c == b';').unwrap();
        let temp: i32 = std::str::from_utf8(&line[delim + 1..])
            .unwrap()
            .replace('.', "")
            .parse()
            .unwrap();
        let entry = stations
            .entry(&line[..delim])
            .or_insert((0, 0, i32::MAX, i32::MIN));
        entry.0 += temp as i64;
        entry.1 += 1;
        entry.2 = entry.2.min(temp);
        entry.3 = entry.3.max(temp);
    }
    let mut stations = stations.into_iter().collect::<Vec<_>>();
    stations.sort();
    stations
}

/// Compare `table` with an exact keyed aggregation of `buf` and check the
/// report properties.
pub fn check_against_reference(buf: &[u8], table: &StationTable, label: &str) {
    let mut actual = table
        .snapshot()
        .into_iter()
        .map(|e| {
            let s = e.station;
            (e.name, (s.sum, s.count, s.min, s.max))
        })
        .collect::<Vec<_>>();
    actual.sort();
    assert_eq!(actual, reference(buf), "{}", label);
    let lines = buf.iter().filter(|&&c| c == b'\n').count() as u64;
    check_report(table, lines, label);
}
