use std::{
    fmt,
    io::{self, Write},
};

use crate::{
    config::{CollisionPolicy, Config, EXPECTED_STATIONS},
    table::{StationEntry, StationTable},
    temp::{write_tenths, Tenths, TENTHS_MAX_LEN},
};

pub const HEADER: &str = "Count; Station; Min; Mean; Max";

/// One output line, all temperatures in tenths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Row<'a> {
    pub name: &'a [u8],
    pub count: u32,
    pub min: Tenths,
    pub mean: Tenths,
    pub max: Tenths,
}

impl<'a> From<StationEntry<'a>> for Row<'a> {
    fn from(entry: StationEntry<'a>) -> Self {
        let station = entry.station;
        Self {
            name: entry.name,
            count: station.count,
            min: Tenths(station.min),
            mean: Tenths(station.mean()),
            max: Tenths(station.max),
        }
    }
}

impl Row<'_> {
    /// `<count>; <name>; <min>; <mean>; <max>\n`, name written as raw bytes.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let mut buf = [0u8; TENTHS_MAX_LEN];
        write!(w, "{}; ", self.count)?;
        w.write_all(self.name)?;
        w.write_all(b"; ")?;
        w.write_all(write_tenths(self.min.0, &mut buf))?;
        w.write_all(b"; ")?;
        w.write_all(write_tenths(self.mean.0, &mut buf))?;
        w.write_all(b"; ")?;
        w.write_all(write_tenths(self.max.0, &mut buf))?;
        w.write_all(b"\n")
    }
}

/// Stations of a finished run, sorted byte-wise by name.
pub struct Report<'a> {
    rows: Vec<Row<'a>>,
    policy: CollisionPolicy,
    collisions: usize,
}

impl<'a> Report<'a> {
    pub fn new(table: &'a StationTable) -> Self {
        let mut rows = table
            .snapshot()
            .into_iter()
            .map(Row::from)
            .collect::<Vec<_>>();
        rows.sort_unstable_by(|a, b| a.name.cmp(b.name));
        Self {
            rows,
            policy: table.policy(),
            collisions: table.collisions(),
        }
    }

    pub fn rows(&self) -> &[Row<'a>] {
        &self.rows
    }

    /// Sum of all station counts.
    pub fn lines(&self) -> u64 {
        self.rows.iter().map(|row| row.count as u64).sum()
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        writeln!(w, "{}", HEADER)?;
        for row in &self.rows {
            row.write_to(w)?;
        }
        Ok(())
    }

    pub fn summary(&self, config: &Config) -> Summary {
        Summary {
            stations: self.rows.len(),
            lines: self.lines(),
            expected_stations: EXPECTED_STATIONS,
            expected_lines: config.expected_lines,
            collisions: (self.policy == CollisionPolicy::Verify).then_some(self.collisions),
        }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        for row in &self.rows {
            writeln!(
                f,
                "{}; {}; {}; {}; {}",
                row.count,
                String::from_utf8_lossy(row.name),
                row.min,
                row.mean,
                row.max
            )?;
        }
        Ok(())
    }
}

/// Diagnostic counters, printed to stderr apart from the report itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    pub stations: usize,
    pub lines: u64,
    pub expected_stations: usize,
    pub expected_lines: u64,
    /// Only tracked under [`CollisionPolicy::Verify`].
    pub collisions: Option<usize>,
}

impl Summary {
    pub fn too_few_lines(&self) -> bool {
        self.lines < self.expected_lines
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Stations count ({}): {}",
            self.expected_stations, self.stations
        )?;
        write!(
            f,
            "Lines count: {} ({})",
            self.lines,
            if self.too_few_lines() { "too few" } else { "ok" }
        )?;
        if let Some(collisions) = self.collisions {
            write!(f, "\nName collisions: {}", collisions)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::{KeyHasher, RollingHash};

    fn table(policy: CollisionPolicy, lines: &[(&str, i32)]) -> StationTable {
        let mut table = StationTable::new(policy);
        for &(name, temp) in lines {
            table.record(RollingHash::hash_name(name.as_bytes()), name.as_bytes(), temp);
        }
        table
    }

    fn render(report: &Report<'_>) -> String {
        let mut out: Vec<u8> = vec![];
        report.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_scenario() {
        let table = table(
            CollisionPolicy::FirstSeenWins,
            &[("A", 50), ("B", -32), ("A", 100)],
        );
        let report = Report::new(&table);
        let expected = "Count; Station; Min; Mean; Max\n\
                        2; A; 5.0; 7.5; 10.0\n\
                        1; B; -3.2; -3.2; -3.2\n";
        assert_eq!(render(&report), expected);
        assert_eq!(report.to_string(), expected);
        assert_eq!(report.lines(), 3);
    }

    #[test]
    fn test_half_boundary_rounds_away_from_zero() {
        let table = table(CollisionPolicy::FirstSeenWins, &[("Zero", 0), ("Zero", -1)]);
        let report = Report::new(&table);
        assert_eq!(
            report.rows(),
            &[Row {
                name: b"Zero",
                count: 2,
                min: Tenths(-1),
                mean: Tenths(-1),
                max: Tenths(0),
            }]
        );
    }

    #[test]
    fn test_rows_sorted_bytewise() {
        let table = table(
            CollisionPolicy::FirstSeenWins,
            &[("Århus", 1), ("abha", 2), ("Zürich", 3), ("Abha", 4)],
        );
        let report = Report::new(&table);
        let names = report.rows().iter().map(|r| r.name).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                b"Abha" as &[u8],
                "Zürich".as_bytes(),
                b"abha",
                "Århus".as_bytes()
            ]
        );
    }

    #[test]
    fn test_non_utf8_names_written_raw() {
        let name = [0xffu8, b'x'];
        let mut table = StationTable::default();
        table.record(RollingHash::hash_name(&name), &name, 10);
        let mut out: Vec<u8> = vec![];
        Report::new(&table).write_to(&mut out).unwrap();
        assert_eq!(&out[HEADER.len() + 1..], b"1; \xffx; 1.0; 1.0; 1.0\n");
    }

    #[test]
    fn test_empty_report() {
        let table = StationTable::default();
        let report = Report::new(&table);
        assert_eq!(render(&report), "Count; Station; Min; Mean; Max\n");
        let summary = report.summary(&Config::default());
        assert_eq!(summary.stations, 0);
        assert_eq!(summary.lines, 0);
        assert_eq!(
            summary.to_string(),
            "Stations count (413): 0\nLines count: 0 (too few)"
        );
    }

    #[test]
    fn test_summary() {
        let table = table(CollisionPolicy::Verify, &[("AD", 1), ("BH", 2), ("C", 3)]);
        let config = Config {
            expected_lines: 3,
            ..Config::default()
        };
        let summary = Report::new(&table).summary(&config);
        assert_eq!(
            summary,
            Summary {
                stations: 3,
                lines: 3,
                expected_stations: 413,
                expected_lines: 3,
                collisions: Some(1),
            }
        );
        assert!(!summary.too_few_lines());
        assert_eq!(
            summary.to_string(),
            "Stations count (413): 3\nLines count: 3 (ok)\nName collisions: 1"
        );
    }
}
