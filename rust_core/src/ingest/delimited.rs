//! Delimited pick tables (CSV, TSV, pipe or semicolon separated).

use tracing::{debug, warn};

use crate::error::IngestError;

use super::{normalize_week_text, Detected, PickRow};

const DELIMITERS: [char; 4] = [',', '\t', '|', ';'];

/// Lines inspected when choosing a delimiter.
const SNIFF_LINES: usize = 10;

const ENTRY_HEADER_TOKENS: &[&str] = &["entry", "entryname", "entryid", "entry#", "name"];
const TEAM_HEADER_TOKENS: &[&str] = &["team", "teamname", "teamcode", "selection", "pick", "pickteam"];
const WEEK_HEADER_TOKENS: &[&str] = &["week", "weeknumber", "weekid", "week#", "weekkey"];

/// The delimiter occurring most often in the first lines. Ties go to the
/// earlier delimiter in `, \t | ;` order.
pub fn detect_delimiter(lines: &[&str]) -> char {
    let sample = &lines[..lines.len().min(SNIFF_LINES)];
    let mut best = (DELIMITERS[0], 0usize);
    for delim in DELIMITERS {
        let count: usize = sample
            .iter()
            .map(|line| line.chars().filter(|c| *c == delim).count())
            .sum();
        if count > best.1 {
            best = (delim, count);
        }
    }
    best.0
}

/// Read `lines` as a table, one row per line. Cells are trimmed, rows may
/// differ in length, and quoting follows the usual CSV rules (`""` inside
/// quotes is a literal quote). Quotes never span lines, so an unbalanced
/// quote only affects its own row.
pub fn read_table(lines: &[&str], delimiter: char) -> Vec<Vec<String>> {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(delimiter as u8)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All);

    lines
        .iter()
        .filter_map(|line| read_row(&builder, line))
        .collect()
}

fn read_row(builder: &csv::ReaderBuilder, line: &str) -> Option<Vec<String>> {
    let mut reader = builder.from_reader(line.as_bytes());
    match reader.records().next()? {
        Ok(record) => Some(record.iter().map(str::to_string).collect()),
        Err(err) => {
            warn!(error = %err, line, "Skipping malformed delimited row");
            None
        }
    }
}

fn normalize_header_key(cell: &str) -> String {
    cell.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '#')
        .collect()
}

/// Column layout of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    entry: usize,
    team: usize,
    week: Option<usize>,
    header_rows: usize,
}

fn detect_columns(first_row: &[String]) -> Columns {
    let tokens: Vec<String> = first_row.iter().map(|c| normalize_header_key(c)).collect();
    let position = |set: &[&str]| tokens.iter().position(|t| set.contains(&t.as_str()));

    let entry = position(ENTRY_HEADER_TOKENS);
    let team = position(TEAM_HEADER_TOKENS);
    if entry.is_some() || team.is_some() {
        return Columns {
            entry: entry.unwrap_or(0),
            team: team.unwrap_or(1),
            week: position(WEEK_HEADER_TOKENS),
            header_rows: 1,
        };
    }

    // Headerless: entry, team, and a week column only when present
    Columns {
        entry: 0,
        team: 1,
        week: (first_row.len() > 2).then_some(2),
        header_rows: 0,
    }
}

fn cell(row: &[String], index: usize) -> Option<&str> {
    row.get(index).map(|c| c.trim()).filter(|c| !c.is_empty())
}

/// Parse `lines` as a delimited pick table. Always claims the upload, as the
/// last format in the cascade.
pub fn detect(lines: &[&str]) -> Option<Result<Detected, IngestError>> {
    if lines.is_empty() {
        return Some(Err(IngestError::NoPicksDetected));
    }

    let delimiter = detect_delimiter(lines);
    let table = read_table(lines, delimiter);
    let Some(first_row) = table.first() else {
        return Some(Err(IngestError::NoPicksDetected));
    };
    let columns = detect_columns(first_row);

    let rows: Vec<PickRow> = table
        .iter()
        .skip(columns.header_rows)
        .filter_map(|row| {
            let entry_name = cell(row, columns.entry)?.to_string();
            let team = cell(row, columns.team)?.to_string();
            let week = columns
                .week
                .and_then(|idx| row.get(idx))
                .and_then(|value| normalize_week_text(value));
            Some(PickRow {
                entry_name,
                team,
                week,
            })
        })
        .collect();

    debug!(
        delimiter = ?delimiter,
        header = columns.header_rows > 0,
        rows = rows.len(),
        "Parsed delimited pick upload"
    );
    if rows.is_empty() {
        return Some(Err(IngestError::NoPicksDetected));
    }
    Some(Ok(Detected::Rows(rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeekKey;

    fn rows(text: &str) -> Vec<PickRow> {
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        match detect(&lines) {
            Some(Ok(Detected::Rows(rows))) => rows,
            other => panic!("expected rows, got {:?}", other),
        }
    }

    #[test]
    fn test_delimiter_detection() {
        assert_eq!(detect_delimiter(&["a,b", "c,d"]), ',');
        assert_eq!(detect_delimiter(&["a\tb\tc", "x, y"]), '\t');
        assert_eq!(detect_delimiter(&["a|b", "c;d|e"]), '|');
        assert_eq!(detect_delimiter(&["plain"]), ',');
    }

    #[test]
    fn test_quote_aware_table() {
        let table = read_table(&[r#""Smith, Jr.","KC", 4"#, r#""The ""Lock""",DET"#], ',');
        assert_eq!(table[0], vec!["Smith, Jr.", "KC", "4"]);
        assert_eq!(table[1], vec![r#"The "Lock""#, "DET"]);
    }

    #[test]
    fn test_unbalanced_quote_stays_on_its_line() {
        let table = read_table(&["Entry,Team", "\"Bob,KC", "Alice,DET", "Carol,SEA"], ',');
        assert!(table.contains(&vec!["Alice".to_string(), "DET".to_string()]));
        assert!(table.contains(&vec!["Carol".to_string(), "SEA".to_string()]));

        let parsed = rows("Entry,Team\n\"Bob,KC\nAlice,DET\nCarol,SEA");
        let picks: Vec<(&str, &str)> = parsed
            .iter()
            .map(|r| (r.entry_name.as_str(), r.team.as_str()))
            .collect();
        assert_eq!(picks, vec![("Alice", "DET"), ("Carol", "SEA")]);
    }

    #[test]
    fn test_header_columns_in_any_order() {
        let parsed = rows("Week Number;Pick Team;Entry Name\n4;KC;Alice\nTG;DET;Bob");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].entry_name, "Alice");
        assert_eq!(parsed[0].team, "KC");
        assert_eq!(parsed[1].week, Some(WeekKey::from("TG")));
    }

    #[test]
    fn test_headerless_tables() {
        let two = rows("Alice,KC\nBob,DET");
        assert_eq!(two.len(), 2);
        assert!(two.iter().all(|r| r.week.is_none()));

        let three = rows("Alice|KC|Week 4\nBob|DET|");
        assert_eq!(three[0].week, Some(WeekKey::from("4")));
        assert_eq!(three[1].week, None);
    }

    #[test]
    fn test_rows_missing_cells_are_dropped() {
        let parsed = rows("Entry,Team\nAlice,\n,KC\nBob,SEA");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].entry_name, "Bob");
    }

    #[test]
    fn test_header_only_table_has_no_picks() {
        assert!(matches!(
            detect(&["Entry,Team"]),
            Some(Err(IngestError::NoPicksDetected))
        ));
    }
}
