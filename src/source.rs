//! Loading the daily dashboard CSV.
//!
//! Dashboard files are named `mlb_dashboard_YYYY-MM-DD.csv` and live in a
//! single data directory. A file is read whole into a [`MatchupTable`];
//! cells are kept as raw strings so placeholder values survive untouched.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use regex::Regex;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const TEAM: &str = "Team";
pub const OPPONENT: &str = "Opponent";
pub const PITCHER: &str = "Pitcher";
pub const PITCHER_HAND: &str = "Pitcher Handedness";
pub const ERA: &str = "ERA (Last 3 Starts)";
pub const WHIP: &str = "WHIP (Last 3 Starts)";
pub const OPP_PITCHER: &str = "Opponent Pitcher";
pub const OPP_HAND: &str = "Opponent Handedness";
pub const OPP_ERA: &str = "Opponent ERA (Last 3 Starts)";
pub const OPP_WHIP: &str = "Opponent WHIP (Last 3 Starts)";
pub const TEAM_RPG: &str = "Team RPG (L7)";
pub const TEAM_OPS: &str = "Team OPS (L7)";
pub const OPP_RPG: &str = "Opp RPG (L7)";
pub const OPP_OPS: &str = "Opp OPS (L7)";
pub const LEAN_CALL: &str = "Lean Call";
pub const LEAN_REASON: &str = "Lean Reason";

const FILE_PREFIX: &str = "mlb_dashboard_";
const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Dated file naming
// ============================================================================

/// Today's date in local time.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// File name of the dashboard for a date, e.g. `mlb_dashboard_2025-06-01.csv`.
pub fn dashboard_file_name(date: NaiveDate) -> String {
    format!("{}{}.csv", FILE_PREFIX, date.format(DATE_FORMAT))
}

pub fn dashboard_path(data_dir: &Path, date: NaiveDate) -> PathBuf {
    data_dir.join(dashboard_file_name(date))
}

/// Parse a `YYYY-MM-DD` date as given on the command line.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Extract the date from a dashboard file name.
pub fn parse_file_date(file_name: &str) -> Option<NaiveDate> {
    lazy_static::lazy_static! {
        static ref FILE_PATTERN: Regex =
            Regex::new(r"^mlb_dashboard_(\d{4}-\d{2}-\d{2})\.csv$").unwrap();
    }

    let caps = FILE_PATTERN.captures(file_name)?;
    NaiveDate::parse_from_str(&caps[1], DATE_FORMAT).ok()
}

/// Header caption for a loaded dashboard file: its date when the name
/// carries one, else the file name.
pub fn dashboard_caption(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match parse_file_date(&name) {
        Some(date) => format!("Updated for {}", date.format(DATE_FORMAT)),
        None => format!("Loaded from {}", name),
    }
}

/// Dates with a dashboard file in `data_dir`, oldest first.
pub fn available_dates(data_dir: &Path) -> Result<Vec<NaiveDate>> {
    let entries = std::fs::read_dir(data_dir)
        .with_context(|| format!("Failed to read data directory {}", data_dir.display()))?;

    let mut dates = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            log::warn!("Skipping non-UTF-8 file name in {}", data_dir.display());
            continue;
        };
        if let Some(date) = parse_file_date(name) {
            dates.push(date);
        }
    }
    dates.sort();
    dates.dedup();
    Ok(dates)
}

/// Message shown when the dashboard for a date has not been generated.
pub fn missing_dashboard_message(date: NaiveDate) -> String {
    format!(
        "No dashboard CSV found for {}. Make sure you've generated it first.",
        date.format(DATE_FORMAT)
    )
}

/// Load the dashboard for a date from `data_dir`.
pub fn load_for_date(data_dir: &Path, date: NaiveDate) -> Result<MatchupTable> {
    let path = dashboard_path(data_dir, date);
    if !path.exists() {
        return Err(anyhow::anyhow!(missing_dashboard_message(date)));
    }
    MatchupTable::from_path(&path)
}

// ============================================================================
// Matchup table
// ============================================================================

/// The four stats the lean classifier reads from a row.
///
/// Absent columns and cells missing from short rows read as empty strings,
/// which the classifier treats as unparseable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PitchingMatchup {
    pub era: String,
    pub whip: String,
    pub opp_era: String,
    pub opp_whip: String,
}

/// Rows of one dashboard CSV.
#[derive(Debug, Clone)]
pub struct MatchupTable {
    headers: StringRecord,
    rows: Vec<StringRecord>,
}

impl MatchupTable {
    pub fn new(headers: StringRecord, rows: Vec<StringRecord>) -> Self {
        Self { headers, rows }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let table = Self::from_reader(file)
            .with_context(|| format!("Failed to read dashboard CSV {}", path.display()))?;
        log::info!(
            "Loaded {} matchups from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        let rows: Vec<StringRecord> = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("Failed to read CSV records")?;
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Cell value for a row and column name; empty when either is missing.
    pub fn cell<'a>(&self, row: &'a StringRecord, name: &str) -> &'a str {
        self.column(name).and_then(|i| row.get(i)).unwrap_or("")
    }

    /// The four classifier inputs of a row.
    pub fn pitching(&self, row: &StringRecord) -> PitchingMatchup {
        PitchingMatchup {
            era: self.cell(row, ERA).to_string(),
            whip: self.cell(row, WHIP).to_string(),
            opp_era: self.cell(row, OPP_ERA).to_string(),
            opp_whip: self.cell(row, OPP_WHIP).to_string(),
        }
    }

    /// Distinct non-empty team names, sorted.
    pub fn teams(&self) -> Vec<String> {
        let Some(idx) = self.column(TEAM) else {
            return Vec::new();
        };
        let mut teams: Vec<String> = self
            .rows
            .iter()
            .filter_map(|r| r.get(idx))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        teams.sort();
        teams.dedup();
        teams
    }

    /// Rows whose `Team` matches `team` exactly. `None` keeps every row.
    pub fn filter_team(&self, team: Option<&str>) -> MatchupTable {
        let Some(team) = team else {
            return self.clone();
        };
        let rows = match self.column(TEAM) {
            Some(idx) => self
                .rows
                .iter()
                .filter(|r| r.get(idx).map(str::trim) == Some(team))
                .cloned()
                .collect(),
            None => Vec::new(),
        };
        MatchupTable {
            headers: self.headers.clone(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Team,Opponent,ERA (Last 3 Starts),WHIP (Last 3 Starts),Opponent ERA (Last 3 Starts),Opponent WHIP (Last 3 Starts)
NYY,BOS,3.00,1.10,4.10,1.26
BOS,NYY,4.10,1.26,3.00,1.10
LAD,SF,3.50,,3.70,1.22
";

    fn sample() -> MatchupTable {
        MatchupTable::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_dashboard_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(dashboard_file_name(date), "mlb_dashboard_2025-06-01.csv");
        assert_eq!(
            dashboard_path(Path::new("data"), date),
            PathBuf::from("data/mlb_dashboard_2025-06-01.csv")
        );
    }

    #[test]
    fn test_parse_file_date() {
        assert_eq!(
            parse_file_date("mlb_dashboard_2025-07-04.csv"),
            NaiveDate::from_ymd_opt(2025, 7, 4)
        );
        assert_eq!(parse_file_date("mlb_dashboard_2025-13-04.csv"), None);
        assert_eq!(parse_file_date("mlb_dashboard_2025-07-04.csv.bak"), None);
        assert_eq!(parse_file_date("nba_dashboard_2025-07-04.csv"), None);
    }

    #[test]
    fn test_dashboard_caption() {
        assert_eq!(
            dashboard_caption(Path::new("/srv/data/mlb_dashboard_2025-07-04.csv")),
            "Updated for 2025-07-04"
        );
        assert_eq!(
            dashboard_caption(Path::new("/home/me/Downloads/picks.csv")),
            "Loaded from picks.csv"
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert!(parse_date("2025-06-01").is_ok());
        assert!(parse_date("06/01/2025").is_err());
    }

    #[test]
    fn test_available_dates_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "mlb_dashboard_2025-06-03.csv",
            "mlb_dashboard_2025-06-01.csv",
            "notes.txt",
            "mlb_dashboard_latest.csv",
        ] {
            std::fs::write(dir.path().join(name), "Team\n").unwrap();
        }
        let dates = available_dates(dir.path()).unwrap();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn test_load_for_missing_date() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let err = load_for_date(dir.path(), date).unwrap_err();
        assert_eq!(err.to_string(), missing_dashboard_message(date));
    }

    #[test]
    fn test_teams_sorted_unique() {
        assert_eq!(sample().teams(), vec!["BOS", "LAD", "NYY"]);
    }

    #[test]
    fn test_filter_team() {
        let table = sample();
        assert_eq!(table.filter_team(None).len(), 3);
        let nyy = table.filter_team(Some("NYY"));
        assert_eq!(nyy.len(), 1);
        assert_eq!(nyy.cell(&nyy.rows()[0], OPPONENT), "BOS");
        assert!(table.filter_team(Some("SEA")).is_empty());
    }

    #[test]
    fn test_pitching_reads_named_columns() {
        let table = sample();
        let p = table.pitching(&table.rows()[0]);
        assert_eq!(p.era, "3.00");
        assert_eq!(p.opp_whip, "1.26");
        let missing = table.pitching(&table.rows()[2]);
        assert_eq!(missing.whip, "");
    }

    #[test]
    fn test_pitching_from_short_row() {
        // Trailing empty cell dropped, as some exporters do
        let csv = "\
Team,ERA (Last 3 Starts),WHIP (Last 3 Starts),Opponent ERA (Last 3 Starts),Opponent WHIP (Last 3 Starts),Lean Reason
NYY,3.00,1.10,4.10,1.26
";
        let table = MatchupTable::from_reader(csv.as_bytes()).unwrap();
        let p = table.pitching(&table.rows()[0]);
        assert_eq!(
            p,
            PitchingMatchup {
                era: "3.00".to_string(),
                whip: "1.10".to_string(),
                opp_era: "4.10".to_string(),
                opp_whip: "1.26".to_string(),
            }
        );
        assert_eq!(table.cell(&table.rows()[0], "Lean Reason"), "");
    }

    #[test]
    fn test_pitching_with_duplicate_header() {
        let csv = "\
Team,Team,ERA (Last 3 Starts),WHIP (Last 3 Starts),Opponent ERA (Last 3 Starts),Opponent WHIP (Last 3 Starts)
NYY,NYY,3.00,1.10,4.10,1.26
";
        let table = MatchupTable::from_reader(csv.as_bytes()).unwrap();
        let p = table.pitching(&table.rows()[0]);
        assert_eq!(p.era, "3.00");
        assert_eq!(p.opp_whip, "1.26");
    }

    #[test]
    fn test_pitching_without_stat_columns() {
        let table = MatchupTable::from_reader("Team,Opponent\nNYY,BOS\n".as_bytes()).unwrap();
        let p = table.pitching(&table.rows()[0]);
        assert!(p.era.is_empty() && p.opp_era.is_empty());
        assert!(!table.has_column(ERA));
    }
}
