//! Report views over a matchup table.
//!
//! A report is the filtered, column-selected table the user sees. The F5
//! view adds a lean call and reason per row; the full-game view shows the
//! pre-computed lean columns from the CSV as-is.

use crate::lean::{classify_with, Classification, LeanCall, LeanThresholds};
use crate::source::*;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::{self, Write as FmtWrite};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

pub const F5_CALL: &str = "F5 Call";
pub const F5_REASON: &str = "F5 Reason";

const PITCHER_COLUMNS: [&str; 10] = [
    TEAM,
    OPPONENT,
    PITCHER,
    PITCHER_HAND,
    ERA,
    WHIP,
    OPP_PITCHER,
    OPP_HAND,
    OPP_ERA,
    OPP_WHIP,
];

const FULL_GAME_EXTRA: [&str; 6] = [
    TEAM_RPG,
    TEAM_OPS,
    OPP_RPG,
    OPP_OPS,
    LEAN_CALL,
    LEAN_REASON,
];

// ============================================================================
// Views
// ============================================================================

/// Which bet type the report is laid out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportView {
    /// Full-game moneyline/run line: pitching plus recent offense
    #[default]
    FullGame,
    /// First five innings: starting pitchers only, with derived lean calls
    F5,
}

impl ReportView {
    pub const ALL: [ReportView; 2] = [ReportView::FullGame, ReportView::F5];

    pub fn label(self) -> &'static str {
        match self {
            ReportView::FullGame => "Full Game",
            ReportView::F5 => "F5",
        }
    }

    /// Source columns shown by this view, in display order.
    pub fn source_columns(self) -> Vec<&'static str> {
        match self {
            ReportView::FullGame => PITCHER_COLUMNS
                .iter()
                .chain(FULL_GAME_EXTRA.iter())
                .copied()
                .collect(),
            ReportView::F5 => PITCHER_COLUMNS.to_vec(),
        }
    }

    pub fn has_lean_calls(self) -> bool {
        self == ReportView::F5
    }
}

impl fmt::Display for ReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReportView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full-game" | "full game" | "fullgame" | "full" => Ok(ReportView::FullGame),
            "f5" | "f5 ml" | "f5-ml" => Ok(ReportView::F5),
            other => Err(format!(
                "Unknown view '{}', expected 'full-game' or 'f5'",
                other
            )),
        }
    }
}

/// Display precision for numeric columns; `None` for text columns.
pub fn column_precision(column: &str) -> Option<usize> {
    match column {
        ERA | WHIP | OPP_ERA | OPP_WHIP | TEAM_RPG | OPP_RPG => Some(2),
        TEAM_OPS | OPP_OPS => Some(3),
        _ => None,
    }
}

/// Format a cell for display. Numeric cells in numeric columns get the
/// column's precision; everything else is shown unchanged.
pub fn format_cell(column: &str, value: &str) -> String {
    match (column_precision(column), value.trim().parse::<f64>()) {
        (Some(p), Ok(v)) if v.is_finite() => format!("{:.*}", p, v),
        _ => value.to_string(),
    }
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone)]
pub struct ReportRow {
    /// Raw cell values, one per report column
    pub cells: Vec<String>,
    /// Lean classification, present in the F5 view only
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub view: ReportView,
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

/// Build the report for a view. Columns the CSV lacks are dropped.
pub fn build_report(table: &MatchupTable, view: ReportView, thresholds: &LeanThresholds) -> Report {
    let source_columns: Vec<(&str, Option<usize>)> = view
        .source_columns()
        .into_iter()
        .map(|c| (c, table.column(c)))
        .filter(|(_, idx)| idx.is_some())
        .collect();

    let mut columns: Vec<String> = source_columns.iter().map(|(c, _)| c.to_string()).collect();
    if view.has_lean_calls() {
        columns.push(F5_CALL.to_string());
        columns.push(F5_REASON.to_string());
    }

    let rows: Vec<ReportRow> = table
        .rows()
        .par_iter()
        .map(|record| {
            let mut cells: Vec<String> = source_columns
                .iter()
                .map(|(_, idx)| idx.and_then(|i| record.get(i)).unwrap_or("").to_string())
                .collect();

            let classification = if view.has_lean_calls() {
                let p = table.pitching(record);
                let c = classify_with(thresholds, &p.era, &p.whip, &p.opp_era, &p.opp_whip);
                if c.is_unparseable() {
                    log::debug!(
                        "Unparseable pitching stats for {} vs {}",
                        table.cell(record, TEAM),
                        table.cell(record, OPPONENT)
                    );
                }
                cells.push(c.label().to_string());
                cells.push(c.reason());
                Some(c)
            } else {
                None
            };

            ReportRow {
                cells,
                classification,
            }
        })
        .collect();

    Report {
        view,
        columns,
        rows,
    }
}

impl Report {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells formatted for display.
    pub fn formatted_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(&row.cells)
                    .map(|(col, value)| format_cell(col, value))
                    .collect()
            })
            .collect()
    }

    /// Tally of lean calls. Empty for views without calls.
    pub fn summary(&self) -> CallSummary {
        CallSummary::from_classifications(
            self.rows.iter().filter_map(|r| r.classification.as_ref()),
        )
    }

    /// Render as a fixed-width text table.
    pub fn render_text(&self) -> Result<String> {
        let formatted = self.formatted_rows();
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &formatted {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", c, w = *w))
            .collect();
        writeln!(out, "{}", header.join(" | ").trim_end())?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(out, "{}", rule.join("-+-"))?;

        if formatted.is_empty() {
            writeln!(out, "(no matchups)")?;
        }
        for row in &formatted {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(c, w)| {
                    let pad = w.saturating_sub(c.chars().count());
                    format!("{}{}", c, " ".repeat(pad))
                })
                .collect();
            writeln!(out, "{}", line.join(" | ").trim_end())?;
        }
        Ok(out)
    }

    /// Write the report columns and raw values as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(&row.cells)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_csv(file)?;
        log::info!("Exported {} rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Write an Excel workbook with one sheet named after the view.
    pub fn export_xlsx(&self, path: &Path) -> Result<()> {
        use rust_xlsxwriter::{Format, Workbook};

        let mut workbook = Workbook::new();
        let header_fmt = Format::new().set_bold();
        let two_dp = Format::new().set_num_format("0.00");
        let three_dp = Format::new().set_num_format("0.000");

        let sheet = workbook.add_worksheet();
        sheet.set_name(self.view.label())?;

        for (col, name) in self.columns.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, name, &header_fmt)?;
            let width = match name.as_str() {
                F5_REASON | LEAN_REASON => 28,
                _ => name.chars().count().clamp(8, 24),
            };
            sheet.set_column_width(col as u16, width as f64)?;
        }

        let call_col = self.column(F5_CALL);
        for (r, row) in self.rows.iter().enumerate() {
            let xrow = r as u32 + 1;
            for (c, (name, value)) in self.columns.iter().zip(&row.cells).enumerate() {
                let xcol = c as u16;
                let number = value.trim().parse::<f64>().ok().filter(|v| v.is_finite());
                match (column_precision(name), number) {
                    (Some(2), Some(v)) => {
                        sheet.write_number_with_format(xrow, xcol, v, &two_dp)?;
                    }
                    (Some(_), Some(v)) => {
                        sheet.write_number_with_format(xrow, xcol, v, &three_dp)?;
                    }
                    _ if Some(c) == call_col => {
                        match row.classification.as_ref().and_then(|cl| call_fill(cl.call())) {
                            Some(color) => {
                                let fill = Format::new().set_background_color(color);
                                sheet.write_string_with_format(xrow, xcol, value, &fill)?;
                            }
                            None => {
                                sheet.write_string(xrow, xcol, value)?;
                            }
                        }
                    }
                    _ => {
                        sheet.write_string(xrow, xcol, value)?;
                    }
                }
            }
        }

        if !self.columns.is_empty() {
            sheet.set_freeze_panes(1, 0)?;
            if !self.rows.is_empty() {
                sheet.autofilter(0, 0, self.rows.len() as u32, self.columns.len() as u16 - 1)?;
            }
        }

        workbook
            .save(path)
            .map_err(|e| anyhow::anyhow!("Failed to save workbook: {}", e))?;
        log::info!("Exported {} rows to {}", self.len(), path.display());
        Ok(())
    }

    /// Export by file extension: `.xlsx` writes a workbook, anything else CSV.
    pub fn export(&self, path: &Path) -> Result<()> {
        let is_xlsx = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xlsx"));
        if is_xlsx {
            self.export_xlsx(path)
        } else {
            self.export_csv(path)
        }
    }
}

/// Background colour for a call in exported workbooks.
fn call_fill(call: LeanCall) -> Option<&'static str> {
    match call {
        LeanCall::LeanStrong => Some("#C6EFCE"),
        LeanCall::LeanModerate => Some("#E2EFDA"),
        LeanCall::FadeStrong => Some("#FFC7CE"),
        LeanCall::FadeModerate => Some("#FCE4D6"),
        LeanCall::StayAway => None,
    }
}

/// Render the call key for the given thresholds.
pub fn call_key(thresholds: &LeanThresholds) -> String {
    let width = LeanCall::ALL
        .iter()
        .map(|c| c.label().len())
        .max()
        .unwrap_or(0);
    LeanCall::ALL
        .iter()
        .map(|c| format!("{:<w$}  {}\n", c.label(), c.describe(thresholds), w = width))
        .collect()
}

// ============================================================================
// Call summary
// ============================================================================

/// Counts of each lean call across a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSummary {
    counts: [usize; 5],
    /// Rows reported as Stay Away because a stat was missing
    pub unparseable: usize,
}

impl CallSummary {
    pub fn from_classifications<'a, I>(classifications: I) -> Self
    where
        I: IntoIterator<Item = &'a Classification>,
    {
        let mut summary = CallSummary::default();
        for c in classifications {
            summary.record(c);
        }
        summary
    }

    /// Tally of a compact call listing.
    pub fn from_records(records: &[CallRecord]) -> Self {
        Self::from_classifications(records.iter().map(|r| &r.classification))
    }

    fn record(&mut self, c: &Classification) {
        if let Some(i) = LeanCall::ALL.iter().position(|x| *x == c.call()) {
            self.counts[i] += 1;
        }
        if c.is_unparseable() {
            self.unparseable += 1;
        }
    }

    pub fn count(&self, call: LeanCall) -> usize {
        LeanCall::ALL
            .iter()
            .position(|x| *x == call)
            .map(|i| self.counts[i])
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl fmt::Display for CallSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} matchups", self.total())?;
        for call in LeanCall::ALL {
            writeln!(f, "  {:<16} {}", call.label(), self.count(call))?;
        }
        if self.unparseable > 0 {
            writeln!(f, "  ({} with missing stats)", self.unparseable)?;
        }
        Ok(())
    }
}

// ============================================================================
// Compact call listing
// ============================================================================

/// One line of the compact F5 call listing.
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Opponent")]
    pub opponent: String,
    #[serde(rename = "Pitcher")]
    pub pitcher: String,
    #[serde(rename = "Opponent Pitcher")]
    pub opp_pitcher: String,
    #[serde(rename = "F5 Call")]
    pub call: String,
    #[serde(rename = "F5 Reason")]
    pub reason: String,
    #[serde(skip)]
    pub classification: Classification,
}

/// Classify every row of a table into compact call records.
pub fn call_records(table: &MatchupTable, thresholds: &LeanThresholds) -> Vec<CallRecord> {
    table
        .rows()
        .par_iter()
        .map(|record| {
            let p = table.pitching(record);
            let c = classify_with(thresholds, &p.era, &p.whip, &p.opp_era, &p.opp_whip);
            CallRecord {
                team: table.cell(record, TEAM).to_string(),
                opponent: table.cell(record, OPPONENT).to_string(),
                pitcher: table.cell(record, PITCHER).to_string(),
                opp_pitcher: table.cell(record, OPP_PITCHER).to_string(),
                call: c.label().to_string(),
                reason: c.reason(),
                classification: c,
            }
        })
        .collect()
}

pub fn write_call_records<W: Write>(records: &[CallRecord], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Team,Opponent,Pitcher,ERA (Last 3 Starts),WHIP (Last 3 Starts),Opponent Pitcher,Opponent ERA (Last 3 Starts),Opponent WHIP (Last 3 Starts),Team OPS (L7),Lean Call,Extra
NYY,BOS,Cole,3,1.1,Bello,4.1,1.26,0.7514,Lean ML (Moderate),x
BOS,NYY,Bello,4.1,1.26,Cole,3,1.1,0.689,Stay Away,y
LAD,SF,Kershaw,TBD,1.2,Webb,3.7,1.22,n/a,Stay Away,z
";

    fn table() -> MatchupTable {
        MatchupTable::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_view_parsing() {
        assert_eq!("f5".parse::<ReportView>().unwrap(), ReportView::F5);
        assert_eq!("Full Game".parse::<ReportView>().unwrap(), ReportView::FullGame);
        assert!("parlay".parse::<ReportView>().is_err());
    }

    #[test]
    fn test_full_game_keeps_present_columns_in_order() {
        let report = build_report(&table(), ReportView::FullGame, &LeanThresholds::default());
        assert_eq!(
            report.columns,
            vec![
                TEAM, OPPONENT, PITCHER, ERA, WHIP, OPP_PITCHER, OPP_ERA, OPP_WHIP, TEAM_OPS,
                LEAN_CALL
            ]
        );
        assert!(report.rows.iter().all(|r| r.classification.is_none()));
        assert_eq!(report.summary().total(), 0);
    }

    #[test]
    fn test_f5_adds_calls() {
        let report = build_report(&table(), ReportView::F5, &LeanThresholds::default());
        assert_eq!(report.columns.last().map(String::as_str), Some(F5_REASON));
        assert!(report.column(TEAM_OPS).is_none());
        assert!(report.column("Extra").is_none());

        let call = report.column(F5_CALL).unwrap();
        let reason = report.column(F5_REASON).unwrap();
        assert_eq!(report.rows[0].cells[call], "Lean (Strong)");
        assert_eq!(report.rows[0].cells[reason], "ERA +1.10 / WHIP +0.16");
        assert_eq!(report.rows[1].cells[call], "Fade (Strong)");
        assert_eq!(report.rows[1].cells[reason], "ERA -1.10 / WHIP -0.16");
        assert_eq!(report.rows[2].cells[call], "Stay Away");
        assert_eq!(report.rows[2].cells[reason], "");
    }

    #[test]
    fn test_summary_counts() {
        let report = build_report(&table(), ReportView::F5, &LeanThresholds::default());
        let summary = report.summary();
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.count(LeanCall::LeanStrong), 1);
        assert_eq!(summary.count(LeanCall::FadeStrong), 1);
        assert_eq!(summary.count(LeanCall::StayAway), 1);
        assert_eq!(summary.unparseable, 1);
        assert!(summary.to_string().contains("(1 with missing stats)"));
    }

    #[test]
    fn test_format_cell() {
        assert_eq!(format_cell(ERA, "3"), "3.00");
        assert_eq!(format_cell(WHIP, "1.256"), "1.26");
        assert_eq!(format_cell(TEAM_OPS, "0.7514"), "0.751");
        assert_eq!(format_cell(TEAM_OPS, "n/a"), "n/a");
        assert_eq!(format_cell(TEAM, "3"), "3");
        assert_eq!(format_cell(ERA, "TBD"), "TBD");
    }

    #[test]
    fn test_render_text_formats_numbers() {
        let report = build_report(&table(), ReportView::F5, &LeanThresholds::default());
        let text = report.render_text().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Team | Opponent | Pitcher"));
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("3.00"));
        assert!(lines[2].contains("Lean (Strong)"));
        assert!(lines[4].contains("TBD"));
    }

    #[test]
    fn test_render_empty_report() {
        let empty = table().filter_team(Some("SEA"));
        let report = build_report(&empty, ReportView::F5, &LeanThresholds::default());
        assert!(report.render_text().unwrap().contains("(no matchups)"));
    }

    #[test]
    fn test_write_csv_keeps_raw_values() {
        let report = build_report(&table(), ReportView::F5, &LeanThresholds::default());
        let mut buf = Vec::new();
        report.write_csv(&mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Team,Opponent,Pitcher,ERA (Last 3 Starts),WHIP (Last 3 Starts),Opponent Pitcher,Opponent ERA (Last 3 Starts),Opponent WHIP (Last 3 Starts),F5 Call,F5 Reason"
        );
        assert_eq!(
            lines.next().unwrap(),
            "NYY,BOS,Cole,3,1.1,Bello,4.1,1.26,Lean (Strong),ERA +1.10 / WHIP +0.16"
        );
    }

    #[test]
    fn test_export_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let report = build_report(&table(), ReportView::F5, &LeanThresholds::default());

        let csv_path = dir.path().join("out.csv");
        report.export(&csv_path).unwrap();
        let reloaded = MatchupTable::from_path(&csv_path).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert!(reloaded.has_column(F5_CALL));

        let xlsx_path = dir.path().join("out.xlsx");
        report.export(&xlsx_path).unwrap();
        let bytes = std::fs::read(&xlsx_path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_call_records_serialize() {
        let records = call_records(&table(), &LeanThresholds::default());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].team, "NYY");
        assert_eq!(records[0].call, "Lean (Strong)");

        let mut buf = Vec::new();
        write_call_records(&records, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.starts_with("Team,Opponent,Pitcher,Opponent Pitcher,F5 Call,F5 Reason\n"));
        assert!(out.contains("LAD,SF,Kershaw,Webb,Stay Away,\n"));
    }

    #[test]
    fn test_f5_classifies_short_rows() {
        let csv = "\
Team,ERA (Last 3 Starts),WHIP (Last 3 Starts),Opponent ERA (Last 3 Starts),Opponent WHIP (Last 3 Starts),Lean Reason
NYY,3.00,1.10,4.10,1.26
";
        let table = MatchupTable::from_reader(csv.as_bytes()).unwrap();
        let report = build_report(&table, ReportView::F5, &LeanThresholds::default());
        let call = report.column(F5_CALL).unwrap();
        let reason = report.column(F5_REASON).unwrap();
        assert_eq!(report.rows[0].cells[call], "Lean (Strong)");
        assert_eq!(report.rows[0].cells[reason], "ERA +1.10 / WHIP +0.16");

        let records = call_records(&table, &LeanThresholds::default());
        assert_eq!(records[0].call, "Lean (Strong)");
    }

    #[test]
    fn test_summary_from_records_matches_report() {
        let t = LeanThresholds::default();
        let records = call_records(&table(), &t);
        let from_records = CallSummary::from_records(&records);
        assert_eq!(from_records, build_report(&table(), ReportView::F5, &t).summary());
        assert_eq!(from_records.unparseable, 1);
    }

    #[test]
    fn test_call_key_lists_every_call() {
        let key = call_key(&LeanThresholds::default());
        assert_eq!(key.lines().count(), 5);
        for call in LeanCall::ALL {
            assert!(key.contains(call.label()));
        }
    }
}
