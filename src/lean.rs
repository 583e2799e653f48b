//! Lean classification for starting-pitcher matchups
//!
//! Compares a subject pitcher's recent ERA and WHIP against the opposing
//! starter's and maps the two differences to one of five lean calls.

use std::fmt;
use std::str::FromStr;

/// A lean call for the subject side of a matchup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeanCall {
    LeanStrong,
    LeanModerate,
    FadeStrong,
    FadeModerate,
    StayAway,
}

impl LeanCall {
    /// Every call, strongest lean first.
    pub const ALL: [LeanCall; 5] = [
        LeanCall::LeanStrong,
        LeanCall::LeanModerate,
        LeanCall::FadeStrong,
        LeanCall::FadeModerate,
        LeanCall::StayAway,
    ];

    /// Display label, as written to reports and exports.
    pub fn label(self) -> &'static str {
        match self {
            LeanCall::LeanStrong => "Lean (Strong)",
            LeanCall::LeanModerate => "Lean (Moderate)",
            LeanCall::FadeStrong => "Fade (Strong)",
            LeanCall::FadeModerate => "Fade (Moderate)",
            LeanCall::StayAway => "Stay Away",
        }
    }

    /// The call seen from the opponent's side: Lean and Fade swap, strength is kept.
    pub fn mirror(self) -> Self {
        match self {
            LeanCall::LeanStrong => LeanCall::FadeStrong,
            LeanCall::LeanModerate => LeanCall::FadeModerate,
            LeanCall::FadeStrong => LeanCall::LeanStrong,
            LeanCall::FadeModerate => LeanCall::LeanModerate,
            LeanCall::StayAway => LeanCall::StayAway,
        }
    }

    pub fn is_lean(self) -> bool {
        matches!(self, LeanCall::LeanStrong | LeanCall::LeanModerate)
    }

    pub fn is_fade(self) -> bool {
        matches!(self, LeanCall::FadeStrong | LeanCall::FadeModerate)
    }

    /// One-line meaning of the call under the given thresholds, for the call key.
    pub fn describe(self, t: &LeanThresholds) -> String {
        match self {
            LeanCall::LeanStrong => format!(
                "Your starter is better by >= {:.2} ERA and >= {:.2} WHIP",
                t.strong_era, t.strong_whip
            ),
            LeanCall::LeanModerate => format!(
                "Your starter is better by >= {:.2} ERA and >= {:.2} WHIP",
                t.moderate_era, t.moderate_whip
            ),
            LeanCall::FadeStrong => format!(
                "Opponent starter is better by >= {:.2} ERA and >= {:.2} WHIP",
                t.strong_era, t.strong_whip
            ),
            LeanCall::FadeModerate => format!(
                "Opponent starter is better by >= {:.2} ERA and >= {:.2} WHIP",
                t.moderate_era, t.moderate_whip
            ),
            LeanCall::StayAway => "No meaningful edge, or stats missing".to_string(),
        }
    }
}

impl fmt::Display for LeanCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeanCall {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LeanCall::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown lean call: {}", s))
    }
}

/// Minimum edges required for each lean tier.
///
/// Differences are compared inclusively (`>=` for leans, `<=` the negated
/// value for fades).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeanThresholds {
    pub strong_era: f64,
    pub strong_whip: f64,
    pub moderate_era: f64,
    pub moderate_whip: f64,
}

impl Default for LeanThresholds {
    fn default() -> Self {
        Self {
            strong_era: 1.00,
            strong_whip: 0.15,
            moderate_era: 0.60,
            moderate_whip: 0.10,
        }
    }
}

/// Opponent-minus-subject stat differences. Positive means the subject
/// pitcher has the edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatDiff {
    pub era: f64,
    pub whip: f64,
}

impl StatDiff {
    pub fn new(era: f64, whip: f64, opp_era: f64, opp_whip: f64) -> Self {
        Self {
            era: opp_era - era,
            whip: opp_whip - whip,
        }
    }

    /// Human-readable explanation, e.g. `ERA +1.10 / WHIP +0.16`.
    pub fn reason(&self) -> String {
        format!("ERA {:+.2} / WHIP {:+.2}", self.era, self.whip)
    }

    /// Map the differences to a call. First matching tier wins.
    pub fn call(&self, t: &LeanThresholds) -> LeanCall {
        let (era, whip) = (self.era, self.whip);
        if era >= t.strong_era && whip >= t.strong_whip {
            LeanCall::LeanStrong
        } else if era >= t.moderate_era && whip >= t.moderate_whip {
            LeanCall::LeanModerate
        } else if era <= -t.strong_era && whip <= -t.strong_whip {
            LeanCall::FadeStrong
        } else if era <= -t.moderate_era && whip <= -t.moderate_whip {
            LeanCall::FadeModerate
        } else {
            LeanCall::StayAway
        }
    }
}

/// Outcome of classifying one matchup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// All four stats parsed.
    Computed { call: LeanCall, diff: StatDiff },
    /// At least one stat was missing or not a finite number.
    Unparseable,
}

impl Classification {
    /// The call, with unparseable input reported as `StayAway`.
    pub fn call(&self) -> LeanCall {
        match self {
            Classification::Computed { call, .. } => *call,
            Classification::Unparseable => LeanCall::StayAway,
        }
    }

    /// The reason string, empty for unparseable input.
    pub fn reason(&self) -> String {
        match self {
            Classification::Computed { diff, .. } => diff.reason(),
            Classification::Unparseable => String::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.call().label()
    }

    pub fn diff(&self) -> Option<StatDiff> {
        match self {
            Classification::Computed { diff, .. } => Some(*diff),
            Classification::Unparseable => None,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, Classification::Unparseable)
    }

    /// `(label, reason)` pair as shown in the report.
    pub fn into_pair(self) -> (String, String) {
        (self.label().to_string(), self.reason())
    }
}

/// Parse a stat cell. Blank, placeholder and non-finite values yield `None`.
pub fn parse_stat(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Classify with the default thresholds.
pub fn classify(era: &str, whip: &str, opp_era: &str, opp_whip: &str) -> Classification {
    classify_with(&LeanThresholds::default(), era, whip, opp_era, opp_whip)
}

/// Classify raw cell values with custom thresholds.
pub fn classify_with(
    thresholds: &LeanThresholds,
    era: &str,
    whip: &str,
    opp_era: &str,
    opp_whip: &str,
) -> Classification {
    match (
        parse_stat(era),
        parse_stat(whip),
        parse_stat(opp_era),
        parse_stat(opp_whip),
    ) {
        (Some(e), Some(w), Some(oe), Some(ow)) => classify_values(thresholds, e, w, oe, ow),
        _ => Classification::Unparseable,
    }
}

/// Classify already-parsed values. Non-finite values are still treated as unparseable.
pub fn classify_values(
    thresholds: &LeanThresholds,
    era: f64,
    whip: f64,
    opp_era: f64,
    opp_whip: f64,
) -> Classification {
    if ![era, whip, opp_era, opp_whip].iter().all(|v| v.is_finite()) {
        return Classification::Unparseable;
    }
    let diff = StatDiff::new(era, whip, opp_era, opp_whip);
    Classification::Computed {
        call: diff.call(thresholds),
        diff,
    }
}
