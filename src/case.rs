//! Case data model and verdict validation.
//!
//! A **case** is one dispute session: two named parties, a shared conflict
//! context, and one narrative per party.  A **verdict** is the structured
//! judgment the provider returns — blame split, HTML analysis, HTML advice —
//! plus the locally derived winner.
//!
//! Verdicts are only constructed through [`Verdict::from_raw`], which
//! validates the provider output (blame range, blame sum, non-empty text)
//! and sanitizes the HTML fields before anything is stored.  Raw provider
//! values never reach the UI unchecked.

use serde::Deserialize;
use thiserror::Error;

use crate::html;

/// Accepted slack around a blame sum of 100.
///
/// Models occasionally return splits like 49/50; anything further off than
/// this is rejected rather than normalized, so the displayed percentages are
/// always the model's own judgment.
pub const BLAME_SUM_TOLERANCE: i64 = 5;

// ---------------------------------------------------------------------------
// Party / CaseData
// ---------------------------------------------------------------------------

/// One of the two parties in a case.  Also identifies the story slot a
/// recording or transcript belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    A,
    B,
}

impl Party {
    /// Short label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Party::A => "A",
            Party::B => "B",
        }
    }
}

/// The mutable case form.  Owned exclusively by the application state
/// controller for the lifetime of one case; cleared on "next case".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaseData {
    /// Party A's display name (原告).
    pub name_a: String,
    /// Party B's display name (被告).
    pub name_b: String,
    /// Shared description of what the argument is about.
    pub context: String,
    /// Party A's narrative.
    pub story_a: String,
    /// Party B's narrative.
    pub story_b: String,
}

impl CaseData {
    /// `true` when every field is non-empty (after trimming) and the case
    /// may be submitted for judgment.
    pub fn is_complete(&self) -> bool {
        ![
            &self.name_a,
            &self.name_b,
            &self.context,
            &self.story_a,
            &self.story_b,
        ]
        .iter()
        .any(|f| f.trim().is_empty())
    }

    /// Reset all fields to empty strings.
    pub fn clear(&mut self) {
        *self = CaseData::default();
    }

    /// Mutable access to the story field for `slot`.
    pub fn story_mut(&mut self, slot: Party) -> &mut String {
        match slot {
            Party::A => &mut self.story_a,
            Party::B => &mut self.story_b,
        }
    }
}

// ---------------------------------------------------------------------------
// RawVerdict — serde mirror of the provider JSON
// ---------------------------------------------------------------------------

/// The exact JSON shape both backends are instructed to return.
///
/// Field names follow the wire contract (`blameA` / `blameB`), not Rust
/// convention.  Blame values are kept as `i64` here so out-of-range model
/// output can be rejected with a precise error instead of failing during
/// deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct RawVerdict {
    #[serde(rename = "blameA")]
    pub blame_a: i64,
    #[serde(rename = "blameB")]
    pub blame_b: i64,
    pub analysis: String,
    pub advice: String,
}

// ---------------------------------------------------------------------------
// Winner / Verdict
// ---------------------------------------------------------------------------

/// The party with the *lower* blame share wins the case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    A,
    B,
    Tie,
}

impl Winner {
    fn derive(blame_a: u8, blame_b: u8) -> Self {
        match blame_a.cmp(&blame_b) {
            std::cmp::Ordering::Less => Winner::A,
            std::cmp::Ordering::Greater => Winner::B,
            std::cmp::Ordering::Equal => Winner::Tie,
        }
    }
}

/// Errors raised while turning provider output into a [`Verdict`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VerdictError {
    /// A blame value fell outside 0–100.
    #[error("blame value out of range: blameA={0}, blameB={1}")]
    BlameOutOfRange(i64, i64),

    /// The two blame values do not add up to (approximately) 100.
    #[error("blame sum {0} is not within {BLAME_SUM_TOLERANCE} of 100")]
    BlameSumMismatch(i64),

    /// Analysis or advice was empty once sanitized.
    #[error("verdict field '{0}' is empty")]
    EmptyField(&'static str),
}

/// A validated, immutable judgment.  Replaced wholesale when a new case is
/// judged — never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Party A's blame share, 0–100.
    pub blame_a: u8,
    /// Party B's blame share, 0–100.
    pub blame_b: u8,
    /// Sanitized HTML analysis of the case.
    pub analysis: String,
    /// Sanitized HTML reconciliation advice.
    pub advice: String,
    /// Derived locally: lower blame wins, equal is a tie.
    pub winner: Winner,
}

impl Verdict {
    /// Validate and sanitize a [`RawVerdict`].
    ///
    /// Checks, in order: blame range (0–100 each), blame sum
    /// (100 ± [`BLAME_SUM_TOLERANCE`]), and that analysis/advice still carry
    /// content after HTML sanitization.
    pub fn from_raw(raw: RawVerdict) -> Result<Self, VerdictError> {
        if !(0..=100).contains(&raw.blame_a) || !(0..=100).contains(&raw.blame_b) {
            return Err(VerdictError::BlameOutOfRange(raw.blame_a, raw.blame_b));
        }

        let sum = raw.blame_a + raw.blame_b;
        if (sum - 100).abs() > BLAME_SUM_TOLERANCE {
            return Err(VerdictError::BlameSumMismatch(sum));
        }

        let analysis = html::sanitize(&raw.analysis);
        if analysis.trim().is_empty() {
            return Err(VerdictError::EmptyField("analysis"));
        }

        let advice = html::sanitize(&raw.advice);
        if advice.trim().is_empty() {
            return Err(VerdictError::EmptyField("advice"));
        }

        let blame_a = raw.blame_a as u8;
        let blame_b = raw.blame_b as u8;

        Ok(Self {
            blame_a,
            blame_b,
            analysis,
            advice,
            winner: Winner::derive(blame_a, blame_b),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(blame_a: i64, blame_b: i64) -> RawVerdict {
        RawVerdict {
            blame_a,
            blame_b,
            analysis: "<p>分析</p>".into(),
            advice: "<p>建议</p>".into(),
        }
    }

    // ---- CaseData ----

    #[test]
    fn empty_case_is_incomplete() {
        assert!(!CaseData::default().is_complete());
    }

    #[test]
    fn case_with_all_fields_is_complete() {
        let case = CaseData {
            name_a: "木可".into(),
            name_b: "木尚".into(),
            context: "忘记纪念日".into(),
            story_a: "他忘了".into(),
            story_b: "我没忘只是晚说".into(),
        };
        assert!(case.is_complete());
    }

    #[test]
    fn whitespace_only_field_is_incomplete() {
        let case = CaseData {
            name_a: "木可".into(),
            name_b: "木尚".into(),
            context: "   ".into(),
            story_a: "他忘了".into(),
            story_b: "我没忘".into(),
        };
        assert!(!case.is_complete());
    }

    #[test]
    fn clear_resets_every_field() {
        let mut case = CaseData {
            name_a: "a".into(),
            name_b: "b".into(),
            context: "c".into(),
            story_a: "d".into(),
            story_b: "e".into(),
        };
        case.clear();
        assert_eq!(case, CaseData::default());
    }

    #[test]
    fn story_mut_targets_the_right_slot() {
        let mut case = CaseData::default();
        case.story_mut(Party::A).push_str("一");
        case.story_mut(Party::B).push_str("二");
        assert_eq!(case.story_a, "一");
        assert_eq!(case.story_b, "二");
    }

    // ---- Winner derivation ----

    #[test]
    fn lower_blame_wins_for_a() {
        let v = Verdict::from_raw(raw(30, 70)).unwrap();
        assert_eq!(v.winner, Winner::A);
    }

    #[test]
    fn lower_blame_wins_for_b() {
        let v = Verdict::from_raw(raw(70, 30)).unwrap();
        assert_eq!(v.winner, Winner::B);
    }

    #[test]
    fn equal_blame_is_a_tie() {
        let v = Verdict::from_raw(raw(50, 50)).unwrap();
        assert_eq!(v.winner, Winner::Tie);
    }

    // ---- Validation ----

    #[test]
    fn negative_blame_is_rejected() {
        assert_eq!(
            Verdict::from_raw(raw(-10, 110)).unwrap_err(),
            VerdictError::BlameOutOfRange(-10, 110)
        );
    }

    #[test]
    fn blame_above_100_is_rejected() {
        assert_eq!(
            Verdict::from_raw(raw(120, 0)).unwrap_err(),
            VerdictError::BlameOutOfRange(120, 0)
        );
    }

    #[test]
    fn sum_far_from_100_is_rejected() {
        assert_eq!(
            Verdict::from_raw(raw(20, 30)).unwrap_err(),
            VerdictError::BlameSumMismatch(50)
        );
    }

    #[test]
    fn sum_within_tolerance_is_accepted() {
        // 49 + 48 = 97 — inside the ±5 window.
        let v = Verdict::from_raw(raw(49, 48)).unwrap();
        assert_eq!(v.blame_a, 49);
        assert_eq!(v.blame_b, 48);
    }

    #[test]
    fn empty_analysis_is_rejected() {
        let mut r = raw(40, 60);
        r.analysis = String::new();
        assert_eq!(
            Verdict::from_raw(r).unwrap_err(),
            VerdictError::EmptyField("analysis")
        );
    }

    #[test]
    fn analysis_that_sanitizes_to_nothing_is_rejected() {
        let mut r = raw(40, 60);
        // A script tag is dropped entirely by the sanitizer.
        r.analysis = "<script></script>".into();
        assert_eq!(
            Verdict::from_raw(r).unwrap_err(),
            VerdictError::EmptyField("analysis")
        );
    }

    #[test]
    fn html_fields_are_sanitized_on_construction() {
        let mut r = raw(40, 60);
        r.advice = "<p onclick=\"x()\">冷静<script>alert(1)</script>十分钟</p>".into();
        let v = Verdict::from_raw(r).unwrap();
        assert_eq!(v.advice, "<p>冷静alert(1)十分钟</p>");
    }

    #[test]
    fn raw_verdict_deserializes_wire_names() {
        let v: RawVerdict = serde_json::from_str(
            r#"{"blameA":30,"blameB":70,"analysis":"<p>a</p>","advice":"<p>b</p>"}"#,
        )
        .unwrap();
        assert_eq!(v.blame_a, 30);
        assert_eq!(v.blame_b, 70);
    }
}
