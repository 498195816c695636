//! Parameter normalization for OpenRank queries.
//!
//! Every option is normalized independently: an absent or out-of-range value
//! is replaced by its default, anything else passes through unchanged. The
//! ranking strategy is the one exception; an unknown strategy is rejected.
//!
//! | Option | Allowed | Default |
//! |--------|---------|---------|
//! | ranking strategy | follows, engagement, activity, og_circles, og_engagement, og_activity | follows |
//! | graph strategy | following, engagement | engagement |
//! | agg | rms, sumsquare, sum | rms |
//! | weights | `^L\d+C\d+R\d+$` | L1C10R5 |
//! | voting | single, multiple | single |
//! | k | 1..=5 | 2 |
//! | limit | > 0, optionally capped | 100 |
//! | offset | >= 0 | 0 |

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// Default frame weights: likes x1, casts x10, recasts x5.
pub const DEFAULT_WEIGHTS: &str = "L1C10R5";

/// Default degrees of separation for personalized queries.
pub const DEFAULT_K: u32 = 2;

/// Largest accepted degrees of separation.
pub const MAX_K: u32 = 5;

/// Default result limit for OpenRank queries.
pub const DEFAULT_LIMIT: u32 = 100;

/// Cap applied to limits on capped endpoints (direct links, SDK hooks).
pub const MAX_LIMIT: u32 = 100;

static WEIGHTS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^L\d+C\d+R\d+$").expect("weights regex should compile"));

// ═══════════════════════════════════════════════════════════════════════════
// Strategies
// ═══════════════════════════════════════════════════════════════════════════

/// Strategy accepted by the ranking API (`/rankings`, `/ranking_index`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingStrategy {
    #[default]
    Follows,
    Engagement,
    Activity,
    OgCircles,
    OgEngagement,
    OgActivity,
}

impl RankingStrategy {
    /// All supported strategies, in the order they are listed to callers.
    pub const ALL: [RankingStrategy; 6] = [
        Self::Follows,
        Self::Engagement,
        Self::Activity,
        Self::OgCircles,
        Self::OgEngagement,
        Self::OgActivity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Follows => "follows",
            Self::Engagement => "engagement",
            Self::Activity => "activity",
            Self::OgCircles => "og_circles",
            Self::OgEngagement => "og_engagement",
            Self::OgActivity => "og_activity",
        }
    }

    /// Comma-separated list of accepted strategy names.
    pub fn allowed_list() -> String {
        Self::ALL.map(Self::as_str).join(", ")
    }

    /// Parse an optional strategy.
    ///
    /// Absent or empty input yields the default; an unknown name is rejected.
    pub fn parse(value: Option<&str>) -> Result<Self, ValidationError> {
        match value {
            None | Some("") => Ok(Self::default()),
            Some(name) => Self::ALL
                .into_iter()
                .find(|s| s.as_str() == name)
                .ok_or_else(|| ValidationError::InvalidStrategy {
                    given: name.to_string(),
                }),
        }
    }
}

/// Which relationship graph a links/neighbors/scores query runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphStrategy {
    Following,
    #[default]
    Engagement,
}

impl GraphStrategy {
    /// Path segment used by the gateway and upstream.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Following => "following",
            Self::Engagement => "engagement",
        }
    }

    pub fn normalize(value: Option<&str>) -> Self {
        match value {
            Some("following") => Self::Following,
            Some("engagement") => Self::Engagement,
            _ => Self::default(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Frame options
// ═══════════════════════════════════════════════════════════════════════════

/// Aggregation function used to combine frame interaction scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Rms,
    SumSquare,
    Sum,
}

impl Aggregation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rms => "rms",
            Self::SumSquare => "sumsquare",
            Self::Sum => "sum",
        }
    }

    pub fn normalize(value: Option<&str>) -> Self {
        match value {
            Some("rms") => Self::Rms,
            Some("sumsquare") => Self::SumSquare,
            Some("sum") => Self::Sum,
            _ => Self::default(),
        }
    }
}

/// Whether a neighbor casts one vote or one vote per interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voting {
    #[default]
    Single,
    Multiple,
}

impl Voting {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multiple => "multiple",
        }
    }

    pub fn normalize(value: Option<&str>) -> Self {
        match value {
            Some("single") => Self::Single,
            Some("multiple") => Self::Multiple,
            _ => Self::default(),
        }
    }
}

/// Returns `value` if it matches `L<int>C<int>R<int>`, otherwise the default weights.
pub fn normalize_weights(value: Option<&str>) -> String {
    match value {
        Some(w) if WEIGHTS_REGEX.is_match(w) => w.to_string(),
        _ => DEFAULT_WEIGHTS.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Numeric options
// ═══════════════════════════════════════════════════════════════════════════

/// Parse an integer from a query-string value. Non-numeric input counts as absent.
pub fn parse_int(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

/// Integer from a JSON body field. JSON integers and numeric strings are
/// accepted; floats and every other type count as absent.
pub fn value_as_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_int(Some(s)),
        _ => None,
    }
}

/// Degrees of separation, accepted in `(0, 6)`.
pub fn normalize_k(value: Option<i64>) -> u32 {
    match value {
        Some(k) if k > 0 && k <= i64::from(MAX_K) => k as u32,
        _ => DEFAULT_K,
    }
}

/// Result limit. Must be positive, and at most `cap` when one applies.
pub fn normalize_limit(value: Option<i64>, cap: Option<u32>) -> u32 {
    let max = i64::from(cap.unwrap_or(u32::MAX));
    match value {
        Some(limit) if limit > 0 && limit <= max => limit as u32,
        _ => DEFAULT_LIMIT,
    }
}

/// Pagination offset. Negative or absent values become 0.
pub fn normalize_offset(value: Option<i64>) -> u64 {
    match value {
        Some(offset) if offset > 0 => offset as u64,
        _ => 0,
    }
}

/// The `details` flag, from a query-string value.
pub fn normalize_details(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some(v) if v.eq_ignore_ascii_case("true") || v == "1")
}

// ═══════════════════════════════════════════════════════════════════════════
// Frame ranking query
// ═══════════════════════════════════════════════════════════════════════════

/// Frame options as they arrive on the query string, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFrameParams {
    pub agg: Option<String>,
    pub weights: Option<String>,
    pub voting: Option<String>,
    pub k: Option<String>,
    pub limit: Option<String>,
    pub details: Option<String>,
}

/// Normalized frame ranking options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameParams {
    pub agg: Aggregation,
    pub weights: String,
    pub voting: Voting,
    pub k: u32,
    pub limit: u32,
    pub details: bool,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            agg: Aggregation::default(),
            weights: DEFAULT_WEIGHTS.to_string(),
            voting: Voting::default(),
            k: DEFAULT_K,
            limit: DEFAULT_LIMIT,
            details: false,
        }
    }
}

impl FrameParams {
    /// Normalize raw query-string values. `limit_cap` applies an upper bound to `limit`.
    pub fn normalize(raw: &RawFrameParams, limit_cap: Option<u32>) -> Self {
        Self {
            agg: Aggregation::normalize(raw.agg.as_deref()),
            weights: normalize_weights(raw.weights.as_deref()),
            voting: Voting::normalize(raw.voting.as_deref()),
            k: normalize_k(parse_int(raw.k.as_deref())),
            limit: normalize_limit(parse_int(raw.limit.as_deref()), limit_cap),
            details: normalize_details(raw.details.as_deref()),
        }
    }

    /// Query pairs in upstream order. `details` is only sent for global rankings.
    pub fn query_pairs(&self, include_details: bool) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("agg", self.agg.as_str().to_string()),
            ("weights", self.weights.clone()),
            ("voting", self.voting.as_str().to_string()),
            ("k", self.k.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if include_details {
            pairs.push(("details", self.details.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Strategies --

    #[test]
    fn ranking_strategy_defaults_to_follows() {
        assert_eq!(RankingStrategy::parse(None), Ok(RankingStrategy::Follows));
        assert_eq!(RankingStrategy::parse(Some("")), Ok(RankingStrategy::Follows));
    }

    #[test]
    fn ranking_strategy_accepts_every_known_name() {
        for strategy in RankingStrategy::ALL {
            assert_eq!(RankingStrategy::parse(Some(strategy.as_str())), Ok(strategy));
        }
    }

    #[test]
    fn ranking_strategy_rejects_unknown_names() {
        for name in ["following", "FOLLOWS", "og_", "popular", " follows"] {
            let err = RankingStrategy::parse(Some(name)).unwrap_err();
            assert_eq!(
                err,
                ValidationError::InvalidStrategy {
                    given: name.to_string()
                }
            );
        }
    }

    #[test]
    fn graph_strategy_falls_back_to_engagement() {
        assert_eq!(GraphStrategy::normalize(Some("following")), GraphStrategy::Following);
        assert_eq!(GraphStrategy::normalize(Some("follows")), GraphStrategy::Engagement);
        assert_eq!(GraphStrategy::normalize(None), GraphStrategy::Engagement);
    }

    // -- Frame options --

    #[test]
    fn aggregation_normalize() {
        assert_eq!(Aggregation::normalize(Some("sumsquare")), Aggregation::SumSquare);
        assert_eq!(Aggregation::normalize(Some("sum")), Aggregation::Sum);
        assert_eq!(Aggregation::normalize(Some("avg")), Aggregation::Rms);
        assert_eq!(Aggregation::normalize(None), Aggregation::Rms);
    }

    #[test]
    fn voting_normalize() {
        assert_eq!(Voting::normalize(Some("multiple")), Voting::Multiple);
        assert_eq!(Voting::normalize(Some("many")), Voting::Single);
    }

    #[test]
    fn weights_pass_through_when_well_formed() {
        assert_eq!(normalize_weights(Some("L2C3R4")), "L2C3R4");
        assert_eq!(normalize_weights(Some("L10C100R0")), "L10C100R0");
    }

    #[test]
    fn weights_fall_back_when_malformed() {
        for bad in ["", "L1C10", "l1c10r5", "L1C10R5 ", "LxC1R1", "R5C10L1", "L1C10R5X"] {
            assert_eq!(normalize_weights(Some(bad)), DEFAULT_WEIGHTS, "input {bad:?}");
        }
        assert_eq!(normalize_weights(None), DEFAULT_WEIGHTS);
    }

    // -- Numeric options --

    #[test]
    fn k_outside_open_interval_becomes_default() {
        for k in [-1, 0, 6, 7, 100, i64::MAX] {
            assert_eq!(normalize_k(Some(k)), DEFAULT_K, "k={k}");
        }
        assert_eq!(normalize_k(None), DEFAULT_K);
    }

    #[test]
    fn k_inside_interval_passes_through() {
        for k in 1..=5 {
            assert_eq!(normalize_k(Some(k)), k as u32);
        }
    }

    #[test]
    fn limit_with_and_without_cap() {
        assert_eq!(normalize_limit(Some(50), Some(MAX_LIMIT)), 50);
        assert_eq!(normalize_limit(Some(100), Some(MAX_LIMIT)), 100);
        assert_eq!(normalize_limit(Some(101), Some(MAX_LIMIT)), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(Some(500), None), 500);
        assert_eq!(normalize_limit(Some(0), None), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(Some(-3), None), DEFAULT_LIMIT);
        assert_eq!(normalize_limit(Some(i64::MAX), None), DEFAULT_LIMIT);
    }

    #[test]
    fn offset_negative_becomes_zero() {
        assert_eq!(normalize_offset(Some(-5)), 0);
        assert_eq!(normalize_offset(Some(20)), 20);
        assert_eq!(normalize_offset(None), 0);
    }

    #[test]
    fn parse_int_treats_garbage_as_absent() {
        assert_eq!(parse_int(Some("42")), Some(42));
        assert_eq!(parse_int(Some(" 7 ")), Some(7));
        assert_eq!(parse_int(Some("4.5")), None);
        assert_eq!(parse_int(Some("abc")), None);
        assert_eq!(parse_int(None), None);
    }

    #[test]
    fn body_values_only_count_when_integral() {
        use serde_json::json;

        assert_eq!(value_as_int(Some(&json!(3))), Some(3));
        assert_eq!(value_as_int(Some(&json!(-5))), Some(-5));
        assert_eq!(value_as_int(Some(&json!("3"))), Some(3));
        assert_eq!(value_as_int(Some(&json!(2.5))), None);
        assert_eq!(value_as_int(Some(&json!("2.5"))), None);
        assert_eq!(value_as_int(Some(&json!(true))), None);
        assert_eq!(value_as_int(Some(&json!([1]))), None);
        assert_eq!(value_as_int(Some(&Value::Null)), None);
        assert_eq!(value_as_int(None), None);

        assert_eq!(normalize_k(value_as_int(Some(&json!(2.5)))), DEFAULT_K);
        assert_eq!(normalize_offset(value_as_int(Some(&json!(-5)))), 0);
    }

    #[test]
    fn details_flag() {
        assert!(normalize_details(Some("true")));
        assert!(normalize_details(Some("TRUE")));
        assert!(normalize_details(Some("1")));
        assert!(!normalize_details(Some("false")));
        assert!(!normalize_details(Some("yes")));
        assert!(!normalize_details(None));
    }

    // -- FrameParams --

    #[test]
    fn frame_params_defaults_from_empty_query() {
        let params = FrameParams::normalize(&RawFrameParams::default(), None);
        assert_eq!(params, FrameParams::default());
    }

    #[test]
    fn frame_params_keep_valid_values() {
        let raw = RawFrameParams {
            agg: Some("sum".into()),
            weights: Some("L3C2R1".into()),
            voting: Some("multiple".into()),
            k: Some("4".into()),
            limit: Some("25".into()),
            details: Some("true".into()),
        };
        let params = FrameParams::normalize(&raw, None);
        assert_eq!(params.agg, Aggregation::Sum);
        assert_eq!(params.weights, "L3C2R1");
        assert_eq!(params.voting, Voting::Multiple);
        assert_eq!(params.k, 4);
        assert_eq!(params.limit, 25);
        assert!(params.details);
    }

    #[test]
    fn frame_params_query_pairs_order() {
        let pairs = FrameParams::default().query_pairs(true);
        let keys: Vec<_> = pairs.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["agg", "weights", "voting", "k", "limit", "details"]);
        assert_eq!(pairs[5].1, "false");

        let without = FrameParams::default().query_pairs(false);
        assert!(without.iter().all(|(k, _)| *k != "details"));
    }
}
