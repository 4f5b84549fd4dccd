use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{CategoryId, ReviewResponse};

/// Inputs the aggregator needs beyond the response set itself. Built by the
/// service from the catalog template and the engine configuration, and
/// carried into the repository so the write transaction can recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringContext {
    /// Declared ceiling per category, as the catalog provider defines them.
    pub category_maxes: BTreeMap<CategoryId, u16>,
    /// Ceiling assumed for a response whose category is not in the map.
    pub fallback_max_rating: u16,
    /// Rating value treated as a critical failure.
    pub critical_rating: u16,
    pub pass_threshold_percent: f32,
}

/// Derived aggregate for one instance's latest full response set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub total_score: u32,
    pub max_possible_score: u32,
    pub percentage: f32,
    pub has_low_rating: bool,
    pub requires_manager_followup: bool,
}

/// Fold the full response set into the instance aggregate.
///
/// This runs over the complete set on every submission rather than adjusting
/// cached totals, so the result is correct regardless of how concurrent
/// submissions interleave. Categories without a response contribute zero to
/// the total but still count toward the maximum.
pub fn aggregate(responses: &[ReviewResponse], ctx: &ScoringContext) -> ScoreSummary {
    let total_score: u32 = responses.iter().map(|response| response.rating as u32).sum();

    let declared_max: u32 = ctx.category_maxes.values().map(|max| *max as u32).sum();
    let unresolved_max: u32 = responses
        .iter()
        .filter(|response| !ctx.category_maxes.contains_key(&response.category_id))
        .map(|_| ctx.fallback_max_rating as u32)
        .sum();
    let max_possible_score = declared_max + unresolved_max;

    let percentage = if max_possible_score == 0 {
        0.0
    } else {
        total_score as f32 / max_possible_score as f32 * 100.0
    };

    let has_low_rating = responses
        .iter()
        .any(|response| response.rating == ctx.critical_rating);
    let requires_manager_followup = has_low_rating || percentage < ctx.pass_threshold_percent;

    ScoreSummary {
        total_score,
        max_possible_score,
        percentage,
        has_low_rating,
        requires_manager_followup,
    }
}
