use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::gate::GateConfig;

/// How the engine treats a template or category the catalog cannot resolve.
///
/// `Permissive` mirrors the availability-over-strictness stance this engine
/// ships with: unknown categories score against a fallback ceiling and
/// unknown gate templates are skipped. `Strict` fails the request instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFallback {
    Permissive,
    Strict,
}

/// Engine thresholds and policy, passed in at construction. No literal in
/// the engine logic; everything tunable lives here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hours between instance creation and `locked_at`.
    pub update_window_hours: i64,
    /// Scores strictly below this percentage require manager follow-up.
    pub pass_threshold_percent: f32,
    /// The rating value treated as a critical failure sentinel.
    pub critical_rating: u16,
    /// Ceiling assumed for a category the catalog cannot resolve.
    pub fallback_max_rating: u16,
    pub lookup_fallback: LookupFallback,
    pub gate: GateConfig,
}

impl EngineConfig {
    pub fn update_window(&self) -> Duration {
        Duration::hours(self.update_window_hours)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_window_hours: 6,
            pass_threshold_percent: 85.0,
            critical_rating: 1,
            fallback_max_rating: 5,
            lookup_fallback: LookupFallback::Permissive,
            gate: GateConfig::standard(),
        }
    }
}
