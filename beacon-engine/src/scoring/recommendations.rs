//! Recommendation generation
//!
//! Turns lost points in a score breakdown into an ordered improvement
//! plan. Priority follows points lost, biggest losses first.

use super::{PillarId, ScoreResult};
use serde::{Deserialize, Serialize};

/// Points lost at or above which a recommendation is HIGH priority
const HIGH_PRIORITY_LOSS: f64 = 4.0;
/// Points lost at or above which a recommendation is MEDIUM priority
const MEDIUM_PRIORITY_LOSS: f64 = 2.0;
/// Losses below this are noise, not recommendations
const MIN_LOSS: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One actionable improvement derived from a scored metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub pillar: PillarId,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub metric_name: String,
    pub current_score: f64,
    pub max_score: f64,
    pub points_lost: f64,
}

/// Generate recommendations for every metric that lost points and
/// carries an improvement hint, ordered by points lost descending
pub fn generate_recommendations(score: &ScoreResult) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    for pillar in PillarId::all() {
        for entry in &score.breakdown.pillar(pillar).entries {
            let metric = &entry.metric;
            let lost = metric.points_lost();
            let Some(description) = &metric.recommendation else {
                continue;
            };
            if lost < MIN_LOSS {
                continue;
            }

            let priority = if lost >= HIGH_PRIORITY_LOSS {
                Priority::High
            } else if lost >= MEDIUM_PRIORITY_LOSS {
                Priority::Medium
            } else {
                Priority::Low
            };

            recommendations.push(Recommendation {
                pillar,
                priority,
                title: title_for(&entry.key),
                description: description.clone(),
                impact: format!("up to +{:.1} points", lost),
                metric_name: entry.key.clone(),
                current_score: metric.score,
                max_score: metric.max_score,
                points_lost: lost,
            });
        }
    }

    recommendations.sort_by(|a, b| {
        b.points_lost
            .partial_cmp(&a.points_lost)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    recommendations
}

/// Humanize a metric key ("structured_data" → "Structured data")
fn title_for(key: &str) -> String {
    let mut title = key.replace('_', " ");
    if let Some(first) = title.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    title
}
