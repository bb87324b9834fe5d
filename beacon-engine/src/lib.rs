//! # Beacon Engine
//!
//! Audits a website's readiness for search and AI-assisted discovery.
//! Signals come from independently-failing providers (Moz, DataForSEO,
//! Search Console, PageSpeed) and a local page inspector; a cascading
//! fallback picks one winner per metric family, and a five-pillar
//! scoring engine reduces everything into a deterministic, bounded,
//! explainable score with per-metric breakdowns.
//!
//! Pipeline: provider adapters → cascade → normalizer → scoring →
//! aggregation/comparison. Provider failures degrade scores and surface
//! as warnings naming the affected pillar; only a batch where zero URLs
//! could be analyzed fails outright.

pub mod aggregate;
pub mod analyzer;
pub mod cascade;
pub mod error;
pub mod estimate;
pub mod events;
pub mod normalize;
pub mod providers;
pub mod ratelimit;
pub mod scoring;
pub mod types;
pub mod warnings;

pub use crate::analyzer::{
    Analyzer, AnalyzerLimits, BatchAnalysis, CompetitorGroup, DomainResult, UrlAnalysis,
};
pub use crate::error::{EngineError, EngineResult};
pub use crate::events::ScanEvent;
pub use crate::scoring::{score_url, ScoreResult};
pub use crate::types::UnifiedSeoMetrics;
