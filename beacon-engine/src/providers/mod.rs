//! Provider Adapters
//!
//! One adapter per external data source. Each adapter owns its HTTP
//! client, request shaping, and response types, and hands raw payloads to
//! the normalizer before anything crosses into the cascade. Adapters
//! report their own configuration state: "not configured" (no
//! credentials, skipped silently) is distinct from "configured but
//! failed" (recorded as a non-fatal error).
//!
//! Cascade priority is declarative and lives with the analyzer:
//! - keywords: DataForSEO → Search Console
//! - backlinks: Moz → DataForSEO

pub mod dataforseo;
pub mod gsc;
pub mod inspector;
pub mod moz;
pub mod pagespeed;

pub use dataforseo::DataForSeoClient;
pub use gsc::GscClient;
pub use inspector::HttpPageInspector;
pub use moz::MozClient;
pub use pagespeed::PageSpeedClient;
