//! Content Structure pillar (25 points)
//!
//! How well the page's markup serves machine readers: structured data,
//! heading discipline, tables and lists, multimodal content, a concise
//! direct answer up front, and enough depth to be worth citing.

use super::{step_at_least, Metric, PillarBreakdown};
use crate::types::PageFacts;

const STRUCTURED_DATA_MAX: f64 = 6.0;
const HEADING_HIERARCHY_MAX: f64 = 5.0;
const TABLES_LISTS_MAX: f64 = 3.0;
const MULTIMODAL_MAX: f64 = 4.0;
const DIRECT_ANSWER_MAX: f64 = 3.0;
const CONTENT_DEPTH_MAX: f64 = 4.0;

/// Alt-text coverage ratio that counts as descriptive imagery
const GOOD_ALT_COVERAGE: f64 = 0.8;

/// Word-count window for a concise leading answer
const ANSWER_MIN_WORDS: usize = 20;
const ANSWER_MAX_WORDS: usize = 60;

pub fn score(facts: &PageFacts) -> PillarBreakdown {
    let mut breakdown = PillarBreakdown::default();

    // Structured data
    let schema_count = facts.schema_types.len() as f64;
    let structured_score = step_at_least(schema_count, &[(3.0, STRUCTURED_DATA_MAX), (1.0, 4.0)]);
    let mut structured = Metric::new(
        schema_count,
        structured_score,
        STRUCTURED_DATA_MAX,
        if facts.schema_types.is_empty() {
            "No schema.org markup detected".to_string()
        } else {
            format!("{} schema.org type(s) present", facts.schema_types.len())
        },
    );
    if structured_score < STRUCTURED_DATA_MAX {
        structured = structured.with_recommendation(
            "Add JSON-LD structured data (Article, FAQ, or Product) so crawlers and \
             AI assistants can parse the page's meaning",
        );
    }
    breakdown.push("structured_data", structured);

    // Heading hierarchy: one H1, no skipped levels
    let has_headings = (1..=6u8).any(|l| facts.headings.level(l) > 0);
    let single_h1 = facts.headings.h1 == 1;
    let no_skips = has_headings && !facts.headings.has_level_skip();
    let heading_score = if single_h1 { 3.0 } else { 0.0 } + if no_skips { 2.0 } else { 0.0 };
    let mut heading = Metric::new(
        format!("{} H1", facts.headings.h1),
        heading_score,
        HEADING_HIERARCHY_MAX,
        match (single_h1, no_skips) {
            (true, true) => "Well-formed heading hierarchy".to_string(),
            (true, false) => "Single H1 but heading levels are skipped".to_string(),
            (false, _) => format!("Expected exactly one H1, found {}", facts.headings.h1),
        },
    );
    if heading_score < HEADING_HIERARCHY_MAX {
        heading = heading.with_recommendation(
            "Use exactly one H1 and descend heading levels without gaps (H1 → H2 → H3)",
        );
    }
    breakdown.push("heading_hierarchy", heading);

    // Tables and lists
    let structures = facts.tables + facts.lists;
    let tl_score = step_at_least(structures as f64, &[(3.0, TABLES_LISTS_MAX), (1.0, 2.0)]);
    let mut tables_lists = Metric::new(
        structures,
        tl_score,
        TABLES_LISTS_MAX,
        format!("{} table(s), {} list(s)", facts.tables, facts.lists),
    );
    if tl_score < TABLES_LISTS_MAX {
        tables_lists = tables_lists.with_recommendation(
            "Break comparable facts into tables or lists; extractable structure is \
             favored for answer snippets",
        );
    }
    breakdown.push("tables_lists", tables_lists);

    // Multimodal content: descriptive alt text plus video
    let alt_points = if facts.images == 0 {
        0.0
    } else {
        let coverage = facts.images_with_alt as f64 / facts.images as f64;
        if coverage >= GOOD_ALT_COVERAGE {
            3.0
        } else if coverage >= 0.5 {
            2.0
        } else if coverage > 0.0 {
            1.0
        } else {
            0.0
        }
    };
    let video_points = if facts.videos > 0 { 1.0 } else { 0.0 };
    let mut multimodal = Metric::new(
        format!(
            "{}/{} images with alt text, {} video(s)",
            facts.images_with_alt, facts.images, facts.videos
        ),
        alt_points + video_points,
        MULTIMODAL_MAX,
        if facts.images == 0 && facts.videos == 0 {
            "Text-only page".to_string()
        } else {
            "Multimodal content present".to_string()
        },
    );
    if alt_points + video_points < MULTIMODAL_MAX {
        multimodal = multimodal.with_recommendation(
            "Give every meaningful image a descriptive alt attribute and consider \
             embedding supporting video",
        );
    }
    breakdown.push("multimodal", multimodal);

    // Direct answer heuristic over the leading paragraph
    let answer_words = facts.leading_text.split_whitespace().count();
    let answer_score = if (ANSWER_MIN_WORDS..=ANSWER_MAX_WORDS).contains(&answer_words) {
        DIRECT_ANSWER_MAX
    } else if answer_words > 0 {
        1.0
    } else {
        0.0
    };
    let mut direct_answer = Metric::new(
        answer_words as u64,
        answer_score,
        DIRECT_ANSWER_MAX,
        format!("Opening paragraph is {} words", answer_words),
    );
    if answer_score < DIRECT_ANSWER_MAX {
        direct_answer = direct_answer.with_recommendation(
            "Open with a 20-60 word paragraph that answers the page's core question directly",
        );
    }
    breakdown.push("direct_answer", direct_answer);

    // Content depth
    let depth_score = step_at_least(
        f64::from(facts.word_count),
        &[(1500.0, CONTENT_DEPTH_MAX), (800.0, 3.0), (300.0, 2.0), (100.0, 1.0)],
    );
    let mut depth = Metric::new(
        facts.word_count,
        depth_score,
        CONTENT_DEPTH_MAX,
        format!("{} words of visible content", facts.word_count),
    );
    if depth_score < CONTENT_DEPTH_MAX {
        depth = depth.with_recommendation(
            "Deepen topic coverage; thin pages are rarely selected as sources",
        );
    }
    breakdown.push("content_depth", depth);

    breakdown
}
