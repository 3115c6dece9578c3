//! Opportunity Scoring
//!
//! `score = round(0.4 * volume + 0.4 * (100 - difficulty) + 0.2 * source_gap)`
//! where each component is already on a 0-100 scale.

/// Search volume that earns the full volume component
pub const VOLUME_CEILING: f64 = 100_000.0;

/// Number of ranking sources that earns the full gap component
pub const SOURCE_CEILING: f64 = 5.0;

const VOLUME_WEIGHT: f64 = 0.4;
const DIFFICULTY_WEIGHT: f64 = 0.4;
const SOURCE_WEIGHT: f64 = 0.2;

/// Volume scaled to 0-100, saturating at [`VOLUME_CEILING`].
pub fn normalized_volume(search_volume: u64) -> f64 {
    (search_volume as f64 / VOLUME_CEILING * 100.0).min(100.0)
}

/// Source coverage scaled to 0-100, saturating at [`SOURCE_CEILING`].
pub fn source_gap(source_count: usize) -> f64 {
    (source_count as f64 / SOURCE_CEILING * 100.0).min(100.0)
}

// == Opportunity Score ==
/// Scores an opportunity keyword on a 0-100 scale.
pub fn opportunity_score(search_volume: u64, difficulty: u8, source_count: usize) -> u8 {
    let inverted_difficulty = 100.0 - f64::from(difficulty.min(100));
    let score = VOLUME_WEIGHT * normalized_volume(search_volume)
        + DIFFICULTY_WEIGHT * inverted_difficulty
        + SOURCE_WEIGHT * source_gap(source_count);

    let rounded = score.round();
    debug_assert!((0.0..=100.0).contains(&rounded), "score out of range: {}", rounded);
    rounded as u8
}
