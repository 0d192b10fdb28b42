//! Lyrics text cleanup
//!
//! Genius pages wrap the lyrics in a generated title line ("Song Lyrics")
//! and a trailer of embed counters and recommendation blurbs. These are
//! stripped line by line.

/// Marker left behind by the recommendation widget
const RECOMMENDATION_MARKER: &str = "You might also like";

/// Strip the title header and trailing boilerplate, then trim.
///
/// 1. The first line is dropped if it contains `Lyrics`.
/// 2. Trailing lines are dropped while they are blank, embed markers
///    (`Embed`, `3Embed`, ...), bare numbers or contain
///    `You might also like`.
pub fn clean_lyrics(raw: &str) -> String {
    let mut lines: Vec<&str> = raw.split('\n').collect();

    if lines.first().is_some_and(|first| first.contains("Lyrics")) {
        lines.remove(0);
    }

    while lines.last().is_some_and(|last| is_trailer_line(last)) {
        lines.pop();
    }

    lines.join("\n").trim().to_string()
}

fn is_trailer_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || is_embed_marker(trimmed)
        || trimmed.chars().all(|c| c.is_ascii_digit())
        || line.contains(RECOMMENDATION_MARKER)
}

/// `Embed` optionally preceded by the embed count
fn is_embed_marker(trimmed: &str) -> bool {
    trimmed
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .starts_with("Embed")
}
