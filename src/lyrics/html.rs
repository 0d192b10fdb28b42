//! Lyrics extraction from a Genius song page
//!
//! The lyrics live in one or more `<div data-lyrics-container="true">`
//! elements. Their markup is flattened to text: `<br>` becomes a newline,
//! other tags are dropped and character references are decoded. Nested
//! elements marked `data-exclude-from-selection="true"` (headers, ads) are
//! removed first.

use std::sync::OnceLock;

use regex::{Captures, Regex};

fn container_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<div\b[^>]*\bdata-lyrics-container\s*=\s*"true"[^>]*>"#)
            .expect("static regex")
    })
}

fn excluded_open_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)<div\b[^>]*\bdata-exclude-from-selection\s*=\s*"true"[^>]*>"#)
            .expect("static regex")
    })
}

fn div_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<(/?)div\b[^>]*>").expect("static regex"))
}

fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("static regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

fn entity_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("static regex"))
}

fn section_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[.*?\]").expect("static regex"))
}

fn stanza_gap_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\n").expect("static regex"))
}

/// A `<div>` element located in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DivSpan {
    /// Start of the opening tag
    outer_start: usize,
    /// End of the opening tag
    inner_start: usize,
    /// Start of the matching closing tag
    inner_end: usize,
    /// End of the matching closing tag
    outer_end: usize,
}

/// Find every non-overlapping `<div>` whose opening tag matches `open`,
/// pairing it with its closing tag by counting nested divs. An element
/// left unclosed extends to the end of the document.
fn find_divs(html: &str, open: &Regex) -> Vec<DivSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(start) = open.find_at(html, cursor) {
        let mut depth = 1usize;
        let mut span = DivSpan {
            outer_start: start.start(),
            inner_start: start.end(),
            inner_end: html.len(),
            outer_end: html.len(),
        };

        for tag in div_tag_re().captures_iter(&html[start.end()..]) {
            let Some(whole) = tag.get(0) else { continue };
            if tag.get(1).is_some_and(|slash| !slash.as_str().is_empty()) {
                depth -= 1;
                if depth == 0 {
                    span.inner_end = start.end() + whole.start();
                    span.outer_end = start.end() + whole.end();
                    break;
                }
            } else {
                depth += 1;
            }
        }

        cursor = span.outer_end;
        spans.push(span);
    }

    spans
}

/// Extract the lyrics text of a song page.
///
/// Returns `None` if the page has no lyrics container or the containers
/// hold no text.
pub fn extract_lyrics(html: &str) -> Option<String> {
    let containers = find_divs(html, container_open_re());
    if containers.is_empty() {
        return None;
    }

    let text = containers
        .iter()
        .map(|span| {
            let inner = &html[span.inner_start..span.inner_end];
            markup_to_text(&strip_excluded(inner))
        })
        .collect::<Vec<_>>()
        .join("\n");

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Drop nested elements marked as excluded from selection
fn strip_excluded(inner: &str) -> String {
    let excluded = find_divs(inner, excluded_open_re());
    if excluded.is_empty() {
        return inner.to_string();
    }

    let mut kept = String::with_capacity(inner.len());
    let mut cursor = 0;
    for span in excluded {
        kept.push_str(&inner[cursor..span.outer_start]);
        cursor = span.outer_end;
    }
    kept.push_str(&inner[cursor..]);
    kept
}

/// Flatten markup to text
fn markup_to_text(markup: &str) -> String {
    let with_breaks = line_break_re().replace_all(markup, "\n");
    let without_tags = tag_re().replace_all(&with_breaks, "");
    decode_entities(&without_tags)
}

/// Decode named and numeric character references; unknown names are kept
pub fn decode_entities(text: &str) -> String {
    entity_re()
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            let decoded = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                match name {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    "nbsp" => Some(' '),
                    _ => None,
                }
            };

            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Remove bracketed annotations such as `[Chorus]` anywhere in the text,
/// then halve blank-line runs so the lines a header occupied close up.
///
/// Each `\n\n` pair becomes a single `\n`, which also removes the blank
/// line between stanzas.
pub fn remove_section_headers(text: &str) -> String {
    let without_headers = section_header_re().replace_all(text, "");
    stanza_gap_re().replace_all(&without_headers, "\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><body>
<div class="Header">Song Title Lyrics</div>
<div data-lyrics-container="true" class="Lyrics__Container"><div data-exclude-from-selection="true"><span>3 Contributors</span><div>Song Title Lyrics</div></div>[Verse 1]<br/>Don&#x27;t stop <a href="/x"><span class="ref">me now</span></a><br/>I&#39;m having &amp; such a good time</div>
<div class="Ad">ad</div>
<div data-lyrics-container="true"><i>Second</i> part<br>end</div>
</body></html>"#;

    #[test]
    fn test_extract_containers() {
        let text = extract_lyrics(PAGE).unwrap();
        assert_eq!(
            text,
            "[Verse 1]\nDon't stop me now\nI'm having & such a good time\nSecond part\nend"
        );
    }

    #[test]
    fn test_no_container() {
        assert!(extract_lyrics("<html><div>Nothing here</div></html>").is_none());
    }

    #[test]
    fn test_empty_container() {
        assert!(extract_lyrics(r#"<div data-lyrics-container="true"><br/> </div>"#).is_none());
    }

    #[test]
    fn test_unclosed_container_runs_to_end() {
        let text = extract_lyrics(r#"<div data-lyrics-container="true">tail<br>text"#).unwrap();
        assert_eq!(text, "tail\ntext");
    }

    #[test]
    fn test_nested_divs_stay_inside() {
        let html = r#"<div data-lyrics-container="true">a<div>b</div>c</div><div>outside</div>"#;
        assert_eq!(extract_lyrics(html).unwrap(), "abc");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("&lt;a&gt; &quot;b&quot; &#8217; &#x2019;"), "<a> \"b\" \u{2019} \u{2019}");
        assert_eq!(decode_entities("&unknown; &amp;"), "&unknown; &");
    }

    #[test]
    fn test_remove_section_headers() {
        let text = "[Intro]\nHello\n[Chorus: Both]\nLa la [softly]\n\n[Outro]";
        assert_eq!(remove_section_headers(text), "\nHello\nLa la \n");
    }

    #[test]
    fn test_stanza_gaps_collapse_pairwise() {
        assert_eq!(remove_section_headers("a\n\nb"), "a\nb");
        assert_eq!(remove_section_headers("a\n\n\nb"), "a\n\nb");
        assert_eq!(remove_section_headers("a\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn test_brackets_do_not_span_lines() {
        assert_eq!(remove_section_headers("[open\nclose]"), "[open\nclose]");
    }
}
