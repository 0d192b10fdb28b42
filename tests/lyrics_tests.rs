//! Lyrics Integration Tests
//!
//! Run the fetch pipeline against the in-memory source.

use pretty_assertions::assert_eq;

use trackscan::lyrics::html::extract_lyrics;
use trackscan::lyrics::{LyricsFetcher, MockLyricsSource, SongHit};

#[test]
fn test_cleaned_lyrics_from_first_hit() {
    let url = "https://genius.com/Queen-and-david-bowie-under-pressure-lyrics";
    let mut hit = SongHit::new(url);
    hit.full_title = Some("Under Pressure by Queen & David Bowie".to_string());

    let raw = "Under Pressure Lyrics\nMm ba ba de\nUm bum ba de\n\nPressure pushin' down on me\nYou might also like\n12Embed";
    let source = MockLyricsSource::new().with_song(hit, Some(raw));
    let fetcher = LyricsFetcher::new(source);

    let lyrics = fetcher.fetch("Queen", "Under Pressure").unwrap();
    assert_eq!(lyrics, "Mm ba ba de\nUm bum ba de\n\nPressure pushin' down on me");
    assert_eq!(fetcher.source().searches(), vec!["Under Pressure Queen".to_string()]);
}

#[test]
fn test_first_hit_wins() {
    let source = MockLyricsSource::new()
        .with_song(SongHit::new("https://genius.com/cover"), Some("Cover version"))
        .with_song(SongHit::new("https://genius.com/original"), Some("Original"));
    let fetcher = LyricsFetcher::new(source);

    assert_eq!(fetcher.fetch("Artist", "Song").unwrap(), "Cover version");
    assert_eq!(
        fetcher.source().fetched_urls(),
        vec!["https://genius.com/cover".to_string()]
    );
}

#[test]
fn test_not_found_message() {
    let fetcher = LyricsFetcher::new(MockLyricsSource::new());
    let err = fetcher.fetch("Nobody", "Silent Song").unwrap_err();
    assert_eq!(err.report_line(), "No lyrics found for 'Silent Song' by 'Nobody'");
}

#[test]
fn test_page_without_container() {
    let raw = extract_lyrics("<html><body><div>Instrumental</div></body></html>");
    assert_eq!(raw, None);

    let source = MockLyricsSource::new().with_song(SongHit::new("https://genius.com/x"), raw.as_deref());
    let err = LyricsFetcher::new(source).fetch("Artist", "Instrumental").unwrap_err();
    assert!(err.is_not_found());
}
