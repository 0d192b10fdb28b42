//! CLI Command Implementations
//!
//! Each command runs to completion or returns the error that ends the
//! process; the binaries only translate that into an exit status.

use log::info;

use crate::analysis::{analyze_file, classify_energy};
use crate::cli::{AnalyzeArgs, LyricsArgs};
use crate::config::{AnalysisConfig, GeniusConfig};
use crate::error::Result;
use crate::lyrics::{GeniusClient, LyricsFetcher, LyricsSource};

/// Analyze the input file and write its features as JSON
pub fn analyze(args: &AnalyzeArgs, config: &AnalysisConfig) -> Result<()> {
    let features = analyze_file(&args.input, config)?;
    features.write_json(&args.output)?;

    let assessment = classify_energy(&features.metrics());
    info!(
        "Wrote {} (bpm {:.1}, suggested energy {}, score {})",
        args.output.display(),
        features.rhythm.bpm,
        assessment.suggested_energy,
        assessment.score.total_score
    );

    Ok(())
}

/// Fetch the lyrics using the Genius config from the environment
pub fn lyrics(args: &LyricsArgs) -> Result<String> {
    let config = GeniusConfig::from_env()?;
    let client = GeniusClient::new(config)?;
    lyrics_with(client, args)
}

/// Fetch the lyrics through an arbitrary source
pub fn lyrics_with<S: LyricsSource>(source: S, args: &LyricsArgs) -> Result<String> {
    info!("Looking up '{}' by '{}'", args.title, args.artist);
    LyricsFetcher::new(source).fetch(&args.artist, &args.title)
}
