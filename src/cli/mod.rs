//! CLI Module
//!
//! Argument parsing and logging setup shared by the `audio-features` and
//! `genius-lyrics` binaries.
//!
//! Both tools take exactly two positional operands, taken verbatim: there
//! are no flags, so `--help` or `-x.wav` is an operand like any other.
//! Any other operand count prints a one-line usage message to stderr and
//! exits with status 1 before any work is done.

pub mod commands;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;

/// Extract rhythm, loudness and danceability features to JSON
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "audio-features")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct AnalyzeArgs {
    /// Audio file to analyze (WAV, MP3, FLAC, OGG, ...)
    #[arg(allow_hyphen_values = true)]
    pub input: PathBuf,

    /// Path of the JSON file to write
    #[arg(allow_hyphen_values = true)]
    pub output: PathBuf,
}

/// Print the lyrics of a song from Genius
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "genius-lyrics")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct LyricsArgs {
    /// Artist name
    #[arg(allow_hyphen_values = true)]
    pub artist: String,

    /// Song title
    #[arg(allow_hyphen_values = true)]
    pub title: String,
}

/// A command line with a fixed positional operand list
pub trait Operands: Parser {
    /// Operand placeholders shown after the program name in the usage line
    const OPERANDS: &'static str;
}

impl Operands for AnalyzeArgs {
    const OPERANDS: &'static str = "<input_audio> <output_json>";
}

impl Operands for LyricsArgs {
    const OPERANDS: &'static str = "<artist> <title>";
}

/// Number of operands every tool takes
const OPERAND_COUNT: usize = 2;

/// Malformed command line; holds the usage line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageError(pub String);

impl UsageError {
    /// Print the usage line to stderr and return the failure status
    pub fn report(self) -> ExitCode {
        eprintln!("{}", self.0);
        ExitCode::FAILURE
    }
}

/// Usage line for `program`
pub fn usage_line<T: Operands>(program: &str) -> String {
    format!("Usage: {} {}", program, T::OPERANDS)
}

/// Parse `args` (program name first) into `T`
pub fn parse_args<T, I>(args: I) -> Result<T, UsageError>
where
    T: Operands,
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let arg0 = args.next();
    let program = arg0
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| T::command().get_name().to_string());
    let usage = || UsageError(usage_line::<T>(&program));

    let operands: Vec<OsString> = args.collect();
    if operands.len() != OPERAND_COUNT {
        return Err(usage());
    }

    // Everything after `--` is positional, including `--` itself
    let argv = std::iter::once(OsString::from(&program))
        .chain(std::iter::once(OsString::from("--")))
        .chain(operands);
    T::try_parse_from(argv).map_err(|_| usage())
}

/// Initialize stderr logging, filtered by `RUST_LOG` (default `warn`)
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}
