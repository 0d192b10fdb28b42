//! audio-features: write rhythm, loudness and danceability features of an
//! audio file as JSON

use std::process::ExitCode;

use trackscan::cli::{self, commands, AnalyzeArgs};
use trackscan::config::AnalysisConfig;

fn main() -> ExitCode {
    let args: AnalyzeArgs = match cli::parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => return e.report(),
    };

    cli::init_logging();

    match commands::analyze(&args, &AnalysisConfig::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.report_line());
            ExitCode::FAILURE
        }
    }
}
