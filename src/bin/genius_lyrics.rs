//! genius-lyrics: print the lyrics of a song from Genius

use std::io::Write;
use std::process::ExitCode;

use trackscan::cli::{self, commands, LyricsArgs};

fn main() -> ExitCode {
    let args: LyricsArgs = match cli::parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => return e.report(),
    };

    cli::init_logging();

    match commands::lyrics(&args) {
        Ok(lyrics) => {
            // A closed stdout is a failed run, not a panic
            let mut stdout = std::io::stdout().lock();
            match writeln!(stdout, "{}", lyrics).and_then(|()| stdout.flush()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    log::debug!("Failed to write lyrics: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("{}", e.report_line());
            ExitCode::FAILURE
        }
    }
}
