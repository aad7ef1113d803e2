//! Command-line interface

use crate::error::{Error, Result};
use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments for oggplay
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "oggplay")]
#[command(about = "Play an Ogg file with Theora video and Vorbis audio")]
#[command(version)]
pub struct Args {
    /// Ogg file to play
    pub file: PathBuf,

    /// Configuration file
    #[arg(short, long, env = "OGGPLAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Color saturation of the video effect (0.0 grayscale, 1.0 unchanged)
    #[arg(short, long)]
    pub saturation: Option<f64>,
}

/// What the command line asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    Play(Args),
    /// Help or version was requested; the rendered text goes to stdout
    Info(String),
}

/// Parse a full argument list, program name first.
///
/// Anything clap rejects becomes [`Error::BadInvocation`] carrying the
/// rendered message and usage.
pub fn parse_args<I, T>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(args) {
        Ok(args) => Ok(Invocation::Play(args)),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            Ok(Invocation::Info(e.render().to_string()))
        }
        Err(e) => Err(Error::BadInvocation(e.render().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_bad_invocation_with_usage() {
        match parse_args(["oggplay"]) {
            Err(Error::BadInvocation(message)) => assert!(message.contains("Usage")),
            other => panic!("Expected BadInvocation, got {:?}", other),
        }
        assert_eq!(Error::BadInvocation(String::new()).exit_code(), 255);
    }

    #[test]
    fn test_extra_positional_is_bad_invocation() {
        let result = parse_args(["oggplay", "a.ogg", "b.ogg"]);
        assert!(matches!(result, Err(Error::BadInvocation(_))));
    }

    #[test]
    fn test_file_and_saturation() {
        match parse_args(["oggplay", "--saturation", "0.5", "clip.ogg"]).unwrap() {
            Invocation::Play(args) => {
                assert_eq!(args.file, PathBuf::from("clip.ogg"));
                assert_eq!(args.saturation, Some(0.5));
            }
            other => panic!("Expected Play, got {:?}", other),
        }
    }

    #[test]
    fn test_help_is_not_an_error() {
        match parse_args(["oggplay", "--help"]).unwrap() {
            Invocation::Info(text) => assert!(text.contains("Ogg file to play")),
            other => panic!("Expected Info, got {:?}", other),
        }
    }
}
