use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate subtitles for a video and play it with the result attached
    Generate {
        /// Input video file
        #[arg(long)]
        video: Option<PathBuf>,

        /// Existing subtitle file (SubRip)
        #[arg(short, long)]
        subtitle: Option<PathBuf>,

        /// Target language code
        #[arg(short, long)]
        language: Option<String>,

        /// Title for the generated subtitles
        #[arg(short, long)]
        title: Option<String>,

        /// Attach the subtitles without opening a player
        #[arg(long)]
        no_play: bool,
    },

    /// List the supported target languages
    Languages,

    /// Write the default configuration file
    InitConfig {
        /// Destination path
        #[arg(short, long, default_value = "config.toml")]
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_arguments() {
        let args = Args::try_parse_from([
            "autosub", "-v", "generate", "--video", "in.mp4", "-s", "in.srt", "-l", "en", "-t",
            "My Clip",
        ])
        .unwrap();

        assert!(args.verbose);
        let Commands::Generate { video, subtitle, language, title, no_play } = args.command else {
            panic!("expected generate");
        };
        assert_eq!(video, Some(PathBuf::from("in.mp4")));
        assert_eq!(subtitle, Some(PathBuf::from("in.srt")));
        assert_eq!(language.as_deref(), Some("en"));
        assert_eq!(title.as_deref(), Some("My Clip"));
        assert!(!no_play);
    }

    #[test]
    fn test_generate_inputs_are_optional() {
        let args = Args::try_parse_from(["autosub", "generate", "--no-play"]).unwrap();
        assert!(matches!(
            args.command,
            Commands::Generate { video: None, no_play: true, .. }
        ));
    }
}
