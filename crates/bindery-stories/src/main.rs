#![forbid(unsafe_code)]

//! bindery-stories: run scripted binding stories from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use bindery_core::BindingConfig;
use bindery_stories::{Story, StoryError, StoryOptions, run_story};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bindery-stories")]
#[command(about = "Scripted controlled/uncontrolled binding stories")]
#[command(version)]
struct Cli {
    /// Binding config file (.toml or .json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available stories.
    List,
    /// Run one story, or all of them.
    Run {
        /// Story to run. Runs every story when omitted.
        story: Option<Story>,

        /// Let the parent control the child (mutator story).
        #[arg(long)]
        controlled: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), StoryError> {
    match cli.command {
        Commands::List => {
            for story in Story::ALL {
                println!("{:<26} {}", story.name(), story.summary());
            }
            Ok(())
        }
        Commands::Run { story, controlled } => {
            let config = match &cli.config {
                Some(path) => BindingConfig::load(path)?,
                None => BindingConfig::default(),
            }
            .with_env_overrides()?;
            let options = StoryOptions { controlled, config };

            let stories = match story {
                Some(story) => vec![story],
                None => Story::ALL.to_vec(),
            };
            for story in stories {
                let transcript = run_story(story, &options)?;
                println!("== {story}");
                print!("{transcript}");
            }
            Ok(())
        }
    }
}
