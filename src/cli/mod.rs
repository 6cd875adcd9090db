pub mod completions;
pub mod compose;
pub mod extract;
pub mod init;
pub mod inspect;

use std::path::Path;

use clap::{Parser, Subcommand};

use crate::error::Result;
use crate::extract::ExtractOptions;
use crate::manifest::Manifest;

/// charex - Extract and recompose layered character sprites
#[derive(Parser, Debug)]
#[command(name = "charex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract sprites, textures and hierarchy exports from a container
    Extract(extract::ExtractArgs),

    /// Compose selected sprites into one PNG
    Compose(compose::ComposeArgs),

    /// Print a container's hierarchy and diagnostics
    Inspect(inspect::InspectArgs),

    /// Write a default charex.yaml
    Init(init::InitArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Flags shared by commands that read a container.
#[derive(clap::Args, Debug, Default)]
pub struct EngineArgs {
    /// Texture decode workers (default: manifest, then one per core)
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// Fail when the container holds more than one top-level unit
    #[arg(long)]
    pub single_root: bool,

    /// Leave cheek sprites exactly as decoded
    #[arg(long)]
    pub no_correct: bool,

    /// Ignore renderer colours stored on records
    #[arg(long)]
    pub no_tint: bool,
}

impl EngineArgs {
    /// Manifest values with command-line overrides applied.
    pub fn options(&self, manifest: &Manifest) -> ExtractOptions {
        let mut options = ExtractOptions::from(manifest);
        if let Some(jobs) = self.jobs {
            options.jobs = jobs;
        }
        if self.single_root {
            options.root_policy = crate::hierarchy::RootPolicy::RequireSingle;
        }
        if self.no_correct {
            options.correct_cheeks = false;
        }
        if self.no_tint {
            options.apply_tints = false;
        }
        options
    }
}

/// Load `charex.yaml` from the working directory, if there is one.
pub fn load_manifest() -> Result<Manifest> {
    Manifest::discover(Path::new(".")).map(|(manifest, _)| manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::RootPolicy;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_engine_args_override_manifest() {
        let manifest = Manifest::parse("jobs: 8").unwrap();
        let args = EngineArgs {
            jobs: Some(2),
            single_root: true,
            no_correct: true,
            no_tint: true,
        };
        let options = args.options(&manifest);
        assert_eq!(options.jobs, 2);
        assert_eq!(options.root_policy, RootPolicy::RequireSingle);
        assert!(!options.correct_cheeks);
        assert!(!options.apply_tints);

        let options = EngineArgs::default().options(&manifest);
        assert_eq!(options.jobs, 8);
        assert!(options.correct_cheeks);
        assert!(options.apply_tints);
    }

    #[test]
    fn test_parse_compose_command() {
        let cli = Cli::try_parse_from([
            "charex", "compose", "hero.chrx", "--select", "1", "--select", "Face", "--depth", "3=-1",
        ])
        .unwrap();
        match cli.command {
            Commands::Compose(args) => {
                assert_eq!(args.select, vec!["1", "Face"]);
                assert_eq!(args.depth, vec!["3=-1"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
