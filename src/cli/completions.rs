//! Shell completions for the charex command set.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::Shell;

use crate::error::{CharexError, Result};
use crate::output::{display_path, Printer};

use super::Cli;

const BIN_NAME: &str = "charex";

/// Generate shell completions
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: CompletionsArgs, printer: &Printer) -> Result<()> {
    match &args.output {
        None => write_completions(args.shell, &mut std::io::stdout()),
        Some(path) => {
            let mut file = File::create(path).map_err(|e| CharexError::Io {
                path: path.clone(),
                message: format!("Failed to create completion script: {}", e),
            })?;
            write_completions(args.shell, &mut file)?;
            printer.success("Wrote", &format!("{} completions to {}", args.shell, display_path(path)));
            Ok(())
        }
    }
}

/// Render the completion script for `shell` into `out`.
pub fn write_completions(shell: Shell, out: &mut impl Write) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_bash_script_covers_commands() {
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();

        for word in ["charex", "extract", "compose", "inspect", "--select", "--depth", "--sprites-only"] {
            assert!(script.contains(word), "missing {word}");
        }
    }

    #[test]
    fn test_writes_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("charex.fish");
        let args = CompletionsArgs {
            shell: Shell::Fish,
            output: Some(path.clone()),
        };
        run(args, &Printer::with_color(false)).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("compose"));
    }
}
