use clap::Parser;
use miette::Result;
use charex::cli::{Cli, Commands};
use charex::output::Printer;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Extract(args) => {
            let manifest = charex::cli::load_manifest()?;
            charex::cli::extract::run(args, &manifest, &printer)?
        }
        Commands::Compose(args) => {
            let manifest = charex::cli::load_manifest()?;
            charex::cli::compose::run(args, &manifest, &printer)?
        }
        Commands::Inspect(args) => {
            let manifest = charex::cli::load_manifest()?;
            charex::cli::inspect::run(args, &manifest, &printer)?
        }
        Commands::Init(args) => charex::cli::init::run(args, &printer)?,
        Commands::Completions(args) => charex::cli::completions::run(args, &printer)?,
    }

    Ok(())
}
