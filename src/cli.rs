use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use anyhow::Result;

use crate::config::SavingStrategyKind;
use crate::core::Engine;

#[derive(Parser)]
#[command(name = "eme")]
#[command(about = "Extracts Ecore metamodels from Java projects")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default eme.toml
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Extract the metamodel of a project and save it as .ecore
    Extract {
        /// Root directory of the Java project
        project: PathBuf,

        /// Project name, used for the namespace URI and the file name
        #[arg(short, long)]
        name: Option<String>,

        /// Where to save the metamodel
        #[arg(short, long, value_enum)]
        strategy: Option<StrategyArg>,

        /// Output directory, implies the custom-path strategy
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the extracted intermediate model
    Inspect {
        /// Root directory of the Java project
        project: PathBuf,

        /// Print the model as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    SameProject,
    CustomPath,
}

impl From<StrategyArg> for SavingStrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::SameProject => SavingStrategyKind::SameProject,
            StrategyArg::CustomPath => SavingStrategyKind::CustomPath,
        }
    }
}

impl Cli {
    pub fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path } => engine.init(path),
            Commands::Extract { project, name, strategy, output } => {
                engine.extract_and_save(&project, name, strategy.map(Into::into), output)?;
                Ok(())
            }
            Commands::Inspect { project, json } => engine.inspect(&project, json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract_arguments() {
        let cli = Cli::parse_from(["eme", "-v", "extract", "demo", "--name", "Demo", "--strategy", "custom-path", "-o", "out"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Extract { project, name, strategy, output } => {
                assert_eq!(project, PathBuf::from("demo"));
                assert_eq!(name.as_deref(), Some("Demo"));
                assert!(matches!(strategy, Some(StrategyArg::CustomPath)));
                assert_eq!(output, Some(PathBuf::from("out")));
            }
            _ => panic!("expected the extract command"),
        }
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        assert!(Cli::try_parse_from(["eme", "extract", "demo", "--strategy", "elsewhere"]).is_err());
    }
}
