//! CLI module for the workflow catalog
//!
//! Subcommands:
//! - `serve`: index the workflow directory and run the HTTP server
//! - `index`: build the index once and print a report

pub mod index;
pub mod serve;

use clap::{Parser, Subcommand};

/// Workflow Catalog - searchable index of n8n workflow exports
#[derive(Parser)]
#[command(name = "workflow-catalog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(serve::ServeArgs),

    /// Index the workflow directory once and exit
    Index(index::IndexArgs),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["workflow-catalog", "serve", "--host", "0.0.0.0", "--port", "9000", "--dev"])
            .unwrap();

        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(9000));
                assert!(args.dev);
            }
            Command::Index(_) => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_index_dir() {
        let cli = Cli::try_parse_from(["workflow-catalog", "index", "--dir", "/srv/workflows"]).unwrap();

        match cli.command {
            Command::Index(args) => {
                assert_eq!(args.dir, Some(std::path::PathBuf::from("/srv/workflows")));
            }
            Command::Serve(_) => panic!("expected index"),
        }
    }
}
