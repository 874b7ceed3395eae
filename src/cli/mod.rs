//! CLI module for Draco
//!
//! Provides command-line argument parsing for the draco-server binary.

use clap::Parser;
use std::path::PathBuf;

/// Draco - game backend authentication server
///
/// Player accounts, session tokens and ownership checks for player-owned
/// characters.
#[derive(Parser, Debug)]
#[command(
    name = "draco-server",
    version,
    about = "Draco - game backend authentication server",
    long_about = "Player account registration, password login with signed session tokens,\n\
                  and ownership-checked access to player characters.\n\n\
                  The signing secret is read from the environment variable named by\n\
                  auth.jwt_secret_env in the configuration file.",
    after_help = "EXAMPLES:\n    \
                  draco-server                     # Start the server (requires draco.toml)\n    \
                  draco-server --config prod.toml  # Use a custom config file\n    \
                  draco-server --verbose --json    # Debug logging as JSON lines"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "draco.toml", env = "DRACO_CONFIG")]
    pub config: PathBuf,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["draco-server"]).unwrap();
        assert!(!cli.verbose);
        assert!(!cli.json);
    }

    #[test]
    fn test_flags() {
        let cli =
            Cli::try_parse_from(["draco-server", "-c", "custom.toml", "--verbose", "--json"])
                .unwrap();
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert!(cli.verbose);
        assert!(cli.json);
    }
}
