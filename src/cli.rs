use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "killer game matchmaking service")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the matchmaking server
    Serve {
        /// Port number (optional, defaults to PORT or 6543)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Create the database tables if they do not exist
    InitDb,
    /// Show who would be queued for the active game
    Candidates,
    /// Print shell completions to stdout
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_serve_port() {
        let cli = Cli::try_parse_from(["killer_matchmaking", "serve", "--port", "7000"]).unwrap();
        assert_eq!(cli.command, Command::Serve { port: Some(7000) });

        let cli = Cli::try_parse_from(["killer_matchmaking", "serve"]).unwrap();
        assert_eq!(cli.command, Command::Serve { port: None });
    }

    #[test]
    fn test_parses_other_commands() {
        let cli = Cli::try_parse_from(["killer_matchmaking", "initdb"]).unwrap();
        assert_eq!(cli.command, Command::InitDb);

        let cli = Cli::try_parse_from(["killer_matchmaking", "completions", "bash"]).unwrap();
        assert_eq!(cli.command, Command::Completions { shell: Shell::Bash });
    }
}
