//! Command-line interface for nurtal.

mod commands;

use clap::{Parser, Subcommand};

pub use commands::{cmd_cleanup_sessions, cmd_init, cmd_list_articles, cmd_set_password};

/// Nurtal - newsroom CMS and reader site
#[derive(Parser)]
#[command(name = "nurtal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server and background jobs (default)
    #[command(alias = "daemon")]
    Serve,

    /// Write a default config.toml if none exists
    Init,

    /// Delete expired admin sessions once
    CleanupSessions,

    /// Set an admin's password and sign out all of their sessions
    SetPassword {
        email: String,
        password: String,
    },

    /// List articles
    #[command(alias = "ls")]
    List {
        /// Only show published articles
        #[arg(long)]
        published: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_serve() {
        let cli = Cli::try_parse_from(["nurtal"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["nurtal", "daemon"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }

    #[test]
    fn test_parse_subcommands() {
        let cli = Cli::try_parse_from(["nurtal", "set-password", "a@b.c", "secret1"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::SetPassword { ref email, ref password })
                if email == "a@b.c" && password == "secret1"
        ));

        let cli = Cli::try_parse_from(["nurtal", "list", "--published"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::List { published: true })));

        assert!(Cli::try_parse_from(["nurtal", "set-password", "a@b.c"]).is_err());
    }
}
