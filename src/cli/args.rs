//! Command line argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Template;
use crate::pipeline::Action;

/// Cross-compiles a Go application and packages it for Linux distributions
#[derive(Parser, Debug)]
#[command(
    name = "crosspack",
    version,
    about = "Cross-compiles a Go application and packages it as deb, rpm, pkg and AppImage",
    long_about = "Builds the application for every platform in its manifest, then wraps \
the Linux binaries into the package formats the manifest enables.

Without a command, a full package run is performed."
)]
pub struct Args {
    /// Path to the project manifest
    #[arg(short, long, global = true, default_value = "make.toml")]
    pub config: PathBuf,

    /// Prefix console output with timestamps
    #[arg(short = 't', long, global = true)]
    pub timestamps: bool,

    /// Exit non-zero when any step failed
    #[arg(long, global = true)]
    pub strict: bool,

    /// What to do; defaults to a full package run
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove everything a previous run produced
    #[command(alias = "cln")]
    Clean,

    /// Clean, then cross-compile every configured platform
    #[command(alias = "bin")]
    Binary,

    /// Clean, build, then produce every enabled package format
    #[command(aliases = ["pkg", "all"])]
    Package,

    /// Write a starter manifest
    New {
        /// Which template to write
        #[arg(value_enum, default_value = "default")]
        template: Template,
    },
}

impl Command {
    /// The pipeline action this command requests, if any
    pub fn action(&self) -> Option<Action> {
        match self {
            Command::Clean => Some(Action::Clean),
            Command::Binary => Some(Action::Binary),
            Command::Package => Some(Action::Package),
            Command::New { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &[&str]) -> Args {
        Args::try_parse_from(line).unwrap()
    }

    #[test]
    fn no_command_defaults_to_a_package_run() {
        let args = parse(&["crosspack"]);
        assert!(args.command.is_none());
        assert_eq!(args.config, PathBuf::from("make.toml"));
        assert!(!args.strict);
    }

    #[test]
    fn command_aliases_match_their_commands() {
        for (alias, action) in [
            ("cln", Action::Clean),
            ("bin", Action::Binary),
            ("pkg", Action::Package),
            ("all", Action::Package),
        ] {
            let args = parse(&["crosspack", alias]);
            assert_eq!(args.command.unwrap().action(), Some(action));
        }
    }

    #[test]
    fn new_carries_a_template_choice() {
        let args = parse(&["crosspack", "new"]);
        assert!(matches!(
            args.command,
            Some(Command::New {
                template: Template::Default
            })
        ));

        let args = parse(&["crosspack", "new", "empty"]);
        assert!(matches!(
            args.command,
            Some(Command::New {
                template: Template::Empty
            })
        ));
    }

    #[test]
    fn global_flags_are_accepted_after_the_command() {
        let args = parse(&["crosspack", "package", "--strict", "-c", "other.toml"]);
        assert!(args.strict);
        assert_eq!(args.config, PathBuf::from("other.toml"));
    }
}
