//! CLI definitions for ruledesk.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ruledesk_domain::id::RulesetId;

#[derive(Debug, Parser)]
#[command(
    name = "ruledesk",
    version,
    about = "Check, store and export JSON rule definitions",
    after_help = "Examples:\n  ruledesk check rules/*.json\n  ruledesk import rule.json --name 'Night lights' --realm master\n  ruledesk list --realm master"
)]
pub struct Cli {
    /// Configuration file (optional, defaults apply when missing).
    #[arg(long, global = true, value_name = "FILE", default_value = "ruledesk.toml")]
    pub config: PathBuf,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate ruleset files and report which ones could be saved.
    Check {
        /// Ruleset definition files (`{"rules": [rule]}`).
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Print the condition tags and asset types an action target can refer to.
    Targets {
        /// Ruleset definition file.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Store the rule of a valid ruleset file as a new ruleset.
    Import {
        /// Ruleset definition file.
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Ruleset name, also written into the rule.
        #[arg(long)]
        name: String,
        /// Realm the ruleset belongs to.
        #[arg(long)]
        realm: String,
    },
    /// Create a ruleset without any rule definition.
    New {
        /// Ruleset name.
        #[arg(long)]
        name: String,
        /// Realm the ruleset belongs to.
        #[arg(long)]
        realm: String,
    },
    /// List stored rulesets.
    List {
        /// Only list rulesets of this realm.
        #[arg(long)]
        realm: Option<String>,
    },
    /// Open the rule of a ruleset for editing and print it with its status.
    Show {
        /// Ruleset identifier.
        id: RulesetId,
    },
    /// Print the stored definition of a ruleset.
    Export {
        /// Ruleset identifier.
        id: RulesetId,
    },
    /// Delete a stored ruleset.
    Delete {
        /// Ruleset identifier.
        id: RulesetId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_check_with_many_files() {
        let cli = Cli::try_parse_from(["ruledesk", "check", "a.json", "b.json"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("ruledesk.toml"));
        match cli.command {
            Command::Check { files } => assert_eq!(files.len(), 2),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn should_require_at_least_one_file_to_check() {
        assert!(Cli::try_parse_from(["ruledesk", "check"]).is_err());
    }

    #[test]
    fn should_parse_import_options() {
        let cli = Cli::try_parse_from([
            "ruledesk", "import", "rule.json", "--name", "Night", "--realm", "master",
        ])
        .unwrap();
        match cli.command {
            Command::Import { name, realm, .. } => {
                assert_eq!(name, "Night");
                assert_eq!(realm, "master");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn should_reject_malformed_ruleset_id() {
        assert!(Cli::try_parse_from(["ruledesk", "export", "not-a-uuid"]).is_err());
    }

    #[test]
    fn should_accept_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["ruledesk", "list", "--config", "other.toml"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
