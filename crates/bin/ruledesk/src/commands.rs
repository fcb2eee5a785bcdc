//! Subcommand implementations.
//!
//! Output goes to the given writer so the commands can be exercised against
//! an in-memory buffer; diagnostics go through `tracing`.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use ruledesk_app::ports::{EventPublisher, RulesetRepository};
use ruledesk_app::services::ruleset_service::RulesetService;
use ruledesk_domain::error::RulesetError;
use ruledesk_domain::id::RulesetId;
use ruledesk_domain::rule::JsonRule;
use ruledesk_domain::ruleset::{JsonRulesetDefinition, Ruleset};

/// Verdict on one ruleset definition file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Valid,
    Invalid,
    Unsupported { rule_count: usize },
    Malformed(String),
    /// The file could not be read at all.
    Unreadable(String),
}

impl CheckOutcome {
    /// Classify the envelope text of a ruleset definition.
    #[must_use]
    pub fn of_definition(text: &str) -> Self {
        match JsonRulesetDefinition::parse_single(text) {
            Ok(rule) if rule.is_valid() => Self::Valid,
            Ok(_) | Err(RulesetError::InvalidRule) => Self::Invalid,
            Err(RulesetError::Unsupported { rule_count }) => Self::Unsupported { rule_count },
            Err(RulesetError::Json(err)) => Self::Malformed(err.to_string()),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Invalid => f.write_str("invalid"),
            Self::Unsupported { rule_count } => write!(f, "unsupported ({rule_count} rules)"),
            Self::Malformed(reason) => write!(f, "invalid ({reason})"),
            Self::Unreadable(reason) => write!(f, "error ({reason})"),
        }
    }
}

fn read_definition(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ruleset file {}", path.display()))
}

fn read_rule(path: &Path) -> anyhow::Result<JsonRule> {
    let text = read_definition(path)?;
    JsonRulesetDefinition::parse_single(&text)
        .with_context(|| format!("cannot read a single rule from {}", path.display()))
}

/// Load the JSON rule used as the starting point of empty rulesets.
///
/// # Errors
///
/// Fails when the file cannot be read or is not a JSON rule.
pub fn load_template(path: &Path) -> anyhow::Result<JsonRule> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read rule template {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("rule template {} is not a JSON rule", path.display()))
}

/// Print one verdict per file; returns whether every file is valid.
///
/// A file that cannot be read gets an error line and counts as invalid;
/// the remaining files are still checked.
///
/// # Errors
///
/// Fails when the output cannot be written.
pub fn check(files: &[PathBuf], out: &mut impl Write) -> anyhow::Result<bool> {
    let mut all_valid = true;
    for path in files {
        let outcome = match read_definition(path) {
            Ok(text) => CheckOutcome::of_definition(&text),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "cannot read ruleset file");
                CheckOutcome::Unreadable(format!("{err:#}"))
            }
        };
        tracing::debug!(path = %path.display(), %outcome, "checked");
        all_valid &= outcome.is_valid();
        writeln!(out, "{}: {outcome}", path.display())?;
    }
    Ok(all_valid)
}

/// Print the `tag<TAB>asset type` pairs offered to action targets.
///
/// # Errors
///
/// Fails when the file does not hold exactly one rule.
pub fn targets(file: &Path, out: &mut impl Write) -> anyhow::Result<()> {
    let rule = read_rule(file)?;
    for entry in rule.target_type_map() {
        writeln!(
            out,
            "{}\t{}",
            entry.tag.as_deref().unwrap_or("-"),
            entry.asset_type
        )?;
    }
    Ok(())
}

fn write_ruleset(out: &mut impl Write, ruleset: &Ruleset) -> std::io::Result<()> {
    writeln!(
        out,
        "{}\t{}\t{}\t{}",
        ruleset.id,
        ruleset.realm,
        ruleset.name,
        if ruleset.enabled { "enabled" } else { "disabled" }
    )
}

/// Store the rule of `file` as a new ruleset and print its id.
///
/// # Errors
///
/// Fails when the file does not hold exactly one valid rule, or on storage
/// errors.
pub async fn import<R, P>(
    service: &RulesetService<R, P>,
    file: &Path,
    name: &str,
    realm: &str,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    R: RulesetRepository,
    P: EventPublisher,
{
    let rule = read_rule(file)?;
    let ruleset = service.import_rule(name, realm, rule).await?;
    writeln!(out, "{}", ruleset.id)?;
    Ok(())
}

/// Create a ruleset without any rule definition and print its id.
///
/// # Errors
///
/// Fails on a blank name or realm, or on storage errors.
pub async fn create<R, P>(
    service: &RulesetService<R, P>,
    name: &str,
    realm: &str,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    R: RulesetRepository,
    P: EventPublisher,
{
    let ruleset = Ruleset::builder().name(name).realm(realm).build()?;
    let ruleset = service.create_ruleset(ruleset).await?;
    writeln!(out, "{}", ruleset.id)?;
    Ok(())
}

/// Print one line per stored ruleset.
///
/// # Errors
///
/// Fails on storage errors.
pub async fn list<R, P>(
    service: &RulesetService<R, P>,
    realm: Option<&str>,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    R: RulesetRepository,
    P: EventPublisher,
{
    for ruleset in service.list_rulesets(realm).await? {
        write_ruleset(out, &ruleset)?;
    }
    Ok(())
}

/// Open the rule of a ruleset as the editor would and print it with its
/// validity and target map.
///
/// # Errors
///
/// Fails for unknown ids and rulesets that do not hold a single rule.
pub async fn show<R, P>(
    service: &RulesetService<R, P>,
    id: RulesetId,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    R: RulesetRepository,
    P: EventPublisher,
{
    let editor = service.open_editor(id).await?;
    write_ruleset(out, editor.ruleset())?;
    writeln!(out, "{}", serde_json::to_string_pretty(editor.rule())?)?;
    writeln!(
        out,
        "status: {}",
        if editor.is_valid() { "valid" } else { "invalid" }
    )?;
    for entry in editor.target_type_map() {
        writeln!(
            out,
            "target: {}\t{}",
            entry.tag.as_deref().unwrap_or("-"),
            entry.asset_type
        )?;
    }
    Ok(())
}

/// Print the stored definition of a ruleset verbatim.
///
/// # Errors
///
/// Fails for unknown ids and rulesets without a definition.
pub async fn export<R, P>(
    service: &RulesetService<R, P>,
    id: RulesetId,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    R: RulesetRepository,
    P: EventPublisher,
{
    let ruleset = service.get_ruleset(id).await?;
    let Some(rules) = ruleset.rules else {
        anyhow::bail!("ruleset {id} has no rule definition");
    };
    writeln!(out, "{rules}")?;
    Ok(())
}

/// Delete a ruleset.
///
/// # Errors
///
/// Fails on storage errors.
pub async fn delete<R, P>(service: &RulesetService<R, P>, id: RulesetId) -> anyhow::Result<()>
where
    R: RulesetRepository,
    P: EventPublisher,
{
    service.delete_ruleset(id).await?;
    Ok(())
}
