//! `SQLite` implementation of [`RulesetRepository`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use ruledesk_app::ports::RulesetRepository;
use ruledesk_domain::error::{NotFoundError, RuledeskError};
use ruledesk_domain::id::RulesetId;
use ruledesk_domain::ruleset::Ruleset;
use ruledesk_domain::time;

use crate::error::StorageError;

struct Wrapper(Ruleset);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Ruleset> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let realm: String = row.try_get("realm")?;
        let enabled: bool = row.try_get("enabled")?;
        let rules: Option<String> = row.try_get("rules")?;
        let created_on: String = row.try_get("created_on")?;
        let last_modified: String = row.try_get("last_modified")?;

        let id = RulesetId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let created_on =
            time::parse_rfc3339(&created_on).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let last_modified = time::parse_rfc3339(&last_modified)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Ruleset {
            id,
            name,
            realm,
            enabled,
            rules,
            created_on,
            last_modified,
        }))
    }
}

/// `SQLite`-backed ruleset repository.
///
/// The rule definition is stored verbatim in the `rules` column.
pub struct SqliteRulesetRepository {
    pool: SqlitePool,
}

impl SqliteRulesetRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RulesetRepository for SqliteRulesetRepository {
    async fn create(&self, ruleset: Ruleset) -> Result<Ruleset, RuledeskError> {
        sqlx::query(
                "INSERT INTO rulesets (id, name, realm, enabled, rules, created_on, last_modified) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(ruleset.id.to_string())
            .bind(&ruleset.name)
            .bind(&ruleset.realm)
            .bind(ruleset.enabled)
            .bind(&ruleset.rules)
            .bind(ruleset.created_on.to_rfc3339())
            .bind(ruleset.last_modified.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(ruleset)
    }

    async fn get_by_id(&self, id: RulesetId) -> Result<Option<Ruleset>, RuledeskError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM rulesets WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Ruleset>, RuledeskError> {
        let rows: Vec<Wrapper> = sqlx::query_as("SELECT * FROM rulesets ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_by_realm(&self, realm: &str) -> Result<Vec<Ruleset>, RuledeskError> {
        let rows: Vec<Wrapper> =
            sqlx::query_as("SELECT * FROM rulesets WHERE realm = ? ORDER BY name")
                .bind(realm)
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, ruleset: Ruleset) -> Result<Ruleset, RuledeskError> {
        let result = sqlx::query(
                "UPDATE rulesets SET name = ?, realm = ?, enabled = ?, rules = ?, last_modified = ? WHERE id = ?",
            )
            .bind(&ruleset.name)
            .bind(&ruleset.realm)
            .bind(ruleset.enabled)
            .bind(&ruleset.rules)
            .bind(ruleset.last_modified.to_rfc3339())
            .bind(ruleset.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Ruleset",
                id: ruleset.id.to_string(),
            }
            .into());
        }
        Ok(ruleset)
    }

    async fn delete(&self, id: RulesetId) -> Result<(), RuledeskError> {
        sqlx::query("DELETE FROM rulesets WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}
