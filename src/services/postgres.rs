use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgConnection, PgPool, Row};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseSettings;
use crate::core::{MatchError, MatchRepository, ProfileStore};
use crate::models::{Cat, CatDetail, CatMatch, MatchListing, MatchParty, MatchStatus, NewMatch, UserSnapshot};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

const CAT_COLUMNS: &str =
    "id, user_id, name, race, sex, age_in_month, description, has_matched, image_urls, created_at";

const MATCH_COLUMNS: &str = "id, uid, issuer_cat_id, issuer_user_id, matched_cat_id, matched_user_id, \
     message, approval_status, created_at";

/// Shared PostgreSQL connection pool
///
/// Owns the pool used by both the match repository and the profile store,
/// and applies the embedded migrations on connect.
#[derive(Clone)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, PostgresError> {
        if settings.url.is_empty() {
            return Err(PostgresError::InvalidInput("database.url is empty".to_string()));
        }

        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn cat_from_row(row: &PgRow) -> Result<Cat, sqlx::Error> {
    Ok(Cat {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        race: row.try_get("race")?,
        sex: row.try_get("sex")?,
        age_in_month: row.try_get("age_in_month")?,
        description: row.try_get("description")?,
        image_urls: row.try_get("image_urls")?,
        has_matched: row.try_get("has_matched")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Read a cat snapshot out of a joined row whose cat columns carry `prefix`
fn cat_detail_from_row(row: &PgRow, prefix: &str) -> Result<CatDetail, sqlx::Error> {
    let col = |name: &str| format!("{}_{}", prefix, name);
    Ok(CatDetail {
        id: row.try_get(col("id").as_str())?,
        name: row.try_get(col("name").as_str())?,
        race: row.try_get(col("race").as_str())?,
        sex: row.try_get(col("sex").as_str())?,
        age_in_month: row.try_get(col("age_in_month").as_str())?,
        image_urls: row.try_get(col("image_urls").as_str())?,
        description: row.try_get(col("description").as_str())?,
        has_matched: row.try_get(col("has_matched").as_str())?,
        created_at: row.try_get(col("created_at").as_str())?,
    })
}

fn match_from_row(row: &PgRow) -> Result<CatMatch, sqlx::Error> {
    Ok(CatMatch {
        seq: row.try_get("id")?,
        id: row.try_get("uid")?,
        issuer_cat_id: row.try_get("issuer_cat_id")?,
        issuer_user_id: row.try_get("issuer_user_id")?,
        target_cat_id: row.try_get("matched_cat_id")?,
        target_user_id: row.try_get("matched_user_id")?,
        message: row.try_get("message")?,
        status: row.try_get("approval_status")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Cat profiles backed by the `cats` table
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(client: &PostgresClient) -> Self {
        Self {
            pool: client.pool().clone(),
        }
    }

    /// Flag a cat as matched. Only called from inside the approval transaction.
    pub async fn mark_matched(conn: &mut PgConnection, cat_id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE cats SET has_matched = TRUE WHERE id = $1")
            .bind(cat_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get_cat_for_user(&self, cat_id: &str, user_id: i64) -> Result<Cat, MatchError> {
        let query = format!("SELECT {} FROM cats WHERE id = $1 AND user_id = $2", CAT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(cat_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(MatchError::cat_not_found)?;

        Ok(cat_from_row(&row)?)
    }

    async fn get_cat(&self, cat_id: &str) -> Result<Cat, MatchError> {
        let query = format!("SELECT {} FROM cats WHERE id = $1", CAT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(cat_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(MatchError::cat_not_found)?;

        Ok(cat_from_row(&row)?)
    }
}

/// Match proposals backed by the `cat_matches` table
#[derive(Clone)]
pub struct PgMatchRepository {
    client: PostgresClient,
}

impl PgMatchRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }

    fn pool(&self) -> &PgPool {
        self.client.pool()
    }
}

#[async_trait]
impl MatchRepository for PgMatchRepository {
    /// Inserts the proposal only while neither cat is matched.
    ///
    /// Both cat rows are share-locked in id order first. An approval in
    /// flight holds them exclusively, so the insert either waits for it and
    /// sees the new `has_matched`, or lands before the approval's cascade
    /// runs and gets rejected by it.
    async fn create_pending(&self, new_match: &NewMatch) -> Result<String, MatchError> {
        let mut tx = self.pool().begin().await?;

        let mut cat_ids = vec![new_match.issuer_cat_id.clone(), new_match.target_cat_id.clone()];
        cat_ids.sort();

        let cats = sqlx::query("SELECT id, has_matched FROM cats WHERE id = ANY($1) ORDER BY id FOR SHARE")
            .bind(&cat_ids[..])
            .fetch_all(&mut *tx)
            .await?;
        if cats.len() != 2 {
            return Err(MatchError::cat_not_found());
        }
        for row in &cats {
            let has_matched: bool = row.try_get("has_matched")?;
            if has_matched {
                return Err(MatchError::AlreadyMatched);
            }
        }

        let query = r#"
            INSERT INTO cat_matches (
                uid, issuer_cat_id, issuer_user_id, matched_cat_id, matched_user_id, message, approval_status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING uid
        "#;

        let row = sqlx::query(query)
            .bind(&new_match.id)
            .bind(&new_match.issuer_cat_id)
            .bind(new_match.issuer_user_id)
            .bind(&new_match.target_cat_id)
            .bind(new_match.target_user_id)
            .bind(&new_match.message)
            .bind(MatchStatus::Pending)
            .fetch_one(&mut *tx)
            .await?;
        let uid: String = row.try_get("uid")?;

        tx.commit().await?;

        Ok(uid)
    }

    /// Runs the cascade in one transaction.
    ///
    /// Both cat rows are locked first, in id order, so approvals that share
    /// a cat queue up behind each other. The match row is re-checked only
    /// after that, which lets a waiting approval see the cascade of the one
    /// that committed before it. Dropping the transaction on any error
    /// rolls everything back.
    async fn approve_with_cascade(&self, cat_match: &CatMatch) -> Result<(), MatchError> {
        let mut tx = self.pool().begin().await?;

        let mut cat_ids = vec![cat_match.issuer_cat_id.clone(), cat_match.target_cat_id.clone()];
        cat_ids.sort();

        let cats = sqlx::query("SELECT id, has_matched FROM cats WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(&cat_ids[..])
            .fetch_all(&mut *tx)
            .await?;
        if cats.len() != 2 {
            return Err(MatchError::cat_not_found());
        }

        let status: MatchStatus = sqlx::query("SELECT approval_status FROM cat_matches WHERE id = $1 FOR UPDATE")
            .bind(cat_match.seq)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(MatchError::match_not_found)?
            .try_get("approval_status")?;
        if !status.is_pending() {
            return Err(MatchError::NoLongerValid);
        }

        for row in &cats {
            let has_matched: bool = row.try_get("has_matched")?;
            if has_matched {
                return Err(MatchError::AlreadyMatched);
            }
        }

        sqlx::query("UPDATE cat_matches SET approval_status = $1 WHERE id = $2")
            .bind(MatchStatus::Approved)
            .bind(cat_match.seq)
            .execute(&mut *tx)
            .await?;

        PgProfileStore::mark_matched(&mut *tx, &cat_match.issuer_cat_id).await?;
        PgProfileStore::mark_matched(&mut *tx, &cat_match.target_cat_id).await?;

        let rejected = sqlx::query(
            r#"
            UPDATE cat_matches
            SET approval_status = $1
            WHERE (issuer_cat_id = ANY($2) OR matched_cat_id = ANY($2)) AND id != $3
            "#,
        )
        .bind(MatchStatus::Rejected)
        .bind(&cat_ids[..])
        .bind(cat_match.seq)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            "Approval of {} rejected {} competing matches",
            cat_match.id,
            rejected.rows_affected()
        );

        Ok(())
    }

    async fn reject(&self, cat_match: &CatMatch) -> Result<(), MatchError> {
        let query = r#"
            UPDATE cat_matches
            SET approval_status = $1
            WHERE id = $2 AND approval_status = $3
        "#;

        let result = sqlx::query(query)
            .bind(MatchStatus::Rejected)
            .bind(cat_match.seq)
            .bind(MatchStatus::Pending)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(MatchError::NoLongerValid);
        }

        Ok(())
    }

    async fn delete(&self, match_seq: i64, issuer_user_id: i64) -> Result<(), MatchError> {
        let query = r#"
            DELETE FROM cat_matches
            WHERE id = $1 AND issuer_user_id = $2 AND approval_status = $3
        "#;

        let result = sqlx::query(query)
            .bind(match_seq)
            .bind(issuer_user_id)
            .bind(MatchStatus::Pending)
            .execute(self.pool())
            .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Nothing deleted: either the row is gone, or it was decided in between
        let still_there = sqlx::query("SELECT 1 FROM cat_matches WHERE id = $1 AND issuer_user_id = $2")
            .bind(match_seq)
            .bind(issuer_user_id)
            .fetch_optional(self.pool())
            .await?;

        match still_there {
            Some(_) => Err(MatchError::NoLongerValid),
            None => Ok(()),
        }
    }

    async fn get_by_id_for_user(
        &self,
        match_id: &str,
        user_id: i64,
        party: MatchParty,
        pending_only: bool,
    ) -> Result<CatMatch, MatchError> {
        let owner_column = match party {
            MatchParty::Issuer => "issuer_user_id",
            MatchParty::Target => "matched_user_id",
        };
        let query = format!(
            "SELECT {} FROM cat_matches WHERE uid = $1 AND {} = $2",
            MATCH_COLUMNS, owner_column
        );

        let row = sqlx::query(&query)
            .bind(match_id)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(MatchError::match_not_found)?;

        let cat_match = match_from_row(&row)?;
        if pending_only && !cat_match.status.is_pending() {
            return Err(MatchError::NoLongerValid);
        }

        Ok(cat_match)
    }

    async fn list(&self, user_id: i64) -> Result<Vec<MatchListing>, MatchError> {
        let query = r#"
            SELECT cm.uid, cm.message, cm.created_at,
                ic.id AS issuer_id, ic.name AS issuer_name, ic.race AS issuer_race,
                ic.sex AS issuer_sex, ic.description AS issuer_description,
                ic.age_in_month AS issuer_age_in_month, ic.image_urls AS issuer_image_urls,
                ic.has_matched AS issuer_has_matched, ic.created_at AS issuer_created_at,
                mc.id AS target_id, mc.name AS target_name, mc.race AS target_race,
                mc.sex AS target_sex, mc.description AS target_description,
                mc.age_in_month AS target_age_in_month, mc.image_urls AS target_image_urls,
                mc.has_matched AS target_has_matched, mc.created_at AS target_created_at,
                u.id AS user_id, u.name AS user_name, u.email AS user_email,
                u.created_at AS user_created_at
            FROM cat_matches cm
            JOIN cats ic ON cm.issuer_cat_id = ic.id
            JOIN cats mc ON cm.matched_cat_id = mc.id
            JOIN users u ON cm.issuer_user_id = u.id
            WHERE cm.issuer_user_id = $1 OR cm.matched_user_id = $1
            ORDER BY cm.created_at DESC, cm.id DESC
        "#;

        let rows = sqlx::query(query).bind(user_id).fetch_all(self.pool()).await?;

        let listings: Result<Vec<MatchListing>, sqlx::Error> = rows
            .iter()
            .map(|row| {
                Ok(MatchListing {
                    id: row.try_get("uid")?,
                    issued_by: UserSnapshot {
                        id: row.try_get("user_id")?,
                        name: row.try_get("user_name")?,
                        email: row.try_get("user_email")?,
                        created_at: row.try_get("user_created_at")?,
                    },
                    issuer_cat: cat_detail_from_row(row, "issuer")?,
                    target_cat: cat_detail_from_row(row, "target")?,
                    message: row.try_get("message")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect();

        Ok(listings?)
    }

    async fn health_check(&self) -> Result<bool, MatchError> {
        Ok(self.client.health_check().await?)
    }
}
