//! Submission persistence
//!
//! Creates submission records in their initial state and applies votes. A
//! vote is a single read-modify-write transaction: the tally, the voter set,
//! and the status transition are committed together, and the final UPDATE is
//! guarded on the record still being pending so two concurrent voters cannot
//! both trigger the terminal transition.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Submission, SubmissionDraft, SubmissionStatus, ThreatType, Verdict};
use crate::services::consensus::ConsensusEngine;
use ecosynth_common::geo::Coordinate;

/// Submission store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("submission {0} not found")]
    NotFound(Uuid),

    #[error("voter {voter_id} already voted on submission {submission_id}")]
    DuplicateVote {
        submission_id: Uuid,
        voter_id: String,
    },

    #[error("submission {submission_id} is already {}", status.as_str())]
    AlreadyFinalized {
        submission_id: Uuid,
        status: SubmissionStatus,
    },

    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("{0}")]
    InvalidCoordinate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt submission record: {0}")]
    Corrupt(String),
}

/// Persistence-facing submission component
#[derive(Clone)]
pub struct SubmissionStore {
    pool: SqlitePool,
}

impl SubmissionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a submission in `pending_validation` with an empty voter set.
    ///
    /// Fails with `MissingFields` listing every absent required field so the
    /// client can surface all of them at once.
    pub async fn create(&self, draft: SubmissionDraft) -> Result<Submission, StoreError> {
        let mut missing = Vec::new();
        if draft.title.as_deref().map_or(true, str::is_empty) {
            missing.push("title".to_string());
        }
        if draft.description.as_deref().map_or(true, str::is_empty) {
            missing.push("description".to_string());
        }
        if draft.image_url.as_deref().map_or(true, str::is_empty) {
            missing.push("imageUrl".to_string());
        }
        if draft.lat.is_none() {
            missing.push("lat".to_string());
        }
        if draft.lng.is_none() {
            missing.push("lng".to_string());
        }
        if !missing.is_empty() {
            return Err(StoreError::MissingFields(missing));
        }

        let coordinate = Coordinate::new(draft.lat.unwrap(), draft.lng.unwrap())
            .map_err(|e| StoreError::InvalidCoordinate(e.to_string()))?;

        let submission = Submission {
            id: Uuid::new_v4(),
            title: draft.title.unwrap(),
            description: draft.description.unwrap(),
            image_url: draft.image_url.unwrap(),
            submitted_by_uid: draft.submitted_by_uid,
            submitted_by: draft
                .submitted_by
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "Anonymous".to_string()),
            lat: coordinate.lat,
            lng: coordinate.lng,
            capture_time: draft.capture_time,
            created_at: Utc::now(),
            threat_type: draft.threat_type,
            status: SubmissionStatus::PendingValidation,
            verified_by: Vec::new(),
            upvotes: 0,
            downvotes: 0,
        };

        sqlx::query(
            r#"
            INSERT INTO submissions (
                id, title, description, image_url, submitted_by_uid, submitted_by,
                lat, lng, capture_time, created_at, threat_type, status,
                verified_by, upvotes, downvotes
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(submission.id.to_string())
        .bind(&submission.title)
        .bind(&submission.description)
        .bind(&submission.image_url)
        .bind(&submission.submitted_by_uid)
        .bind(&submission.submitted_by)
        .bind(submission.lat)
        .bind(submission.lng)
        .bind(submission.capture_time.map(|t| t.to_rfc3339()))
        .bind(submission.created_at.to_rfc3339())
        .bind(submission.threat_type.map(|t| t.as_str()))
        .bind(submission.status.as_str())
        .bind("[]")
        .bind(0_i64)
        .bind(0_i64)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "New submission {} created by {}",
            submission.id,
            submission.submitted_by
        );

        Ok(submission)
    }

    /// Fetch a single submission
    pub async fn get(&self, id: Uuid) -> Result<Option<Submission>, StoreError> {
        let row = sqlx::query(&select_sql("WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| row_to_submission(&row)).transpose()
    }

    /// All submissions, newest first
    pub async fn list_all(&self) -> Result<Vec<Submission>, StoreError> {
        let rows = sqlx::query(&select_sql("ORDER BY created_at DESC"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_submission).collect()
    }

    /// Validated submissions only
    pub async fn list_validated(&self) -> Result<Vec<Submission>, StoreError> {
        let rows = sqlx::query(&select_sql(
            "WHERE status = 'validated' ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_submission).collect()
    }

    /// Pending submissions awaiting peer review, newest first
    pub async fn list_pending(&self) -> Result<Vec<Submission>, StoreError> {
        let rows = sqlx::query(&select_sql(
            "WHERE status = 'pending_validation' ORDER BY created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_submission).collect()
    }

    /// Most recent validated report of a given threat type, if any
    pub async fn latest_validated_of_type(
        &self,
        threat_type: ThreatType,
    ) -> Result<Option<Submission>, StoreError> {
        let row = sqlx::query(&select_sql(
            "WHERE status = 'validated' AND threat_type = ? ORDER BY created_at DESC LIMIT 1",
        ))
        .bind(threat_type.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| row_to_submission(&row)).transpose()
    }

    /// Apply a peer vote and let the consensus engine decide the transition.
    ///
    /// The whole read-decide-write runs in one transaction, and the UPDATE
    /// carries a `status = 'pending_validation'` guard; if a concurrent vote
    /// finalized the record in between, zero rows are affected and the vote
    /// fails with `AlreadyFinalized` instead of silently losing the update.
    pub async fn apply_vote(
        &self,
        engine: &ConsensusEngine,
        id: Uuid,
        voter_id: &str,
        verdict: Verdict,
    ) -> Result<Submission, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(&select_sql("WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Err(StoreError::NotFound(id));
        };
        let mut submission = row_to_submission(&row)?;

        if submission.status.is_terminal() {
            return Err(StoreError::AlreadyFinalized {
                submission_id: id,
                status: submission.status,
            });
        }
        if submission.verified_by.iter().any(|v| v == voter_id) {
            return Err(StoreError::DuplicateVote {
                submission_id: id,
                voter_id: voter_id.to_string(),
            });
        }

        let (upvotes, downvotes) =
            engine.tally(submission.upvotes, submission.downvotes, verdict);
        let status = engine
            .evaluate(upvotes, downvotes)
            .unwrap_or(SubmissionStatus::PendingValidation);

        submission.verified_by.push(voter_id.to_string());
        submission.upvotes = upvotes;
        submission.downvotes = downvotes;
        submission.status = status;

        let verified_by_json = serde_json::to_string(&submission.verified_by)
            .map_err(|e| StoreError::Corrupt(format!("cannot encode voter set: {}", e)))?;

        let result = sqlx::query(
            r#"
            UPDATE submissions
            SET verified_by = ?, upvotes = ?, downvotes = ?, status = ?
            WHERE id = ? AND status = 'pending_validation'
            "#,
        )
        .bind(&verified_by_json)
        .bind(upvotes as i64)
        .bind(downvotes as i64)
        .bind(status.as_str())
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Lost the race to a concurrent finalizing vote; report the
            // state that actually won, not this vote's local computation
            let status = current_status(&mut *tx, id).await?;
            return Err(StoreError::AlreadyFinalized {
                submission_id: id,
                status,
            });
        }

        tx.commit().await?;

        if status.is_terminal() {
            tracing::info!("Submission {} finalized as {}", id, status.as_str());
        }

        Ok(submission)
    }
}

/// Stored status of a submission, read fresh from the database
async fn current_status<'e, E>(executor: E, id: Uuid) -> Result<SubmissionStatus, StoreError>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    let status_str: Option<String> =
        sqlx::query_scalar("SELECT status FROM submissions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(executor)
            .await?;
    let status_str = status_str.ok_or(StoreError::NotFound(id))?;
    SubmissionStatus::parse(&status_str)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown status {}", status_str)))
}

const SUBMISSION_COLUMNS: &str = "id, title, description, image_url, submitted_by_uid, \
     submitted_by, lat, lng, capture_time, created_at, threat_type, status, \
     verified_by, upvotes, downvotes";

fn select_sql(suffix: &str) -> String {
    format!("SELECT {} FROM submissions {}", SUBMISSION_COLUMNS, suffix)
}

fn row_to_submission(row: &sqlx::sqlite::SqliteRow) -> Result<Submission, StoreError> {
    let id_str: String = row.get("id");
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| StoreError::Corrupt(format!("bad submission id {}: {}", id_str, e)))?;

    let status_str: String = row.get("status");
    let status = SubmissionStatus::parse(&status_str)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown status {}", status_str)))?;

    let threat_type = row
        .get::<Option<String>, _>("threat_type")
        .map(|s| {
            ThreatType::parse(&s)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown threat type {}", s)))
        })
        .transpose()?;

    let verified_by_json: String = row.get("verified_by");
    let verified_by: Vec<String> = serde_json::from_str(&verified_by_json)
        .map_err(|e| StoreError::Corrupt(format!("bad voter set: {}", e)))?;

    let created_at = parse_timestamp(&row.get::<String, _>("created_at"))?;
    let capture_time = row
        .get::<Option<String>, _>("capture_time")
        .map(|s| parse_timestamp(&s))
        .transpose()?;

    Ok(Submission {
        id,
        title: row.get("title"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        submitted_by_uid: row.get("submitted_by_uid"),
        submitted_by: row.get("submitted_by"),
        lat: row.get("lat"),
        lng: row.get("lng"),
        capture_time,
        created_at,
        threat_type,
        status,
        verified_by,
        upvotes: row.get::<i64, _>("upvotes") as u32,
        downvotes: row.get::<i64, _>("downvotes") as u32,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {}: {}", s, e)))
}
