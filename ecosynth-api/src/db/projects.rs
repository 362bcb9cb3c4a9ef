//! Environmental project persistence
//!
//! Projects are the positive signal in region scoring: each active project
//! counts toward its region's eco-score.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::submissions::StoreError;
use crate::models::{Project, ProjectDraft};
use ecosynth_common::geo::Coordinate;

#[derive(Clone)]
pub struct ProjectStore {
    pool: SqlitePool,
}

impl ProjectStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, draft: ProjectDraft) -> Result<Project, StoreError> {
        let mut missing = Vec::new();
        if draft.title.as_deref().map_or(true, str::is_empty) {
            missing.push("title".to_string());
        }
        if draft.description.as_deref().map_or(true, str::is_empty) {
            missing.push("description".to_string());
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

        let project = Project {
            id: Uuid::new_v4(),
            title: draft.title.unwrap(),
            description: draft.description.unwrap(),
            lat: coordinate.lat,
            lng: coordinate.lng,
            status: "active".to_string(),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO projects (id, title, description, lat, lng, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(project.id.to_string())
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.lat)
        .bind(project.lng)
        .bind(&project.status)
        .bind(project.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(project)
    }

    /// All active projects, newest first
    pub async fn list_active(&self) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, lat, lng, status, created_at
            FROM projects
            WHERE status = 'active'
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id_str: String = row.get("id");
                let id = Uuid::parse_str(&id_str)
                    .map_err(|e| StoreError::Corrupt(format!("bad project id: {}", e)))?;
                let created_at: String = row.get("created_at");
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| StoreError::Corrupt(format!("bad timestamp: {}", e)))?;
                Ok(Project {
                    id,
                    title: row.get("title"),
                    description: row.get("description"),
                    lat: row.get("lat"),
                    lng: row.get("lng"),
                    status: row.get("status"),
                    created_at,
                })
            })
            .collect()
    }
}
