use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use scylla::client::session::Session;
use scylla::response::query_result::QueryRowsResult;
use scylla::value::{CqlValue, Row};
use uuid::Uuid;

use crate::domain::course::{Course, VersionedCourse};
use super::{CourseStore, StoreError};

// ============================================================================
// ScyllaDB Course Store
// ============================================================================
//
// One row per course: the aggregate is kept as a JSON document next to its
// version. Writes are lightweight transactions:
// - insert:  INSERT ... IF NOT EXISTS
// - replace: UPDATE ... IF version = <expected>
//
// module_locations maps module ids to their course. It is written after a
// successful replace, so it may lag: a missing entry falls back to a scan of
// the courses table, a stale entry is verified against the loaded document.
//
// ============================================================================

pub struct ScyllaCourseStore {
    session: Arc<Session>,
}

fn backend(error: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(error.to_string())
}

impl ScyllaCourseStore {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Create the tables used by this store in the session's keyspace.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        self.session
            .query_unpaged(
                "CREATE TABLE IF NOT EXISTS courses (
                    id uuid PRIMARY KEY,
                    version bigint,
                    document text,
                    updated_at timestamp
                )",
                &[],
            )
            .await
            .map_err(backend)?;

        self.session
            .query_unpaged(
                "CREATE TABLE IF NOT EXISTS module_locations (
                    module_id uuid PRIMARY KEY,
                    course_id uuid
                )",
                &[],
            )
            .await
            .map_err(backend)?;

        tracing::info!("Course store schema ready");
        Ok(())
    }

    async fn index_modules(&self, course: &Course) -> Result<(), StoreError> {
        if course.modules.is_empty() {
            return Ok(());
        }

        let mut batch = scylla::statement::batch::Batch::default();
        let mut values: Vec<(Uuid, Uuid)> = Vec::with_capacity(course.modules.len());
        for module in &course.modules {
            batch.append_statement("INSERT INTO module_locations (module_id, course_id) VALUES (?, ?)");
            values.push((module.id, course.id));
        }

        self.session.batch(&batch, values).await.map_err(backend)?;
        Ok(())
    }

    async fn forget_module(&self, module_id: Uuid) -> Result<(), StoreError> {
        self.session
            .query_unpaged("DELETE FROM module_locations WHERE module_id = ?", (module_id,))
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn scan_for_module(&self, module_id: Uuid) -> Result<Option<VersionedCourse>, StoreError> {
        tracing::warn!(module_id = %module_id, "Module index miss, scanning courses");

        // Paged, one course document per row
        let mut rows = self
            .session
            .query_iter("SELECT version, document FROM courses", &[])
            .await
            .map_err(backend)?
            .rows_stream::<(i64, String)>()
            .map_err(backend)?;

        while let Some((version, document)) = rows.try_next().await.map_err(backend)? {
            let course: Course = serde_json::from_str(&document)?;
            if course.module(module_id).is_some() {
                self.index_modules(&course).await?;
                return Ok(Some(VersionedCourse { course, version }));
            }
        }

        Ok(None)
    }
}

/// Read `[applied]` and, for a rejected condition, the current version.
fn lwt_outcome(rows: &QueryRowsResult) -> Result<(bool, Option<i64>), StoreError> {
    let row = rows
        .maybe_first_row::<Row>()
        .map_err(backend)?
        .ok_or_else(|| StoreError::Backend("lightweight transaction returned no row".to_string()))?;

    let applied = matches!(row.columns.first(), Some(Some(CqlValue::Boolean(true))));
    let current = row.columns.iter().skip(1).find_map(|column| match column {
        Some(CqlValue::BigInt(version)) => Some(*version),
        _ => None,
    });

    Ok((applied, current))
}

#[async_trait]
impl CourseStore for ScyllaCourseStore {
    async fn insert_course(&self, course: &Course) -> Result<i64, StoreError> {
        let document = serde_json::to_string(course)?;

        let result = self
            .session
            .query_unpaged(
                "INSERT INTO courses (id, version, document, updated_at) VALUES (?, ?, ?, ?) IF NOT EXISTS",
                (course.id, 1i64, document, Utc::now()),
            )
            .await
            .map_err(backend)?;

        let rows = result.into_rows_result().map_err(backend)?;
        let (applied, _) = lwt_outcome(&rows)?;
        if !applied {
            return Err(StoreError::AlreadyExists(course.id));
        }

        self.index_modules(course).await?;

        tracing::info!(course_id = %course.id, "Inserted course document");
        Ok(1)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.session
            .query_unpaged("SELECT release_version FROM system.local", &[])
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn load_course(&self, course_id: Uuid) -> Result<Option<VersionedCourse>, StoreError> {
        let result = self
            .session
            .query_unpaged("SELECT version, document FROM courses WHERE id = ?", (course_id,))
            .await
            .map_err(backend)?;

        let rows_result = match result.into_rows_result() {
            Ok(rows) => rows,
            Err(_) => return Ok(None),
        };

        match rows_result.maybe_first_row::<(i64, String)>().map_err(backend)? {
            Some((version, document)) => Ok(Some(VersionedCourse {
                course: serde_json::from_str(&document)?,
                version,
            })),
            None => Ok(None),
        }
    }

    async fn replace_course(&self, course: &Course, expected_version: i64) -> Result<i64, StoreError> {
        let document = serde_json::to_string(course)?;
        let new_version = expected_version + 1;

        let result = self
            .session
            .query_unpaged(
                "UPDATE courses SET version = ?, document = ?, updated_at = ? WHERE id = ? IF version = ?",
                (new_version, document, Utc::now(), course.id, expected_version),
            )
            .await
            .map_err(backend)?;

        let rows = result.into_rows_result().map_err(backend)?;
        match lwt_outcome(&rows)? {
            (true, _) => {}
            (false, Some(actual)) => {
                return Err(StoreError::Conflict {
                    course_id: course.id,
                    expected: expected_version,
                    actual,
                })
            }
            (false, None) => return Err(StoreError::Missing(course.id)),
        }

        if let Err(error) = self.index_modules(course).await {
            // The document is already committed; lookups fall back to a scan.
            tracing::warn!(course_id = %course.id, error = %error, "Failed to refresh module index");
        }

        tracing::debug!(course_id = %course.id, new_version = new_version, "Replaced course document");
        Ok(new_version)
    }

    async fn find_course_by_module(&self, module_id: Uuid) -> Result<Option<VersionedCourse>, StoreError> {
        let result = self
            .session
            .query_unpaged(
                "SELECT course_id FROM module_locations WHERE module_id = ?",
                (module_id,),
            )
            .await
            .map_err(backend)?;

        let indexed = match result.into_rows_result() {
            Ok(rows) => rows.maybe_first_row::<(Uuid,)>().map_err(backend)?,
            Err(_) => None,
        };

        let Some((course_id,)) = indexed else {
            return self.scan_for_module(module_id).await;
        };

        match self.load_course(course_id).await? {
            Some(found) if found.course.module(module_id).is_some() => Ok(Some(found)),
            _ => {
                // Modules never move between courses: a stale entry means the
                // module was deleted.
                self.forget_module(module_id).await?;
                Ok(None)
            }
        }
    }
}
