// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional [`Store`] backed by Postgres — the variant spec.md §4.2
//! calls out as "implementable over a transactional SQL database", used
//! when `JOBQ_STORE_DSN` points at a `postgres://` URL instead of a
//! filesystem path.
//!
//! `mark_in_flight` and `recover_stuck_in_flight` take row locks
//! (`SELECT ... FOR UPDATE`) inside a transaction spanning the delete from
//! one table and the insert into the other, so a crash mid-transition
//! leaves the job in exactly one of the two tables, never both or neither.

use async_trait::async_trait;
use jobq_core::job::{Job, JobId};
use jobq_storage::{InFlightRecord, Store, StoreError};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(dsn)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pending (
                id TEXT PRIMARY KEY,
                created_at BIGINT NOT NULL,
                priority BIGINT NOT NULL,
                payload JSONB NOT NULL,
                attempts BIGINT NOT NULL,
                max_retries BIGINT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(Box::new(e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS inflight (
                id TEXT PRIMARY KEY,
                created_at BIGINT NOT NULL,
                priority BIGINT NOT NULL,
                payload JSONB NOT NULL,
                attempts BIGINT NOT NULL,
                max_retries BIGINT NOT NULL,
                picked_at BIGINT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(Box::new(e)))?;

        Ok(())
    }
}

fn job_from_row(row: &sqlx::postgres::PgRow) -> Result<Job, StoreError> {
    let id: String = row.try_get("id").map_err(|e| StoreError::Backend(Box::new(e)))?;
    let created_at: i64 = row.try_get("created_at").map_err(|e| StoreError::Backend(Box::new(e)))?;
    let priority: i64 = row.try_get("priority").map_err(|e| StoreError::Backend(Box::new(e)))?;
    let payload: Value = row.try_get("payload").map_err(|e| StoreError::Backend(Box::new(e)))?;
    let attempts: i64 = row.try_get("attempts").map_err(|e| StoreError::Backend(Box::new(e)))?;
    let max_retries: i64 = row.try_get("max_retries").map_err(|e| StoreError::Backend(Box::new(e)))?;

    let mut job = Job::new(JobId::from_string(id), created_at as u64, priority as u32, payload, max_retries as u32);
    job.attempts = attempts as u32;
    Ok(job)
}

#[async_trait]
impl Store for PostgresStore {
    async fn save_pending(&self, job: &Job) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO pending (id, created_at, priority, payload, attempts, max_retries)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                priority = EXCLUDED.priority,
                payload = EXCLUDED.payload,
                attempts = EXCLUDED.attempts,
                max_retries = EXCLUDED.max_retries
            "#,
        )
        .bind(job.id.as_ref())
        .bind(job.created_at as i64)
        .bind(job.priority as i64)
        .bind(&job.payload)
        .bind(job.attempts as i64)
        .bind(job.max_retries as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(Box::new(e)))?;
        Ok(())
    }

    async fn load_pending(&self) -> Result<Vec<Job>, StoreError> {
        let rows = sqlx::query("SELECT * FROM pending")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;
        rows.iter().map(job_from_row).collect()
    }

    async fn load_in_flight(&self) -> Result<Vec<(String, InFlightRecord)>, StoreError> {
        let rows = sqlx::query("SELECT * FROM inflight")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;
        rows.iter()
            .map(|row| {
                let job = job_from_row(row)?;
                let picked_at: i64 = row.try_get("picked_at").map_err(|e| StoreError::Backend(Box::new(e)))?;
                Ok((job.id.to_string(), InFlightRecord { job, picked_at: picked_at as u64 }))
            })
            .collect()
    }

    async fn mark_in_flight(&self, id: &str, picked_at_epoch_ms: u64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(|e| StoreError::Backend(Box::new(e)))?;

        let row = sqlx::query("SELECT * FROM pending WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;
        let Some(row) = row else {
            return Ok(());
        };
        let job = job_from_row(&row)?;

        sqlx::query("DELETE FROM pending WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;

        sqlx::query(
            r#"
            INSERT INTO inflight (id, created_at, priority, payload, attempts, max_retries, picked_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(job.id.as_ref())
        .bind(job.created_at as i64)
        .bind(job.priority as i64)
        .bind(&job.payload)
        .bind(job.attempts as i64)
        .bind(job.max_retries as i64)
        .bind(picked_at_epoch_ms as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Backend(Box::new(e)))?;

        tx.commit().await.map_err(|e| StoreError::Backend(Box::new(e)))?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(|e| StoreError::Backend(Box::new(e)))?;
        sqlx::query("DELETE FROM pending WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;
        sqlx::query("DELETE FROM inflight WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;
        tx.commit().await.map_err(|e| StoreError::Backend(Box::new(e)))?;
        Ok(())
    }

    async fn recover_stuck_in_flight(&self, cutoff_epoch_ms: u64) -> Result<Vec<Job>, StoreError> {
        let mut tx = self.pool.begin().await.map_err(|e| StoreError::Backend(Box::new(e)))?;

        let rows = sqlx::query("SELECT * FROM inflight WHERE picked_at < $1 FOR UPDATE")
            .bind(cutoff_epoch_ms as i64)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;

        let mut recovered = Vec::with_capacity(rows.len());
        for row in &rows {
            let job = job_from_row(row)?;

            sqlx::query("DELETE FROM inflight WHERE id = $1")
                .bind(job.id.as_ref())
                .execute(&mut *tx)
                .await
                .map_err(|e| StoreError::Backend(Box::new(e)))?;

            sqlx::query(
                r#"
                INSERT INTO pending (id, created_at, priority, payload, attempts, max_retries)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(job.id.as_ref())
            .bind(job.created_at as i64)
            .bind(job.priority as i64)
            .bind(&job.payload)
            .bind(job.attempts as i64)
            .bind(job.max_retries as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(Box::new(e)))?;

            recovered.push(job);
        }

        tx.commit().await.map_err(|e| StoreError::Backend(Box::new(e)))?;
        Ok(recovered)
    }
}
