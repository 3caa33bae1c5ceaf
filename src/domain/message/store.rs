//! Storage abstraction for problem → message records.
//!
//! Every write is a single statement, so concurrent relay processes sharing
//! one SQLite file never observe a half-written row. Races between an open and
//! a resolve for the same problem key are not coordinated.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveEnum, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, error};

use super::dto::{ActiveMessage, NewRecord};
use super::entity::problem_message::{self, RecordStatus};
use crate::utils::AppError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, AppError>;

/// Storage backend interface for the correlator.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert the record, or replace the one with the same `event_id`.
    async fn upsert(&self, record: NewRecord) -> StoreResult<()>;

    /// Set `status` and refresh the timestamp of the record keyed by `event_id`.
    /// Returns `false` when no such record exists.
    async fn update_status(&self, event_id: &str, status: RecordStatus) -> StoreResult<bool>;

    /// Most recent active record for `problem_key` (latest timestamp, then
    /// highest id).
    async fn query_latest_active(&self, problem_key: &str) -> StoreResult<Option<ActiveMessage>>;

    async fn find_by_event_id(&self, event_id: &str)
        -> StoreResult<Option<problem_message::Model>>;
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SeaOrmMessageStore {
    db: DatabaseConnection,
}

impl SeaOrmMessageStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl MessageStore for SeaOrmMessageStore {
    async fn upsert(&self, record: NewRecord) -> StoreResult<()> {
        let model = problem_message::ActiveModel {
            id: NotSet,
            event_id: Set(record.event_id.clone()),
            message_id: Set(record.message_id),
            problem_key: Set(record.problem_key),
            status: Set(record.status),
            timestamp: Set(Utc::now().naive_utc()),
        };

        problem_message::Entity::insert(model)
            .on_conflict(
                OnConflict::column(problem_message::Column::EventId)
                    .update_columns([
                        problem_message::Column::MessageId,
                        problem_message::Column::ProblemKey,
                        problem_message::Column::Status,
                        problem_message::Column::Timestamp,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, event_id = %record.event_id, "Failed to upsert problem message");
                AppError::StorageError(e.to_string())
            })?;

        debug!(event_id = %record.event_id, "Problem message upserted");
        Ok(())
    }

    async fn update_status(&self, event_id: &str, status: RecordStatus) -> StoreResult<bool> {
        let result = problem_message::Entity::update_many()
            .col_expr(problem_message::Column::Status, Expr::value(status.to_value()))
            .col_expr(
                problem_message::Column::Timestamp,
                Expr::value(Utc::now().naive_utc()),
            )
            .filter(problem_message::Column::EventId.eq(event_id))
            .exec(&self.db)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn query_latest_active(&self, problem_key: &str) -> StoreResult<Option<ActiveMessage>> {
        let record = problem_message::Entity::find()
            .filter(problem_message::Column::ProblemKey.eq(problem_key))
            .filter(problem_message::Column::Status.eq(RecordStatus::Active.to_value()))
            .filter(problem_message::Column::MessageId.is_not_null())
            .order_by_desc(problem_message::Column::Timestamp)
            .order_by_desc(problem_message::Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))?;

        Ok(record.and_then(|r| {
            r.message_id.map(|message_id| ActiveMessage {
                event_id: r.event_id,
                message_id,
            })
        }))
    }

    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> StoreResult<Option<problem_message::Model>> {
        problem_message::Entity::find()
            .filter(problem_message::Column::EventId.eq(event_id))
            .one(&self.db)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))
    }
}

/// In-process store with the same semantics as the SQLite one.
#[derive(Default)]
pub struct MemoryMessageStore {
    records: Mutex<Vec<problem_message::Model>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully specified row, bypassing upsert timestamping.
    pub fn seed(&self, mut record: problem_message::Model) {
        let mut records = self.lock();
        records.retain(|r| r.event_id != record.event_id);
        record.id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        records.push(record);
    }

    /// Snapshot of all rows in insertion order.
    pub fn records(&self) -> Vec<problem_message::Model> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<problem_message::Model>> {
        // a poisoned lock only means another test thread panicked mid-write
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn upsert(&self, record: NewRecord) -> StoreResult<()> {
        let mut records = self.lock();
        let now = Utc::now().naive_utc();

        if let Some(existing) = records.iter_mut().find(|r| r.event_id == record.event_id) {
            existing.message_id = record.message_id;
            existing.problem_key = record.problem_key;
            existing.status = record.status;
            existing.timestamp = now;
            return Ok(());
        }

        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        records.push(problem_message::Model {
            id,
            event_id: record.event_id,
            message_id: record.message_id,
            problem_key: record.problem_key,
            status: record.status,
            timestamp: now,
        });
        Ok(())
    }

    async fn update_status(&self, event_id: &str, status: RecordStatus) -> StoreResult<bool> {
        let mut records = self.lock();
        match records.iter_mut().find(|r| r.event_id == event_id) {
            Some(record) => {
                record.status = status;
                record.timestamp = Utc::now().naive_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn query_latest_active(&self, problem_key: &str) -> StoreResult<Option<ActiveMessage>> {
        let records = self.lock();
        let latest = records
            .iter()
            .filter(|r| r.problem_key == problem_key && r.status == RecordStatus::Active)
            .filter(|r| r.message_id.is_some())
            .max_by_key(|r| (r.timestamp, r.id));

        Ok(latest.and_then(|r| {
            r.message_id.map(|message_id| ActiveMessage {
                event_id: r.event_id.clone(),
                message_id,
            })
        }))
    }

    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> StoreResult<Option<problem_message::Model>> {
        Ok(self
            .lock()
            .iter()
            .find(|r| r.event_id == event_id)
            .cloned())
    }
}

/// Stand-in used when the database cannot be opened; every call fails.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn unavailable<T>(&self) -> StoreResult<T> {
        Err(AppError::storage_error(format!(
            "store unavailable: {}",
            self.reason
        )))
    }
}

#[async_trait]
impl MessageStore for UnavailableStore {
    async fn upsert(&self, _record: NewRecord) -> StoreResult<()> {
        self.unavailable()
    }

    async fn update_status(&self, _event_id: &str, _status: RecordStatus) -> StoreResult<bool> {
        self.unavailable()
    }

    async fn query_latest_active(&self, _problem_key: &str) -> StoreResult<Option<ActiveMessage>> {
        self.unavailable()
    }

    async fn find_by_event_id(
        &self,
        _event_id: &str,
    ) -> StoreResult<Option<problem_message::Model>> {
        self.unavailable()
    }
}
