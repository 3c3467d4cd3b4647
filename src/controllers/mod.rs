pub mod boards;
pub mod columns;
pub mod issues;
pub mod tags;

use chrono::NaiveDateTime;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tonic::Status;
use tracing::error;

use crate::db::connection::{SqlitePool, SqlitePooledConnection};
use crate::db::models;
use crate::rank::RankError;
use proto::kanban::{
    Board as ProtoBoard, Column as ProtoColumn, Issue as ProtoIssue, Tag as ProtoTag,
};

pub(crate) fn acquire(pool: &SqlitePool) -> Result<SqlitePooledConnection, Status> {
    pool.get().map_err(|err| {
        error!(error = %err, "failed to check out a store connection");
        Status::unavailable("Storage is unavailable")
    })
}

/// Every storage failure is local to the request that triggered it; callers
/// can retry the action. Constraint violations get their own status so the
/// client can surface them next to the offending field.
pub(crate) fn storage_error(err: DieselError, entity: &str) -> Status {
    match err {
        DieselError::NotFound => Status::not_found(format!("{entity} not found")),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            Status::already_exists(format!("{entity} already exists"))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            Status::failed_precondition(format!("{entity} references a missing row"))
        }
        other => {
            error!(error = %other, entity, "storage operation failed");
            Status::unavailable("Storage is unavailable")
        }
    }
}

pub(crate) fn rank_error(err: RankError) -> Status {
    error!(error = %err, "order key generation failed");
    Status::internal("Could not generate an order key")
}

pub(crate) fn timestamp(at: NaiveDateTime) -> prost_types::Timestamp {
    let utc = at.and_utc();
    prost_types::Timestamp {
        seconds: utc.timestamp(),
        nanos: utc.timestamp_subsec_nanos() as i32,
    }
}

pub(crate) fn board_to_proto(board: &models::Board) -> ProtoBoard {
    ProtoBoard {
        id: board.id.clone(),
        title: board.title.clone(),
        description: board.description.clone(),
        created_at: Some(timestamp(board.created_at)),
        updated_at: Some(timestamp(board.updated_at)),
    }
}

pub(crate) fn column_to_proto(column: &models::Column) -> ProtoColumn {
    ProtoColumn {
        id: column.id.clone(),
        board_id: column.board_id.clone(),
        title: column.title.clone(),
        rank: column.rank.clone(),
        created_at: Some(timestamp(column.created_at)),
        updated_at: Some(timestamp(column.updated_at)),
    }
}

pub(crate) fn issue_to_proto(issue: &models::Issue) -> ProtoIssue {
    ProtoIssue {
        id: issue.id.clone(),
        column_id: issue.column_id.clone(),
        title: issue.title.clone(),
        description: issue.description.clone(),
        rank: issue.rank.clone(),
        created_at: Some(timestamp(issue.created_at)),
        updated_at: Some(timestamp(issue.updated_at)),
    }
}

pub(crate) fn tag_to_proto(tag: &models::Tag) -> ProtoTag {
    ProtoTag {
        id: tag.id.clone(),
        name: tag.name.clone(),
        created_at: Some(timestamp(tag.created_at)),
        updated_at: Some(timestamp(tag.updated_at)),
    }
}
