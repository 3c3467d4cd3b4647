use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;

use proto::kanban::{
    columns_service_server::ColumnsService, Column as ProtoColumn, ColumnId, CreateColumnParams,
    RenameColumnParams,
};

use crate::controllers::{acquire, column_to_proto, rank_error, storage_error};
use crate::db::connection::SqlitePool;
use crate::db::models::{Column, NewColumn};
use crate::db::repos::column::{
    ColumnRanks, CreateColumn, DeleteColumn, GetColumn, RenameColumn, RepositionColumn,
};
use crate::rank::generate_key_between;

pub struct ColumnsController {
    pub pool: SqlitePool,
}

#[tonic::async_trait]
impl ColumnsService for ColumnsController {
    async fn create_column(
        &self,
        request: Request<CreateColumnParams>,
    ) -> Result<Response<ProtoColumn>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let last = Column::last_rank(&data.board_id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;
        let rank = generate_key_between(last.as_deref(), None).map_err(rank_error)?;

        let id = Uuid::new_v4().to_string();
        let new_column = NewColumn {
            id: &id,
            board_id: &data.board_id,
            title: &data.title,
            rank: &rank,
        };

        let column = Column::create(new_column, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;
        info!(column_id = %column.id, board_id = %column.board_id, "created column");

        Ok(Response::new(column_to_proto(&column)))
    }

    async fn rename_column(
        &self,
        request: Request<RenameColumnParams>,
    ) -> Result<Response<ProtoColumn>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let column = Column::rename(&data.column_id, &data.title, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;
        info!(column_id = %column.id, "renamed column");

        Ok(Response::new(column_to_proto(&column)))
    }

    async fn move_column_left(
        &self,
        request: Request<ColumnId>,
    ) -> Result<Response<ProtoColumn>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let column = Column::get(&data.column_id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;

        // Nearest lower rank first, then the one below it.
        let below = Column::ranks_below(&column.board_id, &column.rank, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;
        if below.is_empty() {
            return Err(Status::failed_precondition("Column is already leftmost"));
        }

        let rank = generate_key_between(below.get(1).map(String::as_str), below.first().map(String::as_str))
            .map_err(rank_error)?;
        let column = Column::reposition(&column.id, &rank, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;
        info!(column_id = %column.id, rank = %column.rank, "moved column left");

        Ok(Response::new(column_to_proto(&column)))
    }

    async fn move_column_right(
        &self,
        request: Request<ColumnId>,
    ) -> Result<Response<ProtoColumn>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let column = Column::get(&data.column_id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;

        // Nearest higher rank first, then the one above it.
        let above = Column::ranks_above(&column.board_id, &column.rank, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;
        if above.is_empty() {
            return Err(Status::failed_precondition("Column is already rightmost"));
        }

        let rank = generate_key_between(above.first().map(String::as_str), above.get(1).map(String::as_str))
            .map_err(rank_error)?;
        let column = Column::reposition(&column.id, &rank, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;
        info!(column_id = %column.id, rank = %column.rank, "moved column right");

        Ok(Response::new(column_to_proto(&column)))
    }

    async fn delete_column(
        &self,
        request: Request<ColumnId>,
    ) -> Result<Response<ProtoColumn>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let column = Column::delete(&data.column_id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;
        info!(column_id = %column.id, "deleted column");

        Ok(Response::new(column_to_proto(&column)))
    }
}
