use diesel::prelude::*;
use diesel::result::Error;
use diesel::{delete, insert_into, update};

use crate::db::models::{Column, NewColumn};
use crate::db::schema::columns;

#[tonic::async_trait]
pub trait CreateColumn {
    async fn create<'a>(
        new_column: NewColumn<'a>,
        conn: &mut SqliteConnection,
    ) -> Result<Column, Error>;
}

#[tonic::async_trait]
impl CreateColumn for Column {
    async fn create<'a>(
        new_column: NewColumn<'a>,
        conn: &mut SqliteConnection,
    ) -> Result<Column, Error> {
        insert_into(columns::table)
            .values(new_column)
            .get_result(conn)
    }
}

#[tonic::async_trait]
pub trait GetColumn {
    async fn get(column_id: &str, conn: &mut SqliteConnection) -> Result<Column, Error>;
}

#[tonic::async_trait]
impl GetColumn for Column {
    async fn get(column_id: &str, conn: &mut SqliteConnection) -> Result<Column, Error> {
        columns::table.find(column_id).first(conn)
    }
}

#[tonic::async_trait]
pub trait ListColumns {
    async fn list_for_board(
        board_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<Column>, Error>;
}

#[tonic::async_trait]
impl ListColumns for Column {
    async fn list_for_board(
        board_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<Column>, Error> {
        columns::table
            .filter(columns::board_id.eq(board_id))
            .order(columns::rank.asc())
            .load(conn)
    }
}

#[tonic::async_trait]
pub trait RenameColumn {
    async fn rename(
        column_id: &str,
        title: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Column, Error>;
}

#[tonic::async_trait]
impl RenameColumn for Column {
    async fn rename(
        column_id: &str,
        title: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Column, Error> {
        update(columns::table.find(column_id))
            .set(columns::title.eq(title))
            .get_result(conn)
    }
}

/// Neighbor-rank reads backing the move-left / move-right menu actions.
/// Both return at most the two ranks adjacent to `rank` within the board,
/// nearest first, so the new key is generated strictly between them.
#[tonic::async_trait]
pub trait ColumnRanks {
    async fn last_rank(board_id: &str, conn: &mut SqliteConnection)
        -> Result<Option<String>, Error>;
    async fn ranks_below(
        board_id: &str,
        rank: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<String>, Error>;
    async fn ranks_above(
        board_id: &str,
        rank: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<String>, Error>;
}

#[tonic::async_trait]
impl ColumnRanks for Column {
    async fn last_rank(
        board_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Option<String>, Error> {
        columns::table
            .filter(columns::board_id.eq(board_id))
            .select(columns::rank)
            .order(columns::rank.desc())
            .first(conn)
            .optional()
    }

    async fn ranks_below(
        board_id: &str,
        rank: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<String>, Error> {
        columns::table
            .filter(columns::board_id.eq(board_id))
            .filter(columns::rank.lt(rank))
            .select(columns::rank)
            .order(columns::rank.desc())
            .limit(2)
            .load(conn)
    }

    async fn ranks_above(
        board_id: &str,
        rank: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<String>, Error> {
        columns::table
            .filter(columns::board_id.eq(board_id))
            .filter(columns::rank.gt(rank))
            .select(columns::rank)
            .order(columns::rank.asc())
            .limit(2)
            .load(conn)
    }
}

#[tonic::async_trait]
pub trait RepositionColumn {
    async fn reposition(
        column_id: &str,
        rank: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Column, Error>;
}

#[tonic::async_trait]
impl RepositionColumn for Column {
    async fn reposition(
        column_id: &str,
        rank: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Column, Error> {
        update(columns::table.find(column_id))
            .set(columns::rank.eq(rank))
            .get_result(conn)
    }
}

#[tonic::async_trait]
pub trait DeleteColumn {
    async fn delete(column_id: &str, conn: &mut SqliteConnection) -> Result<Column, Error>;
}

#[tonic::async_trait]
impl DeleteColumn for Column {
    async fn delete(column_id: &str, conn: &mut SqliteConnection) -> Result<Column, Error> {
        delete(columns::table.find(column_id)).get_result(conn)
    }
}
