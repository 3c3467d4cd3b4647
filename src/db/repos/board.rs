use diesel::prelude::*;
use diesel::result::Error;
use diesel::{delete, insert_into, update};

use crate::db::models::{Board, BoardChangeSet, NewBoard};
use crate::db::schema::boards;

#[tonic::async_trait]
pub trait CreateBoard {
    async fn create<'a>(new_board: NewBoard<'a>, conn: &mut SqliteConnection) -> Result<Board, Error>;
}

#[tonic::async_trait]
impl CreateBoard for Board {
    async fn create<'a>(new_board: NewBoard<'a>, conn: &mut SqliteConnection) -> Result<Board, Error> {
        insert_into(boards::table).values(new_board).get_result(conn)
    }
}

#[tonic::async_trait]
pub trait GetBoard {
    async fn get(board_id: &str, conn: &mut SqliteConnection) -> Result<Board, Error>;
}

#[tonic::async_trait]
impl GetBoard for Board {
    async fn get(board_id: &str, conn: &mut SqliteConnection) -> Result<Board, Error> {
        boards::table.find(board_id).first(conn)
    }
}

#[tonic::async_trait]
pub trait ListBoards {
    async fn list(conn: &mut SqliteConnection) -> Result<Vec<Board>, Error>;
}

#[tonic::async_trait]
impl ListBoards for Board {
    async fn list(conn: &mut SqliteConnection) -> Result<Vec<Board>, Error> {
        boards::table.order(boards::created_at.asc()).load(conn)
    }
}

#[tonic::async_trait]
pub trait UpdateBoard {
    async fn update(
        board_id: &str,
        change_set: BoardChangeSet,
        conn: &mut SqliteConnection,
    ) -> Result<Board, Error>;
}

#[tonic::async_trait]
impl UpdateBoard for Board {
    async fn update(
        board_id: &str,
        change_set: BoardChangeSet,
        conn: &mut SqliteConnection,
    ) -> Result<Board, Error> {
        update(boards::table.find(board_id))
            .set(change_set)
            .get_result(conn)
    }
}

#[tonic::async_trait]
pub trait DeleteBoard {
    async fn delete(board_id: &str, conn: &mut SqliteConnection) -> Result<Board, Error>;
}

#[tonic::async_trait]
impl DeleteBoard for Board {
    async fn delete(board_id: &str, conn: &mut SqliteConnection) -> Result<Board, Error> {
        delete(boards::table.find(board_id)).get_result(conn)
    }
}
