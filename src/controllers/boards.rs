use std::collections::HashMap;

use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;

use proto::kanban::{
    boards_service_server::BoardsService, Board as ProtoBoard, BoardId, BoardList, BoardView,
    BoardViewParams, ColumnView, CreateBoardParams, IssueView, ListBoardsParams, UpdateBoardParams,
};

use crate::controllers::{
    acquire, board_to_proto, column_to_proto, issue_to_proto, storage_error, tag_to_proto,
};
use crate::db::connection::SqlitePool;
use crate::db::models::{Board, BoardChangeSet, Column, Issue, IssueTag, NewBoard, Tag};
use crate::db::repos::board::{CreateBoard, DeleteBoard, GetBoard, ListBoards, UpdateBoard};
use crate::db::repos::column::ListColumns;
use crate::db::repos::issue::{IssueFilter, SearchIssues};
use crate::db::repos::issue_tag::ListIssueTags;
use crate::db::repos::tag::ListTags;

pub struct BoardsController {
    pub pool: SqlitePool,
}

#[tonic::async_trait]
impl BoardsService for BoardsController {
    async fn list_boards(
        &self,
        _request: Request<ListBoardsParams>,
    ) -> Result<Response<BoardList>, Status> {
        let mut conn = acquire(&self.pool)?;

        let rows = Board::list(&mut conn)
            .await
            .map_err(|err| storage_error(err, "Board"))?;

        Ok(Response::new(BoardList {
            boards: rows.iter().map(board_to_proto).collect(),
        }))
    }

    async fn get_board_view(
        &self,
        request: Request<BoardViewParams>,
    ) -> Result<Response<BoardView>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let board = Board::get(&data.board_id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Board"))?;

        let board_columns = Column::list_for_board(&board.id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Column"))?;

        let filter = IssueFilter {
            column_ids: Some(board_columns.iter().map(|c| c.id.clone()).collect()),
            search: data.search.clone(),
            tag_ids: data.tag_ids.clone(),
        };
        let board_issues = Issue::search(&filter, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Issue"))?;

        let issue_ids: Vec<String> = board_issues.iter().map(|i| i.id.clone()).collect();
        let links = IssueTag::list_for_issues(&issue_ids, &mut conn)
            .await
            .map_err(|err| storage_error(err, "IssueTag"))?;
        let all_tags = Tag::list(&mut conn)
            .await
            .map_err(|err| storage_error(err, "Tag"))?;

        let tags_by_id: HashMap<&str, &Tag> =
            all_tags.iter().map(|tag| (tag.id.as_str(), tag)).collect();

        let mut tags_by_issue: HashMap<&str, Vec<proto::kanban::Tag>> = HashMap::new();
        for link in &links {
            if let Some(tag) = tags_by_id.get(link.tag_id.as_str()) {
                tags_by_issue
                    .entry(link.issue_id.as_str())
                    .or_default()
                    .push(tag_to_proto(tag));
            }
        }

        let mut issues_by_column: HashMap<&str, Vec<IssueView>> = HashMap::new();
        for issue in &board_issues {
            let view = IssueView {
                issue: Some(issue_to_proto(issue)),
                tags: tags_by_issue.remove(issue.id.as_str()).unwrap_or_default(),
            };
            issues_by_column
                .entry(issue.column_id.as_str())
                .or_default()
                .push(view);
        }

        let columns = board_columns
            .iter()
            .map(|column| ColumnView {
                column: Some(column_to_proto(column)),
                issues: issues_by_column
                    .remove(column.id.as_str())
                    .unwrap_or_default(),
            })
            .collect();

        Ok(Response::new(BoardView {
            board: Some(board_to_proto(&board)),
            columns,
            tags: all_tags.iter().map(tag_to_proto).collect(),
        }))
    }

    async fn create_board(
        &self,
        request: Request<CreateBoardParams>,
    ) -> Result<Response<ProtoBoard>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let id = Uuid::new_v4().to_string();
        let new_board = NewBoard {
            id: &id,
            title: &data.title,
            description: data.description.as_deref(),
        };

        let board = Board::create(new_board, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Board"))?;
        info!(board_id = %board.id, title = %board.title, "created board");

        Ok(Response::new(board_to_proto(&board)))
    }

    async fn update_board(
        &self,
        request: Request<UpdateBoardParams>,
    ) -> Result<Response<ProtoBoard>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        if data.title.is_none() && data.description.is_none() {
            let board = Board::get(&data.board_id, &mut conn)
                .await
                .map_err(|err| storage_error(err, "Board"))?;
            return Ok(Response::new(board_to_proto(&board)));
        }

        let change_set = BoardChangeSet {
            title: data.title.clone(),
            description: data.description.clone(),
        };
        let board = Board::update(&data.board_id, change_set, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Board"))?;
        info!(board_id = %board.id, "updated board");

        Ok(Response::new(board_to_proto(&board)))
    }

    async fn delete_board(
        &self,
        request: Request<BoardId>,
    ) -> Result<Response<ProtoBoard>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let board = Board::delete(&data.board_id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Board"))?;
        info!(board_id = %board.id, "deleted board");

        Ok(Response::new(board_to_proto(&board)))
    }
}
