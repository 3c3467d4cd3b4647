use diesel::prelude::*;
use tempfile::TempDir;
use uuid::Uuid;

use kanban::db::connection::{self, SqlitePool};
use kanban::db::models::{
    Board, Column, Issue, IssueTag, NewBoard, NewColumn, NewIssue, NewIssueTag, NewTag, Tag,
};
use kanban::db::repos::board::{CreateBoard, DeleteBoard};
use kanban::db::repos::column::{ColumnRanks, CreateColumn, ListColumns, RepositionColumn};
use kanban::db::repos::issue::{
    CreateIssue, IssueFilter, IssueRanks, RepositionIssue, SearchIssues,
};
use kanban::db::repos::issue_tag::{AttachTags, DetachTags, ListIssueTags};
use kanban::db::repos::tag::CreateTag;
use kanban::db::schema::{boards, columns, issue_tags, issues, tags};
use kanban::rank::generate_key_between;

fn open_store() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("kanban.sqlite3");
    let pool =
        connection::initialize(db_path.to_str().expect("utf-8 path")).expect("initialize store");
    (dir, pool)
}

async fn make_board(title: &str, conn: &mut SqliteConnection) -> Board {
    let id = Uuid::new_v4().to_string();
    Board::create(
        NewBoard {
            id: &id,
            title,
            description: None,
        },
        conn,
    )
    .await
    .expect("create board")
}

async fn make_column(board_id: &str, title: &str, conn: &mut SqliteConnection) -> Column {
    let last = Column::last_rank(board_id, conn).await.expect("last rank");
    let rank = generate_key_between(last.as_deref(), None).expect("rank");
    let id = Uuid::new_v4().to_string();
    Column::create(
        NewColumn {
            id: &id,
            board_id,
            title,
            rank: &rank,
        },
        conn,
    )
    .await
    .expect("create column")
}

async fn make_issue(
    column_id: &str,
    title: &str,
    description: Option<&str>,
    conn: &mut SqliteConnection,
) -> Issue {
    let last = Issue::last_rank(column_id, conn).await.expect("last rank");
    let rank = generate_key_between(last.as_deref(), None).expect("rank");
    let id = Uuid::new_v4().to_string();
    Issue::create(
        NewIssue {
            id: &id,
            column_id,
            title,
            description,
            rank: &rank,
        },
        conn,
    )
    .await
    .expect("create issue")
}

async fn make_tag(name: &str, conn: &mut SqliteConnection) -> Tag {
    let id = Uuid::new_v4().to_string();
    Tag::create(NewTag { id: &id, name }, conn)
        .await
        .expect("create tag")
}

async fn attach_tags(issue_id: &str, tag_ids: &[&str], conn: &mut SqliteConnection) {
    let links = tag_ids
        .iter()
        .map(|tag_id| NewIssueTag {
            id: Uuid::new_v4().to_string(),
            issue_id: issue_id.to_string(),
            tag_id: tag_id.to_string(),
        })
        .collect();
    IssueTag::attach(links, conn).await.expect("attach tags");
}

#[tokio::test]
async fn sequential_creation_yields_ordered_ranks() {
    let (_dir, pool) = open_store();
    let mut conn = pool.get().unwrap();

    let board = make_board("Work", &mut conn).await;
    let column = make_column(&board.id, "To Do", &mut conn).await;

    let first = make_issue(&column.id, "one", None, &mut conn).await;
    let second = make_issue(&column.id, "two", None, &mut conn).await;
    let third = make_issue(&column.id, "three", None, &mut conn).await;

    assert_eq!(first.rank, "a0");
    assert_eq!(second.rank, "a1");
    assert_eq!(third.rank, "a2");
}

#[tokio::test]
async fn moving_an_issue_to_the_front_reorders_the_column() {
    let (_dir, pool) = open_store();
    let mut conn = pool.get().unwrap();

    let board = make_board("Work", &mut conn).await;
    let column = make_column(&board.id, "To Do", &mut conn).await;
    make_issue(&column.id, "a", None, &mut conn).await;
    make_issue(&column.id, "b", None, &mut conn).await;
    let moved = make_issue(&column.id, "c", None, &mut conn).await;

    // Drop the issue at index 2 onto index 0 of the same column.
    let (lower, upper) = Issue::rank_window(&column.id, &moved.id, 0, &mut conn)
        .await
        .expect("rank window");
    assert_eq!(lower, None);
    assert_eq!(upper.as_deref(), Some("a0"));

    let rank = generate_key_between(lower.as_deref(), upper.as_deref()).expect("rank");
    assert!(rank.as_str() < "a0");

    Issue::reposition(&moved.id, &column.id, &rank, &mut conn)
        .await
        .expect("reposition");

    let ordered = Issue::search(
        &IssueFilter {
            column_ids: Some(vec![column.id.clone()]),
            ..Default::default()
        },
        &mut conn,
    )
    .await
    .expect("search");
    let titles: Vec<&str> = ordered.iter().map(|issue| issue.title.as_str()).collect();
    assert_eq!(titles, ["c", "a", "b"]);
}

#[tokio::test]
async fn moving_an_issue_across_columns_updates_both_lists() {
    let (_dir, pool) = open_store();
    let mut conn = pool.get().unwrap();

    let board = make_board("Work", &mut conn).await;
    let todo = make_column(&board.id, "To Do", &mut conn).await;
    let done = make_column(&board.id, "Done", &mut conn).await;
    let moved = make_issue(&todo.id, "ship it", None, &mut conn).await;
    make_issue(&done.id, "landed", None, &mut conn).await;

    let (lower, upper) = Issue::rank_window(&done.id, &moved.id, 1, &mut conn)
        .await
        .expect("rank window");
    let rank = generate_key_between(lower.as_deref(), upper.as_deref()).expect("rank");
    let moved = Issue::reposition(&moved.id, &done.id, &rank, &mut conn)
        .await
        .expect("reposition");
    assert_eq!(moved.column_id, done.id);

    let in_todo = Issue::search(
        &IssueFilter {
            column_ids: Some(vec![todo.id.clone()]),
            ..Default::default()
        },
        &mut conn,
    )
    .await
    .expect("search");
    assert!(in_todo.is_empty());

    let in_done = Issue::search(
        &IssueFilter {
            column_ids: Some(vec![done.id.clone()]),
            ..Default::default()
        },
        &mut conn,
    )
    .await
    .expect("search");
    let titles: Vec<&str> = in_done.iter().map(|issue| issue.title.as_str()).collect();
    assert_eq!(titles, ["landed", "ship it"]);
}

#[tokio::test]
async fn deleting_a_board_cascades_to_columns_issues_and_links() {
    let (_dir, pool) = open_store();
    let mut conn = pool.get().unwrap();

    let board = make_board("Doomed", &mut conn).await;
    let left = make_column(&board.id, "To Do", &mut conn).await;
    let right = make_column(&board.id, "Done", &mut conn).await;

    let tag = make_tag("urgent", &mut conn).await;
    for i in 0..3 {
        let issue = make_issue(&left.id, &format!("left {i}"), None, &mut conn).await;
        attach_tags(&issue.id, &[&tag.id], &mut conn).await;
    }
    for i in 0..2 {
        make_issue(&right.id, &format!("right {i}"), None, &mut conn).await;
    }

    Board::delete(&board.id, &mut conn).await.expect("delete");

    let board_count: i64 = boards::table.count().get_result(&mut conn).unwrap();
    let column_count: i64 = columns::table.count().get_result(&mut conn).unwrap();
    let issue_count: i64 = issues::table.count().get_result(&mut conn).unwrap();
    let link_count: i64 = issue_tags::table.count().get_result(&mut conn).unwrap();
    let tag_count: i64 = tags::table.count().get_result(&mut conn).unwrap();

    assert_eq!(board_count, 0);
    assert_eq!(column_count, 0);
    assert_eq!(issue_count, 0);
    assert_eq!(link_count, 0);
    // Tags survive: they belong to no board.
    assert_eq!(tag_count, 1);
}

#[tokio::test]
async fn filtering_by_two_tags_requires_both() {
    let (_dir, pool) = open_store();
    let mut conn = pool.get().unwrap();

    let board = make_board("Work", &mut conn).await;
    let column = make_column(&board.id, "To Do", &mut conn).await;

    let bug = make_tag("bug", &mut conn).await;
    let ui = make_tag("ui", &mut conn).await;

    let both = make_issue(&column.id, "both tags", None, &mut conn).await;
    attach_tags(&both.id, &[&bug.id, &ui.id], &mut conn).await;
    let one = make_issue(&column.id, "one tag", None, &mut conn).await;
    attach_tags(&one.id, &[&bug.id], &mut conn).await;
    make_issue(&column.id, "no tags", None, &mut conn).await;

    let matches = Issue::search(
        &IssueFilter {
            tag_ids: vec![bug.id.clone(), ui.id.clone()],
            ..Default::default()
        },
        &mut conn,
    )
    .await
    .expect("search");
    let titles: Vec<&str> = matches.iter().map(|issue| issue.title.as_str()).collect();
    assert_eq!(titles, ["both tags"]);

    let matches = Issue::search(
        &IssueFilter {
            tag_ids: vec![bug.id.clone()],
            ..Default::default()
        },
        &mut conn,
    )
    .await
    .expect("search");
    assert_eq!(matches.len(), 2);
}

#[tokio::test]
async fn free_text_search_is_case_insensitive_over_title_and_description() {
    let (_dir, pool) = open_store();
    let mut conn = pool.get().unwrap();

    let board = make_board("Work", &mut conn).await;
    let column = make_column(&board.id, "To Do", &mut conn).await;

    make_issue(&column.id, "Fix Login", None, &mut conn).await;
    make_issue(&column.id, "polish", Some("the login page"), &mut conn).await;
    make_issue(&column.id, "unrelated", None, &mut conn).await;

    let matches = Issue::search(
        &IssueFilter {
            search: Some("LOGIN".to_string()),
            ..Default::default()
        },
        &mut conn,
    )
    .await
    .expect("search");
    assert_eq!(matches.len(), 2);
}

#[tokio::test]
async fn duplicate_board_titles_are_rejected() {
    let (_dir, pool) = open_store();
    let mut conn = pool.get().unwrap();

    make_board("Work", &mut conn).await;

    let id = Uuid::new_v4().to_string();
    let duplicate = Board::create(
        NewBoard {
            id: &id,
            title: "Work",
            description: None,
        },
        &mut conn,
    )
    .await;

    assert!(matches!(
        duplicate,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        ))
    ));
}

#[tokio::test]
async fn moving_a_column_left_swaps_display_order() {
    let (_dir, pool) = open_store();
    let mut conn = pool.get().unwrap();

    let board = make_board("Work", &mut conn).await;
    make_column(&board.id, "To Do", &mut conn).await;
    make_column(&board.id, "Doing", &mut conn).await;
    let moved = make_column(&board.id, "Done", &mut conn).await;

    // Menu-driven move left: step over exactly one neighbor.
    let below = Column::ranks_below(&board.id, &moved.rank, &mut conn)
        .await
        .expect("ranks below");
    assert_eq!(below.len(), 2);
    let rank = generate_key_between(
        below.get(1).map(String::as_str),
        below.first().map(String::as_str),
    )
    .expect("rank");
    Column::reposition(&moved.id, &rank, &mut conn)
        .await
        .expect("reposition");

    let ordered = Column::list_for_board(&board.id, &mut conn)
        .await
        .expect("list");
    let titles: Vec<&str> = ordered.iter().map(|column| column.title.as_str()).collect();
    assert_eq!(titles, ["To Do", "Done", "Doing"]);
}

#[tokio::test]
async fn tag_links_can_be_diffed_with_attach_and_detach() {
    let (_dir, pool) = open_store();
    let mut conn = pool.get().unwrap();

    let board = make_board("Work", &mut conn).await;
    let column = make_column(&board.id, "To Do", &mut conn).await;
    let issue = make_issue(&column.id, "tagged", None, &mut conn).await;

    let bug = make_tag("bug", &mut conn).await;
    let ui = make_tag("ui", &mut conn).await;
    attach_tags(&issue.id, &[&bug.id, &ui.id], &mut conn).await;

    IssueTag::detach(&issue.id, &[bug.id.clone()], &mut conn)
        .await
        .expect("detach");

    let links = IssueTag::list_for_issue(&issue.id, &mut conn)
        .await
        .expect("list links");
    let tag_ids: Vec<&str> = links.iter().map(|link| link.tag_id.as_str()).collect();
    assert_eq!(tag_ids, [ui.id.as_str()]);
}
