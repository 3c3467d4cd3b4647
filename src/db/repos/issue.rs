use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::result::Error;
use diesel::{delete, insert_into, update};

use crate::db::models::{Issue, IssueChangeSet, NewIssue};
use crate::db::schema::{issue_tags, issues};

/// Filters applied to issue reads: free-text search matches title or
/// description case-insensitively, tag ids must all be present on an issue
/// for it to qualify.
#[derive(Debug, Default, Clone)]
pub struct IssueFilter {
    pub column_ids: Option<Vec<String>>,
    pub search: Option<String>,
    pub tag_ids: Vec<String>,
}

#[tonic::async_trait]
pub trait CreateIssue {
    async fn create<'a>(new_issue: NewIssue<'a>, conn: &mut SqliteConnection) -> Result<Issue, Error>;
}

#[tonic::async_trait]
impl CreateIssue for Issue {
    async fn create<'a>(new_issue: NewIssue<'a>, conn: &mut SqliteConnection) -> Result<Issue, Error> {
        insert_into(issues::table)
            .values(new_issue)
            .get_result(conn)
    }
}

#[tonic::async_trait]
pub trait GetIssue {
    async fn get(issue_id: &str, conn: &mut SqliteConnection) -> Result<Issue, Error>;
}

#[tonic::async_trait]
impl GetIssue for Issue {
    async fn get(issue_id: &str, conn: &mut SqliteConnection) -> Result<Issue, Error> {
        issues::table.find(issue_id).first(conn)
    }
}

#[tonic::async_trait]
pub trait UpdateIssue {
    async fn update(
        issue_id: &str,
        change_set: IssueChangeSet,
        conn: &mut SqliteConnection,
    ) -> Result<Issue, Error>;
}

#[tonic::async_trait]
impl UpdateIssue for Issue {
    async fn update(
        issue_id: &str,
        change_set: IssueChangeSet,
        conn: &mut SqliteConnection,
    ) -> Result<Issue, Error> {
        update(issues::table.find(issue_id))
            .set(change_set)
            .get_result(conn)
    }
}

#[tonic::async_trait]
pub trait SearchIssues {
    async fn search(filter: &IssueFilter, conn: &mut SqliteConnection)
        -> Result<Vec<Issue>, Error>;
}

#[tonic::async_trait]
impl SearchIssues for Issue {
    async fn search(
        filter: &IssueFilter,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<Issue>, Error> {
        let mut query = issues::table.into_boxed();

        if let Some(column_ids) = &filter.column_ids {
            query = query.filter(issues::column_id.eq_any(column_ids));
        }

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            query = query.filter(
                issues::title
                    .like(pattern.clone())
                    .nullable()
                    .or(issues::description.like(pattern)),
            );
        }

        if !filter.tag_ids.is_empty() {
            // An issue qualifies only when every requested tag is attached:
            // group the join table by issue and demand a full count.
            let tagged: Vec<String> = issue_tags::table
                .filter(issue_tags::tag_id.eq_any(&filter.tag_ids))
                .group_by(issue_tags::issue_id)
                .having(count_star().eq(filter.tag_ids.len() as i64))
                .select(issue_tags::issue_id)
                .load(conn)?;
            query = query.filter(issues::id.eq_any(tagged));
        }

        query.order(issues::rank.asc()).load(conn)
    }
}

/// Neighbor-rank reads backing drag-and-drop. `rank_window` returns the pair
/// of ranks surrounding `position` in the target column, with the moved issue
/// itself excluded so indices match the list the user dropped into.
#[tonic::async_trait]
pub trait IssueRanks {
    async fn last_rank(
        column_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Option<String>, Error>;
    async fn rank_window(
        column_id: &str,
        moved_issue_id: &str,
        position: usize,
        conn: &mut SqliteConnection,
    ) -> Result<(Option<String>, Option<String>), Error>;
}

#[tonic::async_trait]
impl IssueRanks for Issue {
    async fn last_rank(
        column_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Option<String>, Error> {
        issues::table
            .filter(issues::column_id.eq(column_id))
            .select(issues::rank)
            .order(issues::rank.desc())
            .first(conn)
            .optional()
    }

    async fn rank_window(
        column_id: &str,
        moved_issue_id: &str,
        position: usize,
        conn: &mut SqliteConnection,
    ) -> Result<(Option<String>, Option<String>), Error> {
        if position == 0 {
            let upper = issues::table
                .filter(issues::column_id.eq(column_id))
                .filter(issues::id.ne(moved_issue_id))
                .select(issues::rank)
                .order(issues::rank.asc())
                .first(conn)
                .optional()?;
            return Ok((None, upper));
        }

        let ranks: Vec<String> = issues::table
            .filter(issues::column_id.eq(column_id))
            .filter(issues::id.ne(moved_issue_id))
            .select(issues::rank)
            .order(issues::rank.asc())
            .offset(position as i64 - 1)
            .limit(2)
            .load(conn)?;

        let mut ranks = ranks.into_iter();
        Ok((ranks.next(), ranks.next()))
    }
}

#[tonic::async_trait]
pub trait RepositionIssue {
    async fn reposition(
        issue_id: &str,
        column_id: &str,
        rank: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Issue, Error>;
}

#[tonic::async_trait]
impl RepositionIssue for Issue {
    async fn reposition(
        issue_id: &str,
        column_id: &str,
        rank: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Issue, Error> {
        update(issues::table.find(issue_id))
            .set((issues::column_id.eq(column_id), issues::rank.eq(rank)))
            .get_result(conn)
    }
}

#[tonic::async_trait]
pub trait DeleteIssue {
    async fn delete(issue_id: &str, conn: &mut SqliteConnection) -> Result<Issue, Error>;
}

#[tonic::async_trait]
impl DeleteIssue for Issue {
    async fn delete(issue_id: &str, conn: &mut SqliteConnection) -> Result<Issue, Error> {
        delete(issues::table.find(issue_id)).get_result(conn)
    }
}
