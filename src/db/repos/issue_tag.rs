use diesel::prelude::*;
use diesel::result::Error;
use diesel::{delete, insert_into};

use crate::db::models::{IssueTag, NewIssueTag};
use crate::db::schema::issue_tags;

#[tonic::async_trait]
pub trait AttachTags {
    /// Batched multi-row insert of tag associations.
    async fn attach(links: Vec<NewIssueTag>, conn: &mut SqliteConnection) -> Result<usize, Error>;
}

#[tonic::async_trait]
impl AttachTags for IssueTag {
    async fn attach(links: Vec<NewIssueTag>, conn: &mut SqliteConnection) -> Result<usize, Error> {
        if links.is_empty() {
            return Ok(0);
        }
        insert_into(issue_tags::table).values(links).execute(conn)
    }
}

#[tonic::async_trait]
pub trait DetachTags {
    async fn detach(
        issue_id: &str,
        tag_ids: &[String],
        conn: &mut SqliteConnection,
    ) -> Result<usize, Error>;
}

#[tonic::async_trait]
impl DetachTags for IssueTag {
    async fn detach(
        issue_id: &str,
        tag_ids: &[String],
        conn: &mut SqliteConnection,
    ) -> Result<usize, Error> {
        if tag_ids.is_empty() {
            return Ok(0);
        }
        delete(
            issue_tags::table
                .filter(issue_tags::issue_id.eq(issue_id))
                .filter(issue_tags::tag_id.eq_any(tag_ids)),
        )
        .execute(conn)
    }
}

#[tonic::async_trait]
pub trait ListIssueTags {
    async fn list_for_issue(
        issue_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<IssueTag>, Error>;
    async fn list_for_issues(
        issue_ids: &[String],
        conn: &mut SqliteConnection,
    ) -> Result<Vec<IssueTag>, Error>;
}

#[tonic::async_trait]
impl ListIssueTags for IssueTag {
    async fn list_for_issue(
        issue_id: &str,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<IssueTag>, Error> {
        issue_tags::table
            .filter(issue_tags::issue_id.eq(issue_id))
            .load(conn)
    }

    async fn list_for_issues(
        issue_ids: &[String],
        conn: &mut SqliteConnection,
    ) -> Result<Vec<IssueTag>, Error> {
        if issue_ids.is_empty() {
            return Ok(Vec::new());
        }
        issue_tags::table
            .filter(issue_tags::issue_id.eq_any(issue_ids))
            .load(conn)
    }
}
