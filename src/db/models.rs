use chrono::NaiveDateTime;

use super::schema::{boards, columns, issue_tags, issues, tags};

#[derive(Queryable, Debug, Clone)]
pub struct Board {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = boards)]
pub struct NewBoard<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = boards)]
pub struct BoardChangeSet {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Queryable, Debug, Clone)]
pub struct Column {
    pub id: String,
    pub board_id: String,
    pub title: String,
    pub rank: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = columns)]
pub struct NewColumn<'a> {
    pub id: &'a str,
    pub board_id: &'a str,
    pub title: &'a str,
    pub rank: &'a str,
}

#[derive(Queryable, Debug, Clone)]
pub struct Issue {
    pub id: String,
    pub column_id: String,
    pub title: String,
    pub description: Option<String>,
    pub rank: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = issues)]
pub struct NewIssue<'a> {
    pub id: &'a str,
    pub column_id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub rank: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = issues)]
pub struct IssueChangeSet {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Queryable, Debug, Clone)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = tags)]
pub struct NewTag<'a> {
    pub id: &'a str,
    pub name: &'a str,
}

#[derive(Queryable, Debug, Clone)]
pub struct IssueTag {
    pub id: String,
    pub issue_id: String,
    pub tag_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = issue_tags)]
pub struct NewIssueTag {
    pub id: String,
    pub issue_id: String,
    pub tag_id: String,
}
