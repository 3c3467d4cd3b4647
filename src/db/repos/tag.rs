use diesel::prelude::*;
use diesel::result::Error;
use diesel::{delete, insert_into};

use crate::db::models::{NewTag, Tag};
use crate::db::schema::tags;

#[tonic::async_trait]
pub trait CreateTag {
    async fn create<'a>(new_tag: NewTag<'a>, conn: &mut SqliteConnection) -> Result<Tag, Error>;
}

#[tonic::async_trait]
impl CreateTag for Tag {
    async fn create<'a>(new_tag: NewTag<'a>, conn: &mut SqliteConnection) -> Result<Tag, Error> {
        insert_into(tags::table).values(new_tag).get_result(conn)
    }
}

#[tonic::async_trait]
pub trait ListTags {
    async fn list(conn: &mut SqliteConnection) -> Result<Vec<Tag>, Error>;
}

#[tonic::async_trait]
impl ListTags for Tag {
    async fn list(conn: &mut SqliteConnection) -> Result<Vec<Tag>, Error> {
        tags::table.order(tags::name.asc()).load(conn)
    }
}

#[tonic::async_trait]
pub trait DeleteTag {
    async fn delete(tag_id: &str, conn: &mut SqliteConnection) -> Result<Tag, Error>;
}

#[tonic::async_trait]
impl DeleteTag for Tag {
    async fn delete(tag_id: &str, conn: &mut SqliteConnection) -> Result<Tag, Error> {
        delete(tags::table.find(tag_id)).get_result(conn)
    }
}
