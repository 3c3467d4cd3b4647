use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;

use proto::kanban::{
    tags_service_server::TagsService, CreateTagParams, ListTagsParams, Tag as ProtoTag, TagId,
    TagList,
};

use crate::controllers::{acquire, storage_error, tag_to_proto};
use crate::db::connection::SqlitePool;
use crate::db::models::{NewTag, Tag};
use crate::db::repos::tag::{CreateTag, DeleteTag, ListTags};

pub struct TagsController {
    pub pool: SqlitePool,
}

#[tonic::async_trait]
impl TagsService for TagsController {
    async fn create_tag(
        &self,
        request: Request<CreateTagParams>,
    ) -> Result<Response<ProtoTag>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let id = Uuid::new_v4().to_string();
        let new_tag = NewTag {
            id: &id,
            name: &data.name,
        };
        let tag = Tag::create(new_tag, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Tag"))?;
        info!(tag_id = %tag.id, name = %tag.name, "created tag");

        Ok(Response::new(tag_to_proto(&tag)))
    }

    async fn list_tags(
        &self,
        _request: Request<ListTagsParams>,
    ) -> Result<Response<TagList>, Status> {
        let mut conn = acquire(&self.pool)?;

        let rows = Tag::list(&mut conn)
            .await
            .map_err(|err| storage_error(err, "Tag"))?;

        Ok(Response::new(TagList {
            tags: rows.iter().map(tag_to_proto).collect(),
        }))
    }

    async fn delete_tag(&self, request: Request<TagId>) -> Result<Response<ProtoTag>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let tag = Tag::delete(&data.tag_id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Tag"))?;
        info!(tag_id = %tag.id, "deleted tag");

        Ok(Response::new(tag_to_proto(&tag)))
    }
}
