use std::collections::HashSet;
use std::pin::Pin;

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tonic::{Request, Response, Status};
use tracing::info;
use uuid::Uuid;

use proto::kanban::{
    issues_service_server::IssuesService, CreateIssueParams, Issue as ProtoIssue, IssueId,
    MoveIssueParams, SearchIssuesParams, SetIssueTagsParams, UpdateIssueParams,
};

use crate::controllers::{acquire, issue_to_proto, rank_error, storage_error};
use crate::db::connection::SqlitePool;
use crate::db::models::{Issue, IssueChangeSet, IssueTag, NewIssue, NewIssueTag};
use crate::db::repos::issue::{
    CreateIssue, DeleteIssue, GetIssue, IssueFilter, IssueRanks, RepositionIssue, SearchIssues,
    UpdateIssue,
};
use crate::db::repos::issue_tag::{AttachTags, DetachTags, ListIssueTags};
use crate::rank::generate_key_between;

pub struct IssuesController {
    pub pool: SqlitePool,
}

fn links_for(issue_id: &str, tag_ids: &[String]) -> Vec<NewIssueTag> {
    tag_ids
        .iter()
        .map(|tag_id| NewIssueTag {
            id: Uuid::new_v4().to_string(),
            issue_id: issue_id.to_string(),
            tag_id: tag_id.clone(),
        })
        .collect()
}

#[tonic::async_trait]
impl IssuesService for IssuesController {
    async fn create_issue(
        &self,
        request: Request<CreateIssueParams>,
    ) -> Result<Response<ProtoIssue>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let last = Issue::last_rank(&data.column_id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Issue"))?;
        let rank = generate_key_between(last.as_deref(), None).map_err(rank_error)?;

        let id = Uuid::new_v4().to_string();
        let new_issue = NewIssue {
            id: &id,
            column_id: &data.column_id,
            title: &data.title,
            description: data.description.as_deref(),
            rank: &rank,
        };
        let issue = Issue::create(new_issue, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Issue"))?;

        // Second, separate write: if it fails the issue stays without its tags.
        IssueTag::attach(links_for(&issue.id, &data.tag_ids), &mut conn)
            .await
            .map_err(|err| storage_error(err, "IssueTag"))?;
        info!(issue_id = %issue.id, column_id = %issue.column_id, tags = data.tag_ids.len(), "created issue");

        Ok(Response::new(issue_to_proto(&issue)))
    }

    async fn update_issue(
        &self,
        request: Request<UpdateIssueParams>,
    ) -> Result<Response<ProtoIssue>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        if data.title.is_none() && data.description.is_none() {
            let issue = Issue::get(&data.issue_id, &mut conn)
                .await
                .map_err(|err| storage_error(err, "Issue"))?;
            return Ok(Response::new(issue_to_proto(&issue)));
        }

        let change_set = IssueChangeSet {
            title: data.title.clone(),
            description: data.description.clone(),
        };
        let issue = Issue::update(&data.issue_id, change_set, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Issue"))?;
        info!(issue_id = %issue.id, "updated issue");

        Ok(Response::new(issue_to_proto(&issue)))
    }

    async fn set_issue_tags(
        &self,
        request: Request<SetIssueTagsParams>,
    ) -> Result<Response<ProtoIssue>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let issue = Issue::get(&data.issue_id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Issue"))?;

        let current: HashSet<String> = IssueTag::list_for_issue(&issue.id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "IssueTag"))?
            .into_iter()
            .map(|link| link.tag_id)
            .collect();
        let desired: HashSet<String> = data.tag_ids.iter().cloned().collect();

        let to_add: Vec<String> = desired.difference(&current).cloned().collect();
        let to_remove: Vec<String> = current.difference(&desired).cloned().collect();

        IssueTag::attach(links_for(&issue.id, &to_add), &mut conn)
            .await
            .map_err(|err| storage_error(err, "IssueTag"))?;
        IssueTag::detach(&issue.id, &to_remove, &mut conn)
            .await
            .map_err(|err| storage_error(err, "IssueTag"))?;
        info!(
            issue_id = %issue.id,
            added = to_add.len(),
            removed = to_remove.len(),
            "replaced issue tags"
        );

        Ok(Response::new(issue_to_proto(&issue)))
    }

    async fn move_issue(
        &self,
        request: Request<MoveIssueParams>,
    ) -> Result<Response<ProtoIssue>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let (lower, upper) = Issue::rank_window(
            &data.column_id,
            &data.issue_id,
            data.position as usize,
            &mut conn,
        )
        .await
        .map_err(|err| storage_error(err, "Issue"))?;

        let rank =
            generate_key_between(lower.as_deref(), upper.as_deref()).map_err(rank_error)?;

        // The reorder only becomes visible once this single write succeeds.
        let issue = Issue::reposition(&data.issue_id, &data.column_id, &rank, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Issue"))?;
        info!(
            issue_id = %issue.id,
            column_id = %issue.column_id,
            rank = %issue.rank,
            "moved issue"
        );

        Ok(Response::new(issue_to_proto(&issue)))
    }

    async fn delete_issue(
        &self,
        request: Request<IssueId>,
    ) -> Result<Response<ProtoIssue>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let issue = Issue::delete(&data.issue_id, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Issue"))?;
        info!(issue_id = %issue.id, "deleted issue");

        Ok(Response::new(issue_to_proto(&issue)))
    }

    type SearchIssuesStream = Pin<Box<dyn Stream<Item = Result<ProtoIssue, Status>> + Send>>;

    async fn search_issues(
        &self,
        request: Request<SearchIssuesParams>,
    ) -> Result<Response<Self::SearchIssuesStream>, Status> {
        let data = request.get_ref();
        let mut conn = acquire(&self.pool)?;

        let filter = IssueFilter {
            column_ids: data.column_id.clone().map(|id| vec![id]),
            search: data.search.clone(),
            tag_ids: data.tag_ids.clone(),
        };
        let rows = Issue::search(&filter, &mut conn)
            .await
            .map_err(|err| storage_error(err, "Issue"))?;
        info!(matches = rows.len(), "streaming issue search results");

        let proto_rows: Vec<ProtoIssue> = rows.iter().map(issue_to_proto).collect();
        let mut stream = tokio_stream::iter(proto_rows);
        let (sender, receiver) = mpsc::channel(1);

        tokio::spawn(async move {
            while let Some(issue) = stream.next().await {
                if sender
                    .send(Result::<ProtoIssue, Status>::Ok(issue))
                    .await
                    .is_err()
                {
                    break;
                }
            }
        });
        let output_stream = ReceiverStream::new(receiver);

        Ok(Response::new(
            Box::pin(output_stream) as Self::SearchIssuesStream
        ))
    }
}
