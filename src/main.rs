use std::env;

use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kanban::controllers::{
    boards::BoardsController, columns::ColumnsController, issues::IssuesController,
    tags::TagsController,
};
use kanban::db::connection;
use proto::kanban::{
    boards_service_server::BoardsServiceServer, columns_service_server::ColumnsServiceServer,
    issues_service_server::IssuesServiceServer, tags_service_server::TagsServiceServer,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_url = env::var("APP_URL")
        .unwrap_or_else(|_| "127.0.0.1:50051".to_string())
        .parse()?;
    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| "kanban.sqlite3".to_string());

    let pool = connection::initialize(&database_url)?;
    info!(database_url = %database_url, "store ready");

    let boards_service_server = BoardsServiceServer::new(BoardsController { pool: pool.clone() });
    let columns_service_server =
        ColumnsServiceServer::new(ColumnsController { pool: pool.clone() });
    let issues_service_server = IssuesServiceServer::new(IssuesController { pool: pool.clone() });
    let tags_service_server = TagsServiceServer::new(TagsController { pool: pool.clone() });

    info!(%app_url, "kanban service listening");
    Server::builder()
        .add_service(boards_service_server)
        .add_service(columns_service_server)
        .add_service(issues_service_server)
        .add_service(tags_service_server)
        .serve(app_url)
        .await?;

    Ok(())
}
