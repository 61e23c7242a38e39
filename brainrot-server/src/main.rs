use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use structopt::StructOpt;
use tower_http::trace::TraceLayer;

mod db;
mod error;
mod extractors;
mod games;
mod handlers;
mod services;
mod tests;

pub use error::Error;
use extractors::{AppState, PgPool};
use games::GameDirectory;

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

#[derive(StructOpt)]
#[structopt(about = "Comment and vote backend for the brainrot game site")]
struct Opt {
    /// Address to listen on
    #[structopt(long, default_value = "0.0.0.0:3000")]
    bind: SocketAddr,

    /// JSON file with the list of recognized game ids; the built-in catalog
    /// is used when absent
    #[structopt(long)]
    games: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    tracing_subscriber::fmt::init();

    // Fail closed: without storage credentials the comment endpoints would
    // be lying no-ops, so refuse to start instead.
    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = create_sqlx_pool(&db_url)
        .await
        .context("opening database")?;
    MIGRATOR
        .run(&mut *db.acquire().await?)
        .await
        .context("applying migrations")?;

    let games = match &opt.games {
        Some(path) => GameDirectory::from_file(path)?,
        None => GameDirectory::builtin(),
    };
    tracing::info!(num_games = games.len(), "loaded game directory");

    let app = app(AppState { db, games });

    tracing::info!("listening on {}", opt.bind);
    axum::Server::bind(&opt.bind)
        // connect-info is the fallback voter identity when no proxy header
        // is present
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("serving axum webserver")
}

pub async fn create_sqlx_pool(db_url: &str) -> anyhow::Result<PgPool> {
    Ok(PgPool::new(
        sqlx::postgres::PgPoolOptions::new()
            .max_connections(8)
            .connect(db_url)
            .await?,
    ))
}

fn app(state: AppState) -> Router {
    Router::new()
        .route(
            "/comments",
            get(handlers::fetch_comments).post(handlers::submit_comment),
        )
        .route("/comment-votes", post(handlers::cast_vote))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
