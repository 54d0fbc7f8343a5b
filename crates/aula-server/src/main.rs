use crate::opt::{Commands, Db, Run};
use anyhow::{Context, Result, anyhow};
use axum::serve;
use clap::Parser;
use sea_orm::{ConnectOptions, Database};
use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

mod app;
mod auth;
mod db;
mod opt;
mod permissions;
mod principal;
mod routes;

const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEFAULT_PORT: u16 = 3030;

#[derive(Debug)]
pub(crate) struct InnerAppConfig {
    session_ttl_seconds: i64,
}

#[derive(Clone, Debug)]
pub(crate) struct AppConfig(Arc<InnerAppConfig>);

impl AppConfig {
    fn new(session_ttl_seconds: i64) -> Self {
        Self(Arc::new(InnerAppConfig { session_ttl_seconds }))
    }

    pub fn session_ttl_seconds(&self) -> i64 {
        self.0.session_ttl_seconds
    }
}

async fn run(opt: Run) -> Result<()> {
    aula_utils::tracing::setup(&aula_utils::tracing::TracingConfig {
        package: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })?;

    let db_url = match opt.database_url.clone() {
        Some(url) => url.to_string(),
        None => env::var("DATABASE_URL").map_err(|e| anyhow!("no --database-url and no DATABASE_URL env: {e}"))?,
    };

    let pool = Database::connect(build_connect_options(&opt.db, db_url)).await?;
    db::apply_schema(&pool)
        .await
        .inspect_err(|error| tracing::error!(error = error as &dyn std::error::Error, "failed to apply schema"))?;

    if let (Some(email), Some(password)) = (&opt.admin_email, &opt.admin_password) {
        db::provision_admin(&pool, email, password)
            .await
            .context("failed to provision admin account")?;
    }

    let Run { host, port, session_ttl, .. } = opt;

    let app_config = AppConfig::new(session_ttl);
    let app = app::create_app(app_config, pool);

    let listener = aula_utils::net::create_listener((host, port), (DEFAULT_HOST, DEFAULT_PORT)).await?;

    tracing::info!(local_addr = %listener.local_addr()?, "starting app");
    serve::serve(listener, app.into_make_service()).await?;
    Ok(())
}

fn build_connect_options(db_options: &Db, db_url: String) -> ConnectOptions {
    let mut options = ConnectOptions::new(db_url);
    if let Some(min_connections) = db_options.db_min_connections {
        options.min_connections(min_connections);
    }
    if let Some(max_connections) = db_options.db_max_connections {
        options.max_connections(max_connections);
    }
    options
}

fn main() -> Result<()> {
    let main = async {
        let opt = opt::Cli::parse();

        match opt.command {
            Commands::Run(o) => run(o).await?,
        }
        Ok(())
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(main)
}
