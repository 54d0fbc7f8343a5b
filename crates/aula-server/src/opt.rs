use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "aula", about = "Run the aula learning-management API")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    Run(Run),
}

#[derive(Debug, Clone, Args)]
#[group(multiple = true, required = false)]
pub(crate) struct Db {
    #[arg(long, help = "Min connections")]
    pub(crate) db_min_connections: Option<u32>,

    #[arg(long, help = "Max connections")]
    pub(crate) db_max_connections: Option<u32>,
}

#[derive(Debug, Clone, Parser)]
pub(crate) struct Run {
    #[arg(long)]
    pub(crate) host: Option<IpAddr>,

    #[arg(short, long)]
    pub(crate) port: Option<u16>,

    #[arg(long, help = "Database url; DATABASE_URL is used when absent")]
    pub(crate) database_url: Option<Url>,

    #[command(flatten)]
    pub(crate) db: Db,

    #[arg(long, default_value_t = 3600, help = "Session token lifetime in seconds")]
    pub(crate) session_ttl: i64,

    #[arg(long, help = "Seed an admin account with this email on startup")]
    pub(crate) admin_email: Option<String>,

    #[arg(long, requires = "admin_email", help = "Password for the seeded admin account")]
    pub(crate) admin_password: Option<String>,
}
