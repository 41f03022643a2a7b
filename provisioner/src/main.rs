//! Provisioner binary entry point

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Context;
use clap::Parser;

use shared::{logging, run_info, CreationState, RunId, Username};
use provisioner::{
    AdminIdentity, OutcomeTracker, ProvisionerConfig, ProvisioningDriver, UserProvisioningProcessor,
    services::{JsonUserStore, RealOutcomeTracker, RestRepositoryClient},
};

/// Environment variable consulted when no admin password is given
const ADMIN_PASSWORD_ENV: &str = "REPO_ADMIN_PASSWORD";

#[derive(Parser)]
#[command(name = "provisioner")]
#[command(about = "Creates load-test users (and group memberships) on a content repository")]
struct Args {
    /// Repository server base URL
    #[arg(long, default_value = "http://localhost:8080")]
    base_url: String,

    /// Administrative user the remote calls are made as
    #[arg(long, default_value = "admin")]
    admin_username: String,

    /// Administrative password (falls back to REPO_ADMIN_PASSWORD)
    #[arg(long)]
    admin_password: Option<String>,

    /// JSON file holding the local user records
    #[arg(long)]
    users: PathBuf,

    /// File with one username per line (defaults to every pending user)
    #[arg(long)]
    usernames: Option<PathBuf>,

    /// Treat users that already exist remotely as successfully created
    #[arg(long)]
    ignore_existing_users: bool,

    /// Group chances, e.g. "SITE_ADMINISTRATORS:0.05, DATA_ANALYSTS:0.25"
    #[arg(long, default_value = "")]
    user_groups: String,

    /// Maximum number of users provisioned at once
    #[arg(long, default_value = "8")]
    concurrency: usize,

    /// HTTP request timeout in milliseconds
    #[arg(long, default_value = "30000")]
    timeout_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write updated creation states back to the users file
    #[arg(long)]
    save: bool,

    /// Run id stamped on every log line (a fresh one is generated if absent)
    #[arg(long)]
    run_id: Option<String>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(ProvisionerConfig, PathBuf, Option<PathBuf>, bool)> {
        let password = match self.admin_password {
            Some(password) => password,
            None => env::var(ADMIN_PASSWORD_ENV)
                .with_context(|| format!("--admin-password or {ADMIN_PASSWORD_ENV} must be set"))?,
        };

        let mut config = ProvisionerConfig::new(self.base_url, AdminIdentity::new(self.admin_username, password))
            .with_ignore_existing_users(self.ignore_existing_users)
            .with_user_groups(Some(self.user_groups));
        config.concurrency = self.concurrency;
        config.timeout_ms = self.timeout_ms;

        Ok((config, self.users, self.usernames, self.save))
    }
}

async fn read_usernames(path: &Path) -> anyhow::Result<Vec<Username>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading usernames from {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Username::from)
        .collect())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    let args = Args::parse();

    let run_id = match args.run_id.as_deref() {
        Some(id) => RunId::from_string(id)?,
        None => RunId::new(),
    };
    RunId::init(run_id);
    logging::init_tracing(Some(args.log_level.as_str()));
    logging::log_startup("user provisioning run");

    if let Err(e) = run(args).await {
        logging::log_error("Provisioning run", &e);
        return Err(e);
    }

    logging::log_shutdown("run complete");
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let (config, users_path, usernames_path, save) = args.into_config()?;
    config.validate().context("invalid provisioner configuration")?;
    let group_policy = Arc::new(config.group_policy()?);
    run_info!("Group policy covers {} groups", group_policy.len());

    let user_store = Arc::new(
        JsonUserStore::load(&users_path)
            .await
            .with_context(|| format!("loading users from {}", users_path.display()))?,
    );
    let repository = Arc::new(RestRepositoryClient::new(&config.base_url, config.timeout())?);
    let tracker = Arc::new(RealOutcomeTracker::new());

    let processor = UserProvisioningProcessor::new(
        user_store.clone(),
        repository,
        tracker.clone(),
        config.admin.clone(),
        group_policy,
    )
    .with_ignore_existing_users(config.ignore_existing_users);

    let usernames = match &usernames_path {
        Some(path) => read_usernames(path).await?,
        None => user_store.usernames_in_state(CreationState::Pending).await,
    };

    let driver = ProvisioningDriver::new(Arc::new(processor), config.concurrency)?;
    let summary = driver.run(usernames).await;

    for (call, stats) in tracker.get_stats().await? {
        run_info!(
            "{}: {} calls ({} ok, {} tolerated, {} failed), avg {}ms",
            call,
            stats.total_calls,
            stats.successful_calls,
            stats.tolerated_calls,
            stats.failed_calls,
            stats.average_response_time_ms()
        );
    }

    if save {
        user_store
            .save()
            .await
            .with_context(|| format!("saving users to {}", users_path.display()))?;
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
