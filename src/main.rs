//! Trackpilot CLI
//!
//! Thin orchestration shell: parse arguments, launch a browser, run one
//! workflow against an exclusively-owned session, and print the result as
//! JSON. Everything interesting happens in the library.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use trackpilot::artifact::FsArtifactStore;
use trackpilot::config::RunConfig;
use trackpilot::driver::{launch_browser, CdpDriver, LaunchConfig};
use trackpilot::engine::RunStatus;
use trackpilot::session::Session;
use trackpilot::workflows::{run_workflow, Credentials, Parameters, WorkflowKind};

/// Trackpilot workflow runner
#[derive(Parser, Debug)]
#[command(name = "trackpilot")]
#[command(version)]
#[command(about = "Drive a bug tracker UI through resilient multi-step workflows")]
struct Args {
    /// Workflow to run: login, create-project, report-issue, assign-issue, change-status
    workflow: String,

    /// Base URL of the target tracker
    #[arg(long, default_value = "http://localhost/mantis")]
    base_url: String,

    /// Account username
    #[arg(short, long, default_value = "administrator")]
    username: String,

    /// Account password
    #[arg(short, long, default_value = "root")]
    password: String,

    /// Workflow parameter as key=value; repeatable
    #[arg(short = 'P', long = "param", value_parser = parse_key_val)]
    params: Vec<(String, String)>,

    /// Directory failure screenshots are written into
    #[arg(long, default_value = "artifacts")]
    artifact_dir: std::path::PathBuf,

    /// Default wait timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Run the browser headless
    #[arg(long, default_value = "true")]
    headless: bool,

    /// Path to Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let kind: WorkflowKind = args
        .workflow
        .parse()
        .with_context(|| format!("unknown workflow '{}'", args.workflow))?;

    let config = RunConfig::builder()
        .base_url(&args.base_url)
        .artifact_dir(&args.artifact_dir)
        .default_timeout(Duration::from_secs(args.timeout_secs))
        .build();

    let launch = LaunchConfig {
        headless: args.headless,
        chrome_path: args.chrome_path.clone(),
        ..LaunchConfig::default()
    };

    let browser = launch_browser(&launch)
        .await
        .context("failed to launch browser")?;
    let page = browser.new_page().await.context("failed to open a page")?;

    let store = Arc::new(FsArtifactStore::new(&config.artifact_dir));
    let session = Session::new(Box::new(CdpDriver::new(page, store)));

    let credentials = Credentials::new(&args.username, &args.password);
    let mut params = Parameters::new();
    for (key, value) in &args.params {
        params.set(key, value);
    }

    let result = run_workflow(&session, kind, &credentials, &params, &config).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    drop(session);
    browser.close().await.context("failed to close browser")?;

    std::process::exit(match result.status {
        RunStatus::Success => 0,
        RunStatus::Failure => 1,
        RunStatus::Uncertain => 2,
    });
}
