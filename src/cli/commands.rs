//! CLI command definitions for swe-eval.
//!
//! Two commands: `run` drives a full evaluation over a dataset slice,
//! `fetch` loads and displays a slice without running anything.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::actions::{ActionClient, HttpActionClient};
use crate::agent::{CoderAgentArgs, ProcessCoderAgent};
use crate::config::{
    EvalConfig, ModelEnvConfig, DEFAULT_ACTIONS_URL, DEFAULT_AGENT_COMMAND,
    DEFAULT_AGENT_LOGS_DIR,
};
use crate::dataset::{filter_by_repo, SweBenchDataset, DEFAULT_DATASET, DEFAULT_SPLIT};
use crate::evaluation::{EvalRunner, EvalSummary, IssueStatus};

/// SWE-bench evaluation driver.
#[derive(Parser)]
#[command(name = "swe-eval")]
#[command(about = "Run coding agents against SWE-bench issues in remote workspaces")]
#[command(version)]
#[command(
    long_about = "swe-eval iterates over SWE-bench issue records, provisions one remote workspace per repository, and invokes an external coding agent on each issue.\n\nExample usage:\n  swe-eval run --offset 1 --count 49 --agent-cmd 'python -m baseagent'"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the evaluation loop over a dataset slice.
    Run(RunArgs),

    /// Load a dataset slice and display its records without evaluating.
    Fetch(FetchArgs),
}

/// Arguments for `swe-eval run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// HuggingFace dataset identifier.
    #[arg(long, default_value = DEFAULT_DATASET)]
    pub dataset: String,

    /// Dataset split to evaluate.
    #[arg(long, default_value = DEFAULT_SPLIT)]
    pub split: String,

    /// Starting row offset of the slice.
    #[arg(long, default_value = "1")]
    pub offset: usize,

    /// Number of records to evaluate.
    #[arg(short = 'n', long, default_value = "49")]
    pub count: usize,

    /// Only evaluate issues from this repository (owner/repo).
    #[arg(long)]
    pub repo: Option<String>,

    /// Base URL of the action-execution service.
    #[arg(long, default_value = DEFAULT_ACTIONS_URL, env = "SWE_EVAL_ACTIONS_URL")]
    pub actions_url: String,

    /// Command used to launch the coding agent.
    #[arg(long, default_value = DEFAULT_AGENT_COMMAND)]
    pub agent_cmd: String,

    /// Per-issue agent timeout in seconds.
    #[arg(long, default_value = "600")]
    pub agent_timeout: u64,

    /// Directory for per-issue agent logs.
    #[arg(long, default_value = DEFAULT_AGENT_LOGS_DIR)]
    pub logs_dir: String,

    /// API key for the agent's model backend.
    #[arg(long, env = "MODEL_API_KEY")]
    pub api_key: Option<String>,

    /// Endpoint of the agent's model backend.
    #[arg(long, env = "MODEL_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Model backend label.
    #[arg(long, default_value = "azure")]
    pub model_env: String,

    /// Output the run summary as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `swe-eval fetch`.
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// HuggingFace dataset identifier.
    #[arg(long, default_value = DEFAULT_DATASET)]
    pub dataset: String,

    /// Dataset split to fetch.
    #[arg(long, default_value = DEFAULT_SPLIT)]
    pub split: String,

    /// Starting row offset of the slice.
    #[arg(long, default_value = "1")]
    pub offset: usize,

    /// Number of records to fetch.
    #[arg(short = 'n', long, default_value = "49")]
    pub count: usize,

    /// Only show issues from this repository (owner/repo).
    #[arg(long)]
    pub repo: Option<String>,

    /// Output records as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parse CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parse CLI arguments and execute the selected command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Execute the selected command with pre-parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_evaluation(args).await,
        Commands::Fetch(args) => fetch_slice(args).await,
    }
}

async fn run_evaluation(args: RunArgs) -> anyhow::Result<()> {
    let mut model_env = ModelEnvConfig::default().with_model_env(&args.model_env);
    if let Some(api_key) = &args.api_key {
        model_env = model_env.with_api_key(api_key);
    }
    if let Some(endpoint) = &args.endpoint {
        model_env = model_env.with_endpoint(endpoint);
    }

    let mut config = EvalConfig::default()
        .with_dataset(&args.dataset, &args.split)
        .with_slice(args.offset, args.count)
        .with_agent_command(&args.agent_cmd)
        .with_agent_timeout(Duration::from_secs(args.agent_timeout))
        .with_agent_logs_dir(&args.logs_dir)
        .with_actions_url(&args.actions_url)
        .with_model_env(model_env);
    if let Some(repo) = args.repo {
        config = config.with_repo_filter(repo);
    }

    let issues = load_slice(
        &config.dataset_name,
        &config.split,
        config.offset,
        config.count,
        config.repo_filter.as_deref(),
    )
    .await?;

    let actions: Arc<dyn ActionClient> = Arc::new(HttpActionClient::new(&config.actions_url));
    let agent = Arc::new(ProcessCoderAgent::new(
        CoderAgentArgs::new(&config.agent_logs_dir)
            .with_command(&config.agent_command)
            .with_timeout(config.agent_timeout)
            .with_model_env(config.model_env.clone()),
    ));

    let runner = EvalRunner::new(actions, agent);
    let summary = runner.run(&issues).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

async fn fetch_slice(args: FetchArgs) -> anyhow::Result<()> {
    let issues = load_slice(
        &args.dataset,
        &args.split,
        args.offset,
        args.count,
        args.repo.as_deref(),
    )
    .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
        return Ok(());
    }

    for issue in &issues {
        println!(
            "{}  {}  base={}  hints={}",
            issue.instance_id,
            issue.repo,
            issue.base_commit,
            issue.hints_text.as_deref().is_some_and(|h| !h.is_empty()),
        );
    }
    println!("{} records", issues.len());
    Ok(())
}

async fn load_slice(
    dataset_name: &str,
    split: &str,
    offset: usize,
    count: usize,
    repo_filter: Option<&str>,
) -> anyhow::Result<Vec<crate::dataset::IssueRecord>> {
    let dataset = SweBenchDataset::with_dataset(dataset_name, split);
    let mut issues = dataset.fetch(offset, count).await?;
    if let Some(repo) = repo_filter {
        issues = filter_by_repo(issues, repo);
    }
    info!(
        dataset = dataset_name,
        split = split,
        offset = offset,
        loaded = issues.len(),
        "Loaded issue records"
    );
    Ok(issues)
}

fn print_summary(summary: &EvalSummary) {
    println!("Evaluation finished at {}", summary.finished_at);
    println!("  total:           {}", summary.total);
    println!("  completed:       {}", summary.completed);
    println!("  invalid_record:  {}", summary.invalid_record);
    println!("  workspace_error: {}", summary.workspace_error);
    println!("  agent_error:     {}", summary.agent_error);

    for outcome in &summary.outcomes {
        if outcome.status == IssueStatus::Completed {
            continue;
        }
        println!(
            "  {} [{}]: {}",
            outcome.issue_id,
            outcome.status,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
}
