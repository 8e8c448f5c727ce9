//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// A command line interface for Scrapyd.
#[derive(Parser, Debug, Clone)]
#[command(name = "scrapyd-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Target name from scrapy.cfg, or a daemon URL.
    #[arg(short, long, env = "SCRAPYD_TARGET")]
    pub target: Option<String>,

    /// Username for HTTP Basic authentication.
    #[arg(short, long, env = "SCRAPYD_USERNAME")]
    pub username: Option<String>,

    /// Password for HTTP Basic authentication.
    #[arg(short, long, env = "SCRAPYD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<f64>,

    /// Log requests and configuration lookups to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List configured deploy targets.
    Targets,

    /// List projects deployed on the daemon.
    Projects {
        /// Only show projects matching this pattern.
        #[arg(short, long, value_name = "PATTERN")]
        project: Option<String>,
    },

    /// List spiders of the matching projects.
    Spiders {
        /// Project name, can contain wildcard patterns.
        #[arg(short, long, value_name = "PATTERN")]
        project: Option<String>,

        /// Print one `project spider` line per spider.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Schedule the matching spiders of the matching projects.
    Schedule(ScheduleArgs),

    /// Show pending, running and finished jobs of a project.
    Jobs {
        /// Project name.
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Show the state of a job.
    Status {
        /// Job id.
        job: String,

        /// Project name.
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Show the load of the daemon.
    #[command(name = "daemonstatus")]
    DaemonStatus,

    /// List versions of a project.
    Versions {
        /// Project name.
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Delete a version of a project, or `all` of them.
    #[command(name = "delversion")]
    DelVersion {
        /// Version to delete, or `all`.
        version: String,

        /// Project name.
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Delete a project and all its versions.
    #[command(name = "delproject")]
    DelProject {
        /// Project name.
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Cancel a running job, or `all` running jobs.
    Cancel {
        /// Job id to cancel, or `all`.
        job: String,

        /// Project name.
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Upload a packaged project to a target.
    Deploy(DeployArgs),
}

/// Arguments for the schedule command.
#[derive(Args, Debug, Clone)]
pub struct ScheduleArgs {
    /// Spider name, can contain wildcard patterns.
    #[arg(default_value = "*")]
    pub spider: String,

    /// Project name, can contain wildcard patterns.
    #[arg(short, long, value_name = "PATTERN")]
    pub project: Option<String>,

    /// Spider argument or setting (KEY=VALUE), repeatable.
    #[arg(long = "arg", value_name = "KEY=VALUE")]
    pub args: Vec<String>,
}

/// Arguments for the deploy command.
#[derive(Args, Debug, Clone)]
pub struct DeployArgs {
    /// Target to deploy to (defaults to `--target`, then `default`).
    pub target: Option<String>,

    /// Project name on the target.
    #[arg(short, long)]
    pub project: Option<String>,

    /// Version to deploy: a label, `GIT`, `HG`; defaults to the current timestamp.
    #[arg(short, long)]
    pub version: Option<String>,

    /// Deploy to every configured target.
    #[arg(short = 'a', long = "deploy-all-targets")]
    pub all_targets: bool,

    /// Packaged project (egg) to upload.
    #[arg(long, value_name = "FILE", required = true)]
    pub egg: PathBuf,
}
