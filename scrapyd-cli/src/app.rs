//! Command dispatch.

use std::io::Write;

use tracing::debug;

use scrapyd_client::{ScrapydClient, Selection};
use scrapyd_domain::{JobArgs, Pattern};

use crate::cli::{Cli, Commands};
use crate::commands;
use crate::deploy;
use crate::error::CliResult;
use crate::session::{client_options, project_pattern, require_project, Session};

/// Load configuration and run the parsed command.
pub async fn run(cli: Cli) -> CliResult<()> {
    let session = Session::load()?;
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    execute(cli, &session, &mut stdout, &mut stderr).await
}

/// Run `cli` against an already loaded session.
pub async fn execute<W: Write, E: Write>(
    cli: Cli,
    session: &Session,
    out: &mut W,
    err: &mut E,
) -> CliResult<()> {
    let options = client_options(&cli)?;

    match &cli.command {
        Commands::Targets => return commands::targets(out, &session.targets),
        Commands::Deploy(args) => {
            return deploy::deploy(args, cli.target.as_deref(), session, &options, out, err).await
        }
        _ => {}
    }

    let target = session.select(cli.target.as_deref())?;
    let client = ScrapydClient::connect(&target, &session.credentials, options)?;
    debug!(command = ?cli.command, url = %client.base_url(), "running command");

    let result = match cli.command {
        Commands::Projects { project } => {
            let pattern = match project {
                Some(pattern) => Pattern::new(&pattern)?,
                None => Pattern::any(),
            };
            commands::projects(&client, out, &pattern).await
        }
        Commands::Spiders { project, verbose } => {
            let projects = project_pattern(project.as_deref(), &target)?;
            commands::spiders(&client, out, &projects, verbose).await
        }
        Commands::Schedule(args) => {
            let projects = project_pattern(args.project.as_deref(), &target)?;
            let spiders = Pattern::new(&args.spider)?;
            let job_args = JobArgs::parse(&args.args)?;
            commands::schedule(&client, out, &projects, &spiders, &job_args).await
        }
        Commands::Jobs { project } => {
            let project = require_project(project.as_deref(), &target)?;
            commands::jobs(&client, out, &project).await
        }
        Commands::Status { job, project } => {
            let project = project.or_else(|| target.project.clone());
            commands::status(&client, out, &job, project.as_deref()).await
        }
        Commands::DaemonStatus => commands::daemon_status(&client, out).await,
        Commands::Versions { project } => {
            let project = require_project(project.as_deref(), &target)?;
            commands::versions(&client, out, &project).await
        }
        Commands::DelVersion { version, project } => {
            let project = require_project(project.as_deref(), &target)?;
            commands::delete_version(&client, out, &project, &Selection::parse(&version)).await
        }
        Commands::DelProject { project } => {
            let project = require_project(project.as_deref(), &target)?;
            commands::delete_project(&client, out, &project).await
        }
        Commands::Cancel { job, project } => {
            let project = require_project(project.as_deref(), &target)?;
            commands::cancel(&client, out, &project, &Selection::parse(&job)).await
        }
        Commands::Targets | Commands::Deploy(_) => Ok(()),
    };

    client.close();
    result
}
