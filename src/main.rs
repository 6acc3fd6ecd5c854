//! autobump - keep pinned runtime versions current through pull requests

use anyhow::Context;
use autobump::cli::{CliArgs, Command, RunArgs};
use autobump::config::{Config, Credentials, ProjectSettings};
use autobump::engine::{checkout_settings, RunOptions, UpdateEngine};
use autobump::git::SystemGit;
use autobump::hosting::GitHubService;
use autobump::output::{create_formatter, OutputConfig};
use autobump::probe::{HttpClient, TemplateLocation};
use clap::Parser;
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // RUST_LOG wins over the verbosity flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("autobump={}", args.log_level())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Everything a command needs besides its own arguments
struct Prepared {
    settings: ProjectSettings,
    credentials: Credentials,
    hosting: GitHubService,
    git: SystemGit,
}

fn prepare(args: &CliArgs, project: &str, profile: Option<&str>) -> anyhow::Result<Prepared> {
    let config = Config::load(&args.config)?;
    let settings = config.project(project)?;
    let credentials = config.credentials(profile)?;
    let hosting = GitHubService::new(
        &credentials.token,
        settings.repo.clone(),
        credentials.host.as_deref(),
    )
    .context("failed to set up hosting client")?;
    let git = SystemGit::new()
        .with_author(settings.author_name.clone(), settings.author_email.clone());

    Ok(Prepared {
        settings,
        credentials,
        hosting,
        git,
    })
}

fn run_options(args: &CliArgs, run: &RunArgs) -> RunOptions {
    RunOptions {
        auto_merge: run.auto_merge,
        dry_run: run.dry_run,
        show_progress: args.show_progress(),
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let color = args.use_color(io::stdout().is_terminal());
    let formatter = create_formatter(OutputConfig::from_cli(
        args.json,
        args.verbose,
        args.quiet,
        color,
    ));
    let mut stdout = io::stdout().lock();

    match &args.command {
        Command::Runtime(run) => {
            let ctx = prepare(&args, &run.project, run.profile.as_deref())?;
            let template = ctx.settings.probe_template()?;
            let prober = TemplateLocation::new(template, HttpClient::new()?);
            let engine = UpdateEngine::new(
                &ctx.settings,
                checkout_settings(&ctx.settings, &ctx.hosting, ctx.credentials.web_host()),
                &ctx.git,
                &ctx.hosting,
                &prober,
                run_options(&args, run),
            )?;

            let report = engine.run().await?;
            formatter.format(&report, &mut stdout)?;
        }
        Command::Port(port) => {
            let ctx = prepare(&args, &port.run.project, port.run.profile.as_deref())?;
            // Porting never probes; an unusable template is never consulted
            let prober = TemplateLocation::new(
                ctx.settings.probe_url.clone().unwrap_or_default(),
                HttpClient::new()?,
            );
            let engine = UpdateEngine::new(
                &ctx.settings,
                checkout_settings(&ctx.settings, &ctx.hosting, ctx.credentials.web_host()),
                &ctx.git,
                &ctx.hosting,
                &prober,
                run_options(&args, &port.run),
            )?;

            let report = engine.port(&port.from, &port.commit).await?;
            formatter.format(&report, &mut stdout)?;
        }
        Command::Probe(probe) => {
            let ctx = prepare(&args, &probe.project, probe.profile.as_deref())?;
            let template = ctx.settings.probe_template()?;
            let prober = TemplateLocation::new(template, HttpClient::new()?);
            let engine = UpdateEngine::new(
                &ctx.settings,
                checkout_settings(&ctx.settings, &ctx.hosting, ctx.credentials.web_host()),
                &ctx.git,
                &ctx.hosting,
                &prober,
                RunOptions {
                    dry_run: true,
                    show_progress: args.show_progress(),
                    ..RunOptions::default()
                },
            )?;

            let results = engine.probe().await?;
            formatter.format_probe(&ctx.settings.name, &results, &mut stdout)?;
        }
    }

    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}
