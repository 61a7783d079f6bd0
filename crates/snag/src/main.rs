use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use snag_fetch::{Config, Credentials, DispatchOutcome, Dispatcher};
use tracing::{Level, error, info};

use crate::cli::App;
use crate::prompt::TerminalPrompter;
use crate::tracker::ProgressFactory;

mod cli;
mod prompt;
mod tracker;

fn main() -> ExitCode {
    let app = App::parse();
    let config = app.config();

    let level = if config.debug { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&app, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(app: &App, config: &Config) -> Result<()> {
    if app.output.is_some() && app.urls.len() > 1 {
        bail!("--output can only be used with a single URL");
    }

    let progress = ProgressFactory::new("Downloading");
    let prompter = TerminalPrompter::default();
    let dispatcher = Dispatcher::new(config)
        .with_progress(&progress)
        .with_prompter(&prompter);

    for url in &app.urls {
        let credentials = Credentials::new(app.user.clone(), app.password.clone());
        let outcome = dispatcher
            .dispatch(url, credentials, app.output.as_deref())
            .with_context(|| format!("failed to fetch {url}"))?;

        if let DispatchOutcome::RedirectNotFollowed { location } = outcome {
            info!("{url} redirects to {location}; not following");
        }
    }

    Ok(())
}
