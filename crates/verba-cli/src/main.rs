// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use logging::LogTarget;
use runtime::ThreadRuntime;
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};
use verba_app::{AppCommand, AppState, Session, Transport};
use verba_client::HttpTransport;
use verba_testkit::DemoTransport;

const DEMO_SEED: u64 = 42;
const DEMO_DOCUMENTS: usize = 240;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `verba --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        logging::init(config.log_level(), &LogTarget::Stderr)?;
        if options.demo {
            return check_health(&DemoTransport::new(DEMO_SEED, DEMO_DOCUMENTS), "demo corpus");
        }
        let transport = http_transport(&config, &options)?;
        return check_health(&transport, transport.base_url());
    }

    logging::init(config.log_level(), &LogTarget::File(config.log_file()?))?;

    let mut state = AppState::default();
    state.dispatch(AppCommand::ShowView(config.start_view()));
    let mut session = Session::new(config.ordering());

    if options.demo {
        info!(documents = DEMO_DOCUMENTS, "starting against demo corpus");
        launch(
            DemoTransport::new(DEMO_SEED, DEMO_DOCUMENTS),
            &mut state,
            &mut session,
            config.overscan(),
        )
    } else {
        let transport = http_transport(&config, &options)?;
        info!(base_url = transport.base_url(), "starting");
        launch(transport, &mut state, &mut session, config.overscan())
    }
}

fn launch<T: Transport + 'static>(
    transport: T,
    state: &mut AppState,
    session: &mut Session,
    overscan: usize,
) -> Result<()> {
    let mut runtime = ThreadRuntime::new(transport);
    verba_tui::run_app(state, session, &mut runtime, overscan)
}

fn http_transport(config: &Config, options: &CliOptions) -> Result<HttpTransport> {
    HttpTransport::new(config.base_url(), config.timeout()?).with_context(|| {
        format!(
            "invalid [server] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })
}

fn check_health<T: Transport + ?Sized>(transport: &T, target: &str) -> Result<()> {
    match transport.health() {
        Ok(()) => {
            println!("ok: {target} is reachable");
            Ok(())
        }
        Err(error) => {
            warn!(%error, "health check failed");
            Err(error).with_context(|| format!("health check against {target} failed"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("verba: terminal client for a retrieval-augmented query service");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Run against a seeded in-memory corpus");
    println!("  --check                  Validate config and probe the service health endpoint");
    println!("  --help                   Show this help");
}
