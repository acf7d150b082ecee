use std::io::IsTerminal;
use std::time::Instant;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use craap::{
    affordance::{AffordanceKind, SystemClipboard},
    cli::{Cli, Command},
    config::Config,
    controller::{ArgTab, Controller, Endpoint, UreqTransport, ViewHandle},
    notify::{TerminalNotifier, send_and_notify},
    terminal::{RenderOptions, SpinnerObserver, render},
};

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(submit) = args.submit {
        config.submit = submit.into();
    }
    let color = config.color && !args.no_color && std::env::var_os("NO_COLOR").is_none();

    match args.command {
        Command::Analyze {
            url,
            raw,
            headers,
            copy,
        } => {
            let endpoint = Endpoint::new(&config.endpoint)?;
            let transport = UreqTransport::new(config.timeout());
            let spinner = SpinnerObserver::new(std::io::stderr().is_terminal());
            let mut view = ViewHandle::new(Box::new(spinner));
            let mut controller = Controller::new(transport, endpoint, config.submit);
            controller.analyze(&ArgTab(url), &mut view);

            if raw {
                view.reconciler_mut().toggle_raw();
            }
            let now = Instant::now();
            if !copy.is_empty() {
                let mut clipboard = SystemClipboard::new();
                for kind in copy.into_iter().map(AffordanceKind::from) {
                    match view.reconciler_mut().state_mut().affordance_mut(kind) {
                        Some(affordance) => {
                            affordance.activate(&mut clipboard, now);
                        }
                        None => warn!(action = kind.title(), "nothing to copy"),
                    }
                }
            }

            let opts = RenderOptions {
                color,
                show_headers: headers,
                now,
            };
            print!("{}", render(view.state(), &opts));
        }
        Command::Send { url } => {
            let endpoint = Endpoint::new(&config.endpoint)?;
            let transport = UreqTransport::new(config.timeout());
            let mut notifier = TerminalNotifier { color };
            send_and_notify(
                &transport,
                &endpoint,
                config.submit,
                &ArgTab(url),
                &mut notifier,
            );
        }
        Command::Config => print!("{}", config.to_toml()?),
    }
    Ok(())
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("craap={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
