use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use deferred_intuition::{
    two_ways::{first_promise, get_data},
    Scheduler, Sink, Stdout,
};

/// Run one of the deferred value scenarios.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    #[arg(long, value_enum, default_value_t = Scenario::FirstPromise)]
    scenario: Scenario,

    #[arg(long, value_enum, default_value_t = Style::Callback)]
    style: Style,

    /// Wait for timers on the wall clock instead of skipping ahead.
    #[arg(long)]
    real_time: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    FirstPromise,
    GetData,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Style {
    Callback,
    Sequential,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let builder = Scheduler::builder();
    let scheduler = if args.real_time {
        builder.system_clock().build()
    } else {
        builder.virtual_clock().build()
    };
    let sink: Arc<dyn Sink> = Arc::new(Stdout);

    let run: fn(&Scheduler, Arc<dyn Sink>) = match (args.scenario, args.style) {
        (Scenario::FirstPromise, Style::Callback) => first_promise::callback::run,
        (Scenario::FirstPromise, Style::Sequential) => first_promise::sequential::run,
        (Scenario::GetData, Style::Callback) => get_data::callback::run,
        (Scenario::GetData, Style::Sequential) => get_data::sequential::run,
    };
    tracing::debug!(?args, "running scenario");
    run(&scheduler, sink);
    scheduler.run().context("scheduler did not finish")?;

    let unhandled = scheduler.unhandled_rejections();
    if !unhandled.is_empty() {
        bail!("{} unhandled rejection(s)", unhandled.len());
    }
    Ok(())
}
