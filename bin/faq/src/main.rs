use clap::Parser;
use rootcause::prelude::Report;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};
use triage_faq::{Cli, FaqToolError, run};

fn main() -> Result<(), Report<FaqToolError>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    run(cli, &mut std::io::stdout().lock())
}
