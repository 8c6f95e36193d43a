use anyhow::Result;
use clap::Parser;
use is_it_fake::{
    cli::{self, Cli},
    config::ServiceConfig,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = ServiceConfig::log_level();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("is_it_fake={0},is_it_fake_preprocessing={0}", log_level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    cli::run(cli)
}
