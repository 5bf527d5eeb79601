use anyhow::Context;
use clap::Parser;
use lsmtune::config::Config;

/// compute nominal and robust lsm-tree tunings for an uncertain workload
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// path to the tuning configuration
    #[arg(default_value = "config/lsmtune.toml")]
    config: std::path::PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config).context("load configuration")?;
    lsmtune::init(config.filter()?);
    log::info!("starting app: {}", config.app.name);
    std::fs::create_dir_all(&config.app.data_dir).context("create data directory")?;
    for job in config.app.jobs.iter() {
        job.run(&config)?;
    }
    log::info!("finished");
    Ok(())
}
