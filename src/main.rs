use clap::Parser;
use daily_reporter::{run, Cli};
use env_logger::Builder;
use log::LevelFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.into())?;
    run(cli)?;
    Ok(())
}

fn init_logging(level: LevelFilter) -> anyhow::Result<()> {
    Builder::new().filter(None, level).try_init()?;
    Ok(())
}
