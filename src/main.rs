use std::path::PathBuf;

use anyhow::Context;
use instanced_mobile::{AppConfig, run};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::discover(path.as_deref()).inspect_err(|err| log::error!("{}", err))?;

    run(config)
        .inspect_err(|err| log::error!("{}", err))
        .context("instanced mobile exited with an error")
}
