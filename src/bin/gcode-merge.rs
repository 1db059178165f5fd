use anyhow::Result;
use gcode_merge::config::Config;
use gcode_merge::workspace;

fn main() -> Result<()> {
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    workspace::run(&config)
}
