use json_reify::cli;
use tracing_subscriber::EnvFilter;

/// `JSON_REIFY_LOG` wins over the level picked by `--verbose`/`--quiet`.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_env("JSON_REIFY_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let command_line_interface = cli::CommandLineInterface::load();
    init_tracing(command_line_interface.log_level());
    command_line_interface.run()
}
