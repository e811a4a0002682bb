use clap::Parser as _;
use decaf_drv::{log_level, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_level(log_level(cli.verbose))
        .init()
        .expect("logger can only be initialized once");

    let code = run(&cli)?;
    std::process::exit(code)
}
