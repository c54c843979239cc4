use clap::Parser;
use colored::Colorize;

use portalkit::cli::{Cli, Commands, generate_config};
use portalkit::config::{get_config, init_config_from};
use portalkit::errors::PortalError;
use portalkit::runtime::run_server;
use portalkit::system::init_logging;

fn report_fatal(err: &anyhow::Error) {
    match err.downcast_ref::<PortalError>() {
        Some(portal_err) => eprintln!("{}", portal_err.format_colored()),
        None => eprintln!("{} {:#}", "[ERROR]".red().bold(), err),
    }
}

#[actix_web::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::GenerateConfig { output_path, force }) => generate_config(output_path, force),
        Some(Commands::Serve) | None => serve(&cli.config).await,
    };

    if let Err(e) = result {
        report_fatal(&e);
        std::process::exit(1);
    }
}

async fn serve(config_path: &str) -> anyhow::Result<()> {
    init_config_from(config_path);
    let config = get_config();

    // guard 必须存活到进程退出
    let _log_guard = init_logging(&config.logging)?;

    run_server().await
}
