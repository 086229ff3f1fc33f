use clap::Parser;
use std::process::ExitCode;

use ovencraft::cli::{Cli, Commands};
use ovencraft::config::{get_config, init_config_from};
use ovencraft::runtime::modes;
use ovencraft::system::init_logging;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(cli.config.as_deref());
    let config = get_config();

    let command = cli.command_or_default();

    // guard 需要存活到进程结束，否则文件日志会丢失
    let _log_guard = if command == Commands::Serve {
        match init_logging(&config.logging) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Failed to initialize logging: {:#}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to build tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match command {
        Commands::Serve => match runtime.block_on(modes::run_server(config)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("Server exited with error: {:#}", e);
                eprintln!("Error: {:#}", e);
                ExitCode::FAILURE
            }
        },
        other => match runtime.block_on(modes::run_cli(other, &config)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e.format_colored());
                ExitCode::FAILURE
            }
        },
    }
}
