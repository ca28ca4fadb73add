use std::env;
use std::process;

use clap::Parser;

use data_importer::config::ImportConfig;
use data_importer::fetch;

#[derive(Parser)]
#[command(version, about = "A single-shot object importer", long_about = None)]
struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase debug level (use -d for debug, -dd for trace, etc.)")]
    debug: u8,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli.debug {
        0 => {}
        1 => env::set_var("RUST_LOG", "debug"),
        _ => env::set_var("RUST_LOG", "trace"),
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting importer");
    let config = match ImportConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("main: unable to get env variables: {:#}", e);
            process::exit(1);
        }
    };

    match fetch::import(&config).await {
        Ok(_) => log::info!("Import complete, exiting"),
        Err(e) => {
            log::error!("main: {:#}", e);
            process::exit(1);
        }
    }
}
