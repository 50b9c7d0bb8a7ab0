use clap::Parser;

use storefront::cli::{self, Cli};
use storefront::logging::init_tracing;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing("info");

    if let Err(err) = cli::run(cli).await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
