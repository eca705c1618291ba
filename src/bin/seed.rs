use clap::Parser;
use game_reviews_lib::config::SeedConfig;

#[tokio::main]
async fn main() {
    let config = SeedConfig::parse();
    if let Err(e) = game_reviews_lib::run_seed(config).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
