use clap::Parser;
use game_reviews_lib::config::GamesConfig;

#[tokio::main]
async fn main() {
    let config = GamesConfig::parse();
    if let Err(e) = game_reviews_lib::run_games(config).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
