use clap::Parser;
use game_reviews_lib::config::NewslettersConfig;

#[tokio::main]
async fn main() {
    let config = NewslettersConfig::parse();
    if let Err(e) = game_reviews_lib::run_newsletters(config).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
