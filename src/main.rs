#[tokio::main]
async fn main() {
    if let Err(e) = pegged_supply::cli::run().await {
        eprintln!("{}", pegged_supply::cli::error_banner(&e));
        std::process::exit(1);
    }
}
