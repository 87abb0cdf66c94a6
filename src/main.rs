use dotenvy::dotenv;

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = polling_app::start_server().await {
        eprintln!("Failed to start server: {}", e);
        std::process::exit(1);
    }
}
