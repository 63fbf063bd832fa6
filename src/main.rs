use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    if let Err(error) = subscription_lifecycle::observability::init_observability("subscriptions")
    {
        eprintln!("Failed to initialise logging: {}", error);
        std::process::exit(1);
    }

    if let Err(error) = subscription_lifecycle::run().await {
        error!("Subscription service exited with error: {}", error);
        std::process::exit(1);
    }
}
