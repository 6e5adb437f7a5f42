#[tokio::main]
async fn main() -> anyhow::Result<()> {
    memory_cards_backend::run().await
}
