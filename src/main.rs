#[tokio::main]
async fn main() -> anyhow::Result<()> {
    restobar::bootstrapper::run().await
}
