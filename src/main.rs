#[tokio::main]
async fn main() -> anyhow::Result<()> {
    watchlist_tracker_lib::run().await?;
    Ok(())
}
