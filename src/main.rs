#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cmscore::app::run().await
}
