#[tokio::main]
async fn main() -> anyhow::Result<()> {
    webook_lib::run().await
}
