#[tokio::main]
async fn main() -> anyhow::Result<()> {
    humanizer_lib::run().await
}
