use lambda_insights::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::main().await
}
