use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    octo_acp::cli::run_cli().await
}
