use anyrun::cli;
use anyrun::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    cli::Cli::run().await
}
