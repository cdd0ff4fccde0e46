#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dasmock_rust::run().await {
        eprintln!("dasmock-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
