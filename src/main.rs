#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = classtest_rust::run().await {
        eprintln!("classtest-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
