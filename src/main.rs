#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = quizgen_rust::run().await {
        eprintln!("quizgen-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
