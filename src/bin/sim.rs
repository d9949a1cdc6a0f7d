use sonarstrike::{run_duel, NodeConfig};
use tokio::time::Duration;

const MAX_SHOTS: usize = 200;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <seed>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;

    let config = NodeConfig::with_announce_interval(Duration::from_millis(10));
    let report = run_duel(config, seed, MAX_SHOTS).await?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
