#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use sonarstrike::{
    init_logging, run_duel, GuessResult, LineChannel, LogKind, NodeConfig, NodeHandle,
    Orientation, SessionNode, SessionSnapshot,
};

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Two simulated peers play each other over an in-memory medium.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 3000, help = "Discovery re-announce period in milliseconds")]
        announce_ms: u64,
        #[arg(long, default_value_t = 200, help = "Stop after this many shots in total")]
        max_shots: usize,
    },
    /// One peer whose channel is stdout (outgoing) and stdin lines starting with `U` (incoming).
    ///
    /// Other stdin lines are commands: start, join, fire X Y,
    /// place ID ROW COL H|V, random, status, quit.
    Stdio {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, default_value_t = 3000, help = "Discovery re-announce period in milliseconds")]
        announce_ms: u64,
    },
}

#[cfg(feature = "std")]
fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Local {
            seed,
            announce_ms,
            max_shots,
        } => {
            let seed = seed.unwrap_or_else(rand::random);
            eprintln!("Starting local game with seed {}...", seed);
            let config = NodeConfig::with_announce_interval(Duration::from_millis(announce_ms));
            let report = run_duel(config, seed, max_shots).await?;
            print_summary("Host", &report.host);
            print_summary("Joiner", &report.joiner);
            match report.winner {
                Some(tag) => println!("{} hit every enemy ship after {} shots", tag, report.shots),
                None => println!("No winner after {} shots", report.shots),
            }
        }
        Commands::Stdio { seed, announce_ms } => {
            let config = NodeConfig::with_announce_interval(Duration::from_millis(announce_ms));
            run_stdio(config, seeded_rng(seed)).await?;
        }
    }
    Ok(())
}

#[cfg(feature = "std")]
fn print_summary(role: &str, snapshot: &SessionSnapshot) {
    let hits = snapshot
        .shots_fired
        .iter()
        .filter(|(_, r)| r.is_hit())
        .count();
    let sinks: Vec<&str> = snapshot
        .shots_fired
        .iter()
        .filter_map(|(_, r)| match r {
            GuessResult::Sink(name) => Some(*name),
            _ => None,
        })
        .collect();
    println!(
        "{} {}: {} shots, {} hits, sunk [{}], state {}",
        role,
        snapshot.user,
        snapshot.shots_fired.len(),
        hits,
        sinks.join(", "),
        snapshot.state
    );
}

/// Inbound tokens are split off stdin and fed to the channel through an
/// in-process pipe, so the node sees a plain line reader.
#[cfg(feature = "std")]
async fn run_stdio(config: NodeConfig, rng: SmallRng) -> anyhow::Result<()> {
    let (mut pipe_in, pipe_out) = tokio::io::duplex(4096);
    let channel = LineChannel::new(BufReader::new(pipe_out), tokio::io::stdout());
    let observer = |text: &str, kind: LogKind| eprintln!("[{:?}] {}", kind, text);
    let (node, handle) = SessionNode::new(channel, observer, config, rng)?;
    eprintln!("You are {}. Type `start` to host or `join` to listen.", node.session().user());
    let node_task = tokio::spawn(node.run());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.starts_with('U') {
            pipe_in.write_all(line.as_bytes()).await?;
            pipe_in.write_all(b"\n").await?;
            continue;
        }
        match run_command(&handle, line).await {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => eprintln!("Error: {}", e),
        }
    }
    // Both a quit command and stdin EOF end up here; shutdown may already be done.
    let _ = handle.shutdown().await;
    node_task.await??;
    Ok(())
}

/// Returns `true` when the user asked to quit.
#[cfg(feature = "std")]
async fn run_command(handle: &NodeHandle, line: &str) -> anyhow::Result<bool> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => {}
        ["start"] => handle.start_new_game().await?,
        ["join"] => handle.join_game().await?,
        ["random"] => handle.randomize_fleet().await?,
        ["fire", x, y] => handle.fire_at(x.parse()?, y.parse()?).await?,
        ["place", id, row, col, o] => {
            let orientation = o
                .chars()
                .next()
                .and_then(|c| Orientation::from_char(c.to_ascii_uppercase()))
                .ok_or_else(|| anyhow::anyhow!("Orientation must be H or V"))?;
            handle
                .place_ship(id.parse()?, row.parse()?, col.parse()?, orientation)
                .await?
        }
        ["status"] => {
            let snapshot = handle.snapshot().await?;
            eprintln!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        ["quit"] => {
            handle.shutdown().await?;
            return Ok(true);
        }
        _ => eprintln!("Unknown command: {}", line),
    }
    Ok(false)
}
