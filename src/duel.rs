#![cfg(feature = "std")]

//! Two simulated peers sharing one in-memory medium, firing at random until
//! one of them has hit every opponent ship cell.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::time::{sleep, timeout, Duration};

use crate::channel::InMemoryMedium;
use crate::config::{NodeConfig, BOARD_SIZE};
use crate::identity::Tag;
use crate::node::{NodeHandle, SessionNode};
use crate::observer::LogObserver;
use crate::session::{GameState, SessionSnapshot};

const POLL: Duration = Duration::from_millis(5);
/// Announce periods a joiner may wait before the handshake counts as failed.
const HANDSHAKE_PERIODS: u32 = 10;
const TURN_TIMEOUT: Duration = Duration::from_secs(5);

/// Final state of both peers.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DuelReport {
    pub host: SessionSnapshot,
    pub joiner: SessionSnapshot,
    pub shots: usize,
    /// User tag of the peer that hit every opponent ship cell first.
    pub winner: Option<Tag>,
}

/// Play one game. `seed` fixes both fleets, both tags and every target pick.
/// Stops after `max_shots` shots in total if nobody has won by then.
pub async fn run_duel(
    config: NodeConfig,
    seed: u64,
    max_shots: usize,
) -> anyhow::Result<DuelReport> {
    let medium = InMemoryMedium::new();
    let (host_node, host) = SessionNode::new(
        medium.attach(),
        LogObserver,
        config,
        SmallRng::seed_from_u64(seed),
    )?;
    let (joiner_node, joiner) = SessionNode::new(
        medium.attach(),
        LogObserver,
        config,
        SmallRng::seed_from_u64(seed.wrapping_add(1)),
    )?;
    let host_task = tokio::spawn(host_node.run());
    let joiner_task = tokio::spawn(joiner_node.run());

    joiner.join_game().await?;
    host.start_new_game().await?;

    let handshake = config.announce_interval * HANDSHAKE_PERIODS;
    wait_for(&host, handshake, |s| s.state == GameState::Playing).await?;
    wait_for(&joiner, handshake, |s| s.state == GameState::Playing).await?;
    log::info!("[Duel] both peers playing");

    let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(2));
    let mut shots = 0;
    let mut winner = None;
    while shots < max_shots && winner.is_none() {
        let (shooter, target) = if host.snapshot().await?.my_turn {
            (&host, &joiner)
        } else {
            (&joiner, &host)
        };
        let before = shooter.snapshot().await?;
        let (x, y) = pick_target(&mut rng, &before)
            .ok_or_else(|| anyhow::anyhow!("No untried cells left for {}", before.user))?;
        shooter.fire_at(x, y).await?;
        shots += 1;
        wait_for(target, TURN_TIMEOUT, |s| s.my_turn).await?;

        let after = shooter.snapshot().await?;
        if after.standing.opponent_fleet_destroyed {
            winner = Some(after.user);
        }
    }

    let report = DuelReport {
        host: host.snapshot().await?,
        joiner: joiner.snapshot().await?,
        shots,
        winner,
    };
    host.shutdown().await?;
    joiner.shutdown().await?;
    host_task.await??;
    joiner_task.await??;
    Ok(report)
}

/// Uniformly chosen cell this peer has not fired at yet, as `(x, y)`.
fn pick_target<R: Rng>(rng: &mut R, snapshot: &SessionSnapshot) -> Option<(u8, u8)> {
    let untried: Vec<(u8, u8)> = (0..BOARD_SIZE)
        .flat_map(|y| (0..BOARD_SIZE).map(move |x| (x, y)))
        .filter(|&(x, y)| !snapshot.shots_fired.iter().any(|(c, _)| c.x == x && c.y == y))
        .collect();
    if untried.is_empty() {
        return None;
    }
    Some(untried[rng.random_range(0..untried.len())])
}

async fn wait_for<F>(handle: &NodeHandle, limit: Duration, done: F) -> anyhow::Result<()>
where
    F: Fn(&SessionSnapshot) -> bool,
{
    timeout(limit, async {
        loop {
            if done(&handle.snapshot().await?) {
                return Ok::<(), anyhow::Error>(());
            }
            sleep(POLL).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("Timed out after {:?}", limit))?
}
