use core::time::Duration;

use crate::ship::ShipType;

pub const BOARD_SIZE: u8 = 10;
pub const NUM_SHIPS: usize = 5;
pub const SHIPS: [ShipType; NUM_SHIPS] = [
    ShipType::new("Carrier", 5),
    ShipType::new("Battleship", 4),
    ShipType::new("Cruiser", 3),
    ShipType::new("Submarine", 3),
    ShipType::new("Destroyer", 2),
];

/// Total number of ship segments in the fleet.
pub const TOTAL_SHIP_CELLS: usize = 5 + 4 + 3 + 3 + 2;

/// Width of user tags and game ids on the wire.
pub const TAG_LEN: usize = 2;

/// Characters drawn from when generating a tag.
pub const TAG_ALPHABET: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Rejection-sampling draws before the placement search goes exhaustive.
pub const PLACEMENT_ATTEMPTS: usize = 100;

/// How often a hosted game re-announces itself while waiting for a peer.
pub const DEFAULT_ANNOUNCE_INTERVAL: Duration = Duration::from_secs(3);

/// Runtime knobs for a session node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeConfig {
    pub announce_interval: Duration,
    pub placement_attempts: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            announce_interval: DEFAULT_ANNOUNCE_INTERVAL,
            placement_attempts: PLACEMENT_ATTEMPTS,
        }
    }
}

impl NodeConfig {
    /// Config with a custom announce interval, clamped to at least 1 ms.
    pub fn with_announce_interval(interval: Duration) -> Self {
        Self {
            announce_interval: interval.max(Duration::from_millis(1)),
            ..Self::default()
        }
    }
}
