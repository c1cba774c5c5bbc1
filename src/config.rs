//! Server configuration, assembled from the command line (see `cli`).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;

/// Presentation delays before a race move is committed, mirroring the
/// client's piece animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceTiming {
    /// Plain move
    pub step_delay: Duration,
    /// Move that lands on a ladder or chute
    pub jump_delay: Duration,
}

impl RaceTiming {
    pub const DEFAULT_STEP_MS: u64 = 800;
    pub const DEFAULT_JUMP_MS: u64 = 1500;

    pub fn from_millis(step_ms: u64, jump_ms: u64) -> Self {
        Self {
            step_delay: Duration::from_millis(step_ms),
            jump_delay: Duration::from_millis(jump_ms),
        }
    }
}

impl Default for RaceTiming {
    fn default() -> Self {
        Self::from_millis(Self::DEFAULT_STEP_MS, Self::DEFAULT_JUMP_MS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub race: RaceTiming,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            race: RaceTiming::default(),
        }
    }
}
