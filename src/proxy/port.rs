//! Bind port selection.

use rand::Rng;

/// Lower bound of the ephemeral port range (inclusive).
pub const EPHEMERAL_PORT_MIN: u16 = 49152;

/// Upper bound of the ephemeral port range (exclusive).
pub const EPHEMERAL_PORT_MAX: u16 = 65535;

/// Picks the port for the next attempt after a bind failure.
pub trait PortSelector {
    /// Choose the next candidate port.
    fn next_port(&mut self) -> u16;
}

/// Uniformly random ports from `[EPHEMERAL_PORT_MIN, EPHEMERAL_PORT_MAX)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPortSelector;

impl PortSelector for RandomPortSelector {
    fn next_port(&mut self) -> u16 {
        rand::rng().random_range(EPHEMERAL_PORT_MIN..EPHEMERAL_PORT_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_ports_stay_in_range() {
        let mut selector = RandomPortSelector;
        for _ in 0..10_000 {
            let port = selector.next_port();
            assert!((EPHEMERAL_PORT_MIN..EPHEMERAL_PORT_MAX).contains(&port));
        }
    }

    #[test]
    fn test_random_ports_vary() {
        let mut selector = RandomPortSelector;
        let first = selector.next_port();
        assert!((0..64).any(|_| selector.next_port() != first));
    }
}
