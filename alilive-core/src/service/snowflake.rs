//! Snowflake stream-name generator
//!
//! Produces 63-bit, time-ordered ids laid out as
//! `| 41 bits millis since epoch | 10 bits node | 12 bits sequence |`.
//!
//! The node id comes from the deployment machine: the last dotted segment of
//! its IPv4 address, so two machines in the same /24 never collide.
//!
//! Time is read from a monotonic clock anchored at construction, so ids keep
//! increasing even if the wall clock is stepped backwards.

use chrono::Utc;
use parking_lot::Mutex;
use std::time::Instant;
use tracing::info;

use crate::{Error, Result};

/// Snowflake epoch: 2010-11-04T01:42:54.657Z
pub const EPOCH_MILLIS: i64 = 1_288_834_974_657;
pub const NODE_BITS: u8 = 10;
pub const SEQUENCE_BITS: u8 = 12;
pub const MAX_NODE: i64 = (1 << NODE_BITS) - 1;

const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;
const NODE_SHIFT: u8 = SEQUENCE_BITS;
const TIME_SHIFT: u8 = NODE_BITS + SEQUENCE_BITS;

/// A generated snowflake id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnowflakeId(i64);

impl SnowflakeId {
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        self.0
    }

    /// Unix milliseconds at which the id was generated
    #[must_use]
    pub const fn timestamp_millis(self) -> i64 {
        (self.0 >> TIME_SHIFT) + EPOCH_MILLIS
    }

    #[must_use]
    pub const fn node(self) -> i64 {
        (self.0 >> NODE_SHIFT) & MAX_NODE
    }

    #[must_use]
    pub const fn sequence(self) -> i64 {
        self.0 & SEQUENCE_MASK
    }
}

impl std::fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct State {
    last_millis: i64,
    sequence: i64,
}

/// Thread-safe snowflake generator for one node
#[derive(Debug)]
pub struct SnowflakeNode {
    node: i64,
    anchor: Instant,
    anchor_millis: i64,
    state: Mutex<State>,
}

impl SnowflakeNode {
    /// Create a generator for `node`, which must be within `0..=MAX_NODE`
    pub fn new(node: i64) -> Result<Self> {
        if !(0..=MAX_NODE).contains(&node) {
            return Err(Error::InvalidNodeId {
                node,
                max: MAX_NODE,
            });
        }

        info!(node, "Snowflake generator initialized");

        Ok(Self {
            node,
            anchor: Instant::now(),
            anchor_millis: Utc::now().timestamp_millis() - EPOCH_MILLIS,
            state: Mutex::new(State {
                last_millis: -1,
                sequence: 0,
            }),
        })
    }

    /// Create a generator whose node id is the last segment of `machine_ip`
    ///
    /// `"192.168.1.23"` yields node 23.
    pub fn from_machine_ip(machine_ip: &str) -> Result<Self> {
        let last = machine_ip.rsplit('.').next().unwrap_or_default().trim();
        let node = last
            .parse::<i64>()
            .map_err(|_| Error::InvalidMachineIp(machine_ip.to_string()))?;
        Self::new(node)
    }

    #[must_use]
    pub const fn node_id(&self) -> i64 {
        self.node
    }

    /// Generate the next id; strictly greater than every id this node returned before
    pub fn generate(&self) -> SnowflakeId {
        let mut state = self.state.lock();

        let mut now = self.elapsed_millis();
        if now <= state.last_millis {
            now = state.last_millis;
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // sequence exhausted for this millisecond
                while now <= state.last_millis {
                    std::hint::spin_loop();
                    now = self.elapsed_millis();
                }
            }
        } else {
            state.sequence = 0;
        }
        state.last_millis = now;

        SnowflakeId((now << TIME_SHIFT) | (self.node << NODE_SHIFT) | state.sequence)
    }

    fn elapsed_millis(&self) -> i64 {
        let elapsed = i64::try_from(self.anchor.elapsed().as_millis()).unwrap_or(i64::MAX / 2);
        self.anchor_millis + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_node_range() {
        assert!(SnowflakeNode::new(0).is_ok());
        assert!(SnowflakeNode::new(MAX_NODE).is_ok());
        assert!(matches!(
            SnowflakeNode::new(MAX_NODE + 1),
            Err(Error::InvalidNodeId { node: 1024, max: 1023 })
        ));
        assert!(SnowflakeNode::new(-1).is_err());
    }

    #[test]
    fn test_from_machine_ip() {
        assert_eq!(SnowflakeNode::from_machine_ip("127.0.0.1").unwrap().node_id(), 1);
        assert_eq!(
            SnowflakeNode::from_machine_ip("10.20.30.255").unwrap().node_id(),
            255
        );

        assert!(matches!(
            SnowflakeNode::from_machine_ip("localhost"),
            Err(Error::InvalidMachineIp(_))
        ));
        assert!(matches!(
            SnowflakeNode::from_machine_ip(""),
            Err(Error::InvalidMachineIp(_))
        ));
        assert!(matches!(
            SnowflakeNode::from_machine_ip("10.0.0.4096"),
            Err(Error::InvalidNodeId { node: 4096, .. })
        ));
    }

    #[test]
    fn test_ids_strictly_increase() {
        let node = SnowflakeNode::new(7).unwrap();
        let mut last = node.generate();
        // more than one millisecond worth of sequence numbers
        for _ in 0..10_000 {
            let next = node.generate();
            assert!(next > last, "{next} should be greater than {last}");
            last = next;
        }
    }

    #[test]
    fn test_id_layout() {
        let node = SnowflakeNode::new(42).unwrap();
        let before = Utc::now().timestamp_millis();
        let id = node.generate();
        let after = Utc::now().timestamp_millis();

        assert_eq!(id.node(), 42);
        assert_eq!(id.sequence(), 0);
        // monotonic anchor may lag the wall clock by a millisecond
        assert!(id.timestamp_millis() >= before - 1);
        assert!(id.timestamp_millis() <= after + 1);
        assert!(id.as_i64() > 0);
        assert_eq!(id.to_string(), id.as_i64().to_string());
    }

    #[test]
    fn test_concurrent_generation_is_unique() {
        let node = Arc::new(SnowflakeNode::new(3).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let node = Arc::clone(&node);
                std::thread::spawn(move || {
                    let ids: Vec<_> = (0..2_000).map(|_| node.generate()).collect();
                    assert!(ids.windows(2).all(|w| w[0] < w[1]));
                    ids
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 16_000);
    }
}
