//! Snowflake ID Generator
//!
//! Time-ordered 63-bit ids for users, chats and messages.
//! Layout: 41 bits of milliseconds since the configured epoch, 10 bits of
//! machine id, 12 bits of per-millisecond sequence.

use chrono::Utc;
use parking_lot::Mutex;

/// Default epoch (2024-01-01T00:00:00.000Z)
pub const DEFAULT_EPOCH: u64 = 1_704_067_200_000;

const MACHINE_BITS: u64 = 10;
const SEQUENCE_BITS: u64 = 12;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const MACHINE_MASK: u64 = (1 << MACHINE_BITS) - 1;

#[derive(Debug, Default)]
struct State {
    last_timestamp: u64,
    sequence: u64,
}

/// Snowflake ID generator
#[derive(Debug)]
pub struct SnowflakeGenerator {
    machine_id: u64,
    epoch: u64,
    state: Mutex<State>,
}

impl SnowflakeGenerator {
    /// Create a new generator; the machine id is truncated to 10 bits.
    pub fn new(machine_id: u64, epoch: u64) -> Self {
        Self {
            machine_id: machine_id & MACHINE_MASK,
            epoch,
            state: Mutex::new(State::default()),
        }
    }

    /// Generate a new id. Ids from one generator are strictly increasing.
    pub fn generate(&self) -> i64 {
        let mut state = self.state.lock();
        let mut timestamp = self.current_timestamp().max(state.last_timestamp);

        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // Sequence exhausted for this millisecond; borrow the next one.
                timestamp += 1;
            }
        } else {
            state.sequence = 0;
        }
        state.last_timestamp = timestamp;

        let id = ((timestamp - self.epoch) << (MACHINE_BITS + SEQUENCE_BITS))
            | (self.machine_id << SEQUENCE_BITS)
            | state.sequence;

        id as i64
    }

    /// Extract the unix-millisecond timestamp embedded in an id
    pub fn timestamp_of(&self, snowflake: i64) -> u64 {
        ((snowflake as u64) >> (MACHINE_BITS + SEQUENCE_BITS)) + self.epoch
    }

    fn current_timestamp(&self) -> u64 {
        (Utc::now().timestamp_millis() as u64).max(self.epoch)
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(1, DEFAULT_EPOCH)
    }
}

/// Parse snowflake from its string form (ids travel as strings in JSON)
pub fn from_string(s: &str) -> Result<i64, std::num::ParseIntError> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_unique_and_increasing() {
        let gen = SnowflakeGenerator::default();
        let ids: Vec<i64> = (0..10_000).map(|_| gen.generate()).collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let gen = SnowflakeGenerator::new(3, DEFAULT_EPOCH);
        let before = Utc::now().timestamp_millis() as u64;
        let id = gen.generate();
        let ts = gen.timestamp_of(id);

        assert!(ts >= before);
        assert!(ts <= before + 1000);
    }

    #[test]
    fn test_concurrent_generation_has_no_collisions() {
        let gen = std::sync::Arc::new(SnowflakeGenerator::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gen = gen.clone();
                std::thread::spawn(move || (0..2_000).map(|_| gen.generate()).collect::<Vec<_>>())
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(all.insert(id), "duplicate id {id}");
            }
        }
    }
}
