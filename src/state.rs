// src/state.rs
//
// Byte encodings for the per-identifier window state. Both formats are
// plain ASCII and must stay bit-exact with data written by earlier
// deployments:
//
//   fixed window    "<count>:<window_start>"      e.g. "3:999000"
//   sliding window  "<ts>,<ts>,...,<ts>"          e.g. "999000,999500,1000000"

use crate::error::StorageError;
use std::str;

fn utf8(bytes: &[u8]) -> Result<&str, StorageError> {
    str::from_utf8(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

fn parse_int(field: &str, value: &str) -> Result<u64, StorageError> {
    value
        .parse::<u64>()
        .map_err(|e| StorageError::Serialization(format!("invalid {} {:?}: {}", field, value, e)))
}

/// Counter and anchor timestamp of a fixed window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWindowState {
    pub count: u64,
    pub window_start: u64,
}

impl FixedWindowState {
    /// State of an identifier with no recorded events
    pub fn empty(now: u64) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        format!("{}:{}", self.count, self.window_start).into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let text = utf8(bytes)?;
        let (count, window_start) = text.split_once(':').ok_or_else(|| {
            StorageError::Serialization(format!("fixed window state {:?} has no ':'", text))
        })?;

        Ok(Self {
            count: parse_int("count", count)?,
            window_start: parse_int("window start", window_start)?,
        })
    }

    /// Whether the window anchored at `window_start` has run out at `now`
    pub fn is_expired(&self, now: u64, duration_seconds: u64) -> bool {
        now.saturating_sub(self.window_start) > duration_seconds
    }

    /// Seconds of life left in the window at `now`
    pub fn reset_seconds(&self, now: u64, duration_seconds: u64) -> u64 {
        duration_seconds.saturating_sub(now.saturating_sub(self.window_start))
    }
}

/// Ordered timestamps of the accepted events of a sliding window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlidingWindowLog {
    timestamps: Vec<u64>,
}

impl SlidingWindowLog {
    pub fn new(timestamps: Vec<u64>) -> Self {
        Self { timestamps }
    }

    pub fn timestamps(&self) -> &[u64] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Oldest event still in the log
    pub fn oldest(&self) -> Option<u64> {
        self.timestamps.first().copied()
    }

    pub fn push(&mut self, timestamp: u64) {
        self.timestamps.push(timestamp);
    }

    /// Drops every timestamp at or before `now - duration_seconds`, keeping order
    pub fn prune(&mut self, now: u64, duration_seconds: u64) {
        // A window reaching back before the epoch keeps everything
        if let Some(window_start) = now.checked_sub(duration_seconds) {
            self.timestamps.retain(|&t| t > window_start);
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        self.timestamps
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",")
            .into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let text = utf8(bytes)?;
        if text.is_empty() {
            return Ok(Self::default());
        }

        let timestamps = text
            .split(',')
            .map(|part| parse_int("timestamp", part))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { timestamps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_state_wire_format() {
        let state = FixedWindowState::decode(b"3:999000").unwrap();
        assert_eq!(
            state,
            FixedWindowState {
                count: 3,
                window_start: 999000
            }
        );
        assert_eq!(state.encode(), b"3:999000".to_vec());
    }

    #[test]
    fn test_fixed_state_rejects_malformed_bytes() {
        let cases: [&[u8]; 6] = [b"", b"3", b"3:", b"a:1", b"1:2:3", b"\xff\xfe"];
        for raw in cases {
            assert!(
                FixedWindowState::decode(raw).is_err(),
                "{:?} should not decode",
                raw
            );
        }
    }

    #[test]
    fn test_fixed_state_expiry_and_reset() {
        let state = FixedWindowState {
            count: 2,
            window_start: 999000,
        };
        assert!(!state.is_expired(1000000, 3600));
        assert_eq!(state.reset_seconds(1000000, 3600), 2600);

        // Exactly at the boundary the window is still open
        assert!(!state.is_expired(1002600, 3600));
        assert_eq!(state.reset_seconds(1002600, 3600), 0);
        assert!(state.is_expired(1002601, 3600));
    }

    #[test]
    fn test_sliding_log_wire_format() {
        let log = SlidingWindowLog::decode(b"997000,999500,999900,1000000").unwrap();
        assert_eq!(log.timestamps(), &[997000, 999500, 999900, 1000000]);
        assert_eq!(log.encode(), b"997000,999500,999900,1000000".to_vec());

        assert!(SlidingWindowLog::decode(b"").unwrap().is_empty());
        assert!(SlidingWindowLog::decode(b"1,,2").is_err());
        assert!(SlidingWindowLog::decode(b"1,x").is_err());
    }

    #[test]
    fn test_prune_drops_boundary_and_older() {
        let mut log = SlidingWindowLog::new(vec![996000, 996400, 997000, 999500, 999900]);
        log.prune(1000000, 3600);
        assert_eq!(log.timestamps(), &[997000, 999500, 999900]);
        assert_eq!(log.oldest(), Some(997000));
    }

    #[test]
    fn test_prune_is_idempotent() {
        let mut log = SlidingWindowLog::new(vec![996000, 997000, 999500, 999900]);
        log.prune(1000000, 3600);
        let once = log.clone();
        log.prune(1000000, 3600);
        assert_eq!(log, once);
    }

    #[test]
    fn test_prune_near_epoch_keeps_everything() {
        let mut log = SlidingWindowLog::new(vec![0, 10, 20]);
        log.prune(30, 3600);
        assert_eq!(log.len(), 3);
    }
}
