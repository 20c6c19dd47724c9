//! The persisted cache entry.

use serde::{Deserialize, Serialize};
use weir_flow::Record;

/// One persisted processing outcome, stored as a single flat file named by
/// its cache key.
///
/// Created on a miss, read on a hit, and deleted only when found corrupted
/// during a read. A changed chain produces a disjoint key space, so an entry
/// never holds more than one chain's result; entries for retired chains
/// become orphans (cache growth is managed externally).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The record's contents after chain processing.
    pub data: Record,

    /// Whether the chain halted early instead of completing normally.
    pub stopped: bool,

    /// The chain's textual representation at write time. Diagnostic only.
    pub chain_repr: String,

    /// The chain's newest source modification time at write time, in seconds
    /// since the epoch. Compared on hits for a staleness warning; never used
    /// for invalidation.
    pub chain_mtime: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use weir_flow::Value;

    #[test]
    fn codec_roundtrip() {
        let mut data = Record::new();
        data.insert("id", "item-1");
        data.insert("score", 0.25f64);
        data.insert("tags", vec![Value::from("a"), Value::from("b")]);

        let entry = CacheEntry {
            data: data.clone(),
            stopped: false,
            chain_repr: "Tokenize {\"lowercase\":true}".to_string(),
            chain_mtime: 1700000000.5,
        };

        let bytes = codec::encode(&entry).unwrap();
        let back: CacheEntry = codec::decode(&bytes).unwrap();
        assert_eq!(back.data, data);
        assert!(!back.stopped);
        assert_eq!(back.chain_repr, entry.chain_repr);
        assert_eq!(back.chain_mtime, entry.chain_mtime);
    }

    #[test]
    fn stopped_flag_survives_roundtrip() {
        let entry = CacheEntry {
            data: Record::new(),
            stopped: true,
            chain_repr: String::new(),
            chain_mtime: 0.0,
        };
        let bytes = codec::encode(&entry).unwrap();
        let back: CacheEntry = codec::decode(&bytes).unwrap();
        assert!(back.stopped);
    }
}
