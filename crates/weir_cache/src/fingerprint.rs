//! Structural fingerprinting of chain configurations.
//!
//! A fingerprint captures what a chain *is* without running it: how many
//! links it has, a digest of every unit's configuration state, a
//! human-readable dump, and the newest source modification time. The digest
//! half of every cache key comes from here: two structurally identical chains
//! produce the same digest, and any configuration change partitions the key
//! space.

use std::time::UNIX_EPOCH;

use weir_common::Digest;
use weir_flow::{Chain, Link, Unit, Value};

use crate::codec;

/// A derived, immutable snapshot of a chain's identity.
#[derive(Debug, Clone)]
pub struct ChainFingerprint {
    /// Number of top-level links in the chain. Used as a cheap staleness
    /// probe: the engine recomputes the fingerprint only when this changes.
    pub unit_count: usize,

    /// Digest over a recursive structural dump of every unit's state.
    pub structural_hash: Digest,

    /// Human-readable concatenation of link representations. Diagnostic
    /// only, never part of a key.
    pub chain_repr: String,

    /// Newest source modification time among the chain's units, in seconds
    /// since the epoch; `0.0` when unresolvable.
    pub chain_mtime: f64,
}

impl ChainFingerprint {
    /// Computes the fingerprint of a chain.
    ///
    /// Never fails: unit state that cannot be serialized, and nesting levels
    /// beyond `max_depth`, contribute nothing to the digest. The hash is a
    /// best-effort structural identity, not a commitment to full chain
    /// semantics.
    pub fn compute(chain: &Chain, max_depth: usize) -> Self {
        let mut dump = Vec::new();
        dump_links(chain.links(), 0, max_depth, &mut dump);

        Self {
            unit_count: chain.len(),
            structural_hash: Digest::from_bytes(&dump),
            chain_repr: links_repr(chain.links()),
            chain_mtime: links_mtime(chain.links()),
        }
    }
}

/// Appends the structural dump of a slice of links to `out`.
fn dump_links(links: &[Link], depth: usize, max_depth: usize, out: &mut Vec<u8>) {
    if depth > max_depth {
        return;
    }
    for link in links {
        match link {
            Link::Chain(chain) => dump_links(chain.links(), depth + 1, max_depth, out),
            Link::Unit { type_name, unit } => {
                out.extend_from_slice(type_name.as_bytes());
                if let Some(name) = unit.name() {
                    out.extend_from_slice(name.as_bytes());
                }
                dump_value(&unit.state(), depth + 1, max_depth, out);
            }
            Link::Func { repr, .. } => {
                out.extend_from_slice(b"fn");
                out.extend_from_slice(repr.as_bytes());
            }
        }
    }
}

/// Appends the structural dump of a state value to `out`.
///
/// Map keys are visited in sorted order and list elements in index order,
/// each index contributing its decimal form so reordering changes the dump.
fn dump_value(value: &Value, depth: usize, max_depth: usize, out: &mut Vec<u8>) {
    if depth > max_depth {
        return;
    }
    match value {
        Value::Map(map) => {
            for (key, item) in map {
                out.extend_from_slice(key.as_bytes());
                dump_value(item, depth + 1, max_depth, out);
            }
        }
        Value::List(items) => {
            for (index, item) in items.iter().enumerate() {
                out.extend_from_slice(index.to_string().as_bytes());
                dump_value(item, depth + 1, max_depth, out);
            }
        }
        leaf => {
            // Unserializable leaves degrade fidelity silently.
            if let Ok(bytes) = codec::encode(leaf) {
                out.extend_from_slice(&bytes);
            }
        }
    }
}

/// Returns the newest source modification time across the links.
///
/// Sub-chains are visited recursively; plain callables contribute nothing
/// (their defining-file time is unreliable).
fn links_mtime(links: &[Link]) -> f64 {
    let mut newest = 0.0f64;
    for link in links {
        let mtime = match link {
            Link::Chain(chain) => links_mtime(chain.links()),
            Link::Unit { unit, .. } => unit.source_path().map_or(0.0, source_mtime),
            Link::Func { .. } => 0.0,
        };
        if mtime > newest {
            newest = mtime;
        }
    }
    newest
}

/// Modification time of a source file in seconds since the epoch, or `0.0`
/// if it cannot be resolved.
fn source_mtime(path: &str) -> f64 {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0.0, |d| d.as_secs_f64())
}

/// Builds the space-joined diagnostic representation of the links.
fn links_repr(links: &[Link]) -> String {
    let mut parts = Vec::new();
    for link in links {
        match link {
            Link::Chain(chain) => parts.push(links_repr(chain.links())),
            Link::Unit { type_name, unit } => {
                parts.push((*type_name).to_string());
                parts.push(state_repr(unit.as_ref()));
            }
            Link::Func { repr, .. } => parts.push(repr.clone()),
        }
    }
    parts.join(" ")
}

fn state_repr(unit: &dyn Unit) -> String {
    serde_json::to_string(&unit.state()).unwrap_or_else(|_| "<unprintable>".to_string())
}
