//! Machine identifiers and the generators that mint them.

use serde::{Deserialize, Serialize};

/// Default length of generated identifiers.
pub const DEFAULT_ID_LENGTH: usize = 6;

const ALPHABET: &[u8; 16] = b"0123456789abcdef";

/// Opaque identifier of a machine instance. Stable for the instance's
/// lifetime and unique within its production site.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MachineId(pub String);

impl MachineId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MachineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh opaque identifier strings.
pub trait IdGenerator {
    /// Produce a new identifier of `len` characters.
    fn new_id(&mut self, len: usize) -> String;
}

/// Lowercase-hex identifiers drawn from a SplitMix64 stream.
///
/// Seeded explicitly so tests are reproducible; [`RandomIdGenerator::from_entropy`]
/// seeds from the system clock for interactive use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomIdGenerator {
    state: u64,
}

impl RandomIdGenerator {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::new(nanos ^ u64::from(std::process::id()).rotate_left(32))
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn new_id(&mut self, len: usize) -> String {
        let mut out = String::with_capacity(len);
        let mut bits = 0u64;
        let mut remaining = 0;
        for _ in 0..len {
            if remaining == 0 {
                bits = self.next_u64();
                remaining = 16;
            }
            out.push(ALPHABET[(bits & 0xF) as usize] as char);
            bits >>= 4;
            remaining -= 1;
        }
        out
    }
}
