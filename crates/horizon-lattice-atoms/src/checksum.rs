//! Stable, non-cryptographic content hashing.
//!
//! Used for content-derived rule ids and for the checksum embedded in
//! serialized renderer state. The output must be identical across
//! processes and targets (server and client), so `std`'s randomly keyed
//! hashers are not an option here.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Incremental 64-bit FNV-1a hasher.
#[derive(Debug, Clone, Copy)]
pub struct ContentHasher {
    state: u64,
}

impl ContentHasher {
    /// Create a hasher at the FNV offset basis.
    pub fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    /// Feed raw bytes.
    pub fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= u64::from(*byte);
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }

    /// Feed a string followed by a terminator so that `("ab", "c")` and
    /// `("a", "bc")` hash differently.
    pub fn write_str(&mut self, value: &str) {
        self.write(value.as_bytes());
        self.write(&[0xff]);
    }

    /// Feed a single tag byte.
    pub fn write_tag(&mut self, tag: u8) {
        self.write(&[tag]);
    }

    /// Feed a length, always as 8 little-endian bytes.
    pub fn write_len(&mut self, len: usize) {
        self.write(&(len as u64).to_le_bytes());
    }

    /// Feed a float by its bit pattern.
    pub fn write_f64(&mut self, value: f64) {
        self.write(&value.to_bits().to_le_bytes());
    }

    /// Current hash value.
    pub fn finish(&self) -> u64 {
        self.state
    }

    /// Current hash value as 16 lowercase hex digits.
    pub fn finish_hex(&self) -> String {
        format!("{:016x}", self.state)
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Checksum of a rendered stylesheet text.
pub fn checksum(text: &str) -> String {
    let mut hasher = ContentHasher::new();
    hasher.write(text.as_bytes());
    hasher.finish_hex()
}
