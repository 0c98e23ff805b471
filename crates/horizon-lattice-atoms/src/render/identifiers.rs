//! Short class name generation.

use crate::{Error, Result};

const ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const BASE: u32 = ALPHABET.len() as u32;

/// Deterministic generator of 1 to 3 letter class names.
///
/// Counter values map to `a`..`Z`, then `aa`..`ZZ`, then `aaa`..`ZZZ`.
/// Two generators starting at the same counter produce the same sequence,
/// which is what lets a client continue where the server stopped.
///
/// # Example
///
/// ```
/// use horizon_lattice_atoms::prelude::IdentifierGenerator;
///
/// let mut generator = IdentifierGenerator::starting_at(3);
/// assert_eq!(generator.next_identifier().unwrap(), "d");
/// assert_eq!(generator.current_count(), 4);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierGenerator {
    counter: u32,
}

impl IdentifierGenerator {
    /// Number of distinct identifiers.
    pub const CAPACITY: u32 = BASE + BASE * BASE + BASE * BASE * BASE;

    /// Create a generator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator continuing from a previous counter value.
    pub fn starting_at(counter: u32) -> Self {
        Self { counter }
    }

    /// Produce the next identifier.
    pub fn next_identifier(&mut self) -> Result<String> {
        let identifier = identifier_at(self.counter)?;
        self.counter += 1;
        Ok(identifier)
    }

    /// Number of identifiers produced so far, including the starting offset.
    pub fn current_count(&self) -> u32 {
        self.counter
    }

    /// Counter value that produces `identifier`, or `None` if no counter
    /// value does.
    pub fn counter_of(identifier: &str) -> Option<u32> {
        if identifier.is_empty() || identifier.len() > 3 {
            return None;
        }
        let mut n = 0;
        for byte in identifier.bytes() {
            let digit = ALPHABET.iter().position(|&letter| letter == byte)? as u32;
            n = n * BASE + digit + 1;
        }
        Some(n - 1)
    }
}

/// Bijective base-52 encoding of `counter`.
fn identifier_at(counter: u32) -> Result<String> {
    if counter >= IdentifierGenerator::CAPACITY {
        return Err(Error::IdentifiersExhausted(IdentifierGenerator::CAPACITY));
    }
    let mut n = counter + 1;
    let mut letters = Vec::with_capacity(3);
    while n > 0 {
        n -= 1;
        letters.push(char::from(ALPHABET[(n % BASE) as usize]));
        n /= BASE;
    }
    Ok(letters.into_iter().rev().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_boundaries() {
        assert_eq!(identifier_at(0).unwrap(), "a");
        assert_eq!(identifier_at(25).unwrap(), "z");
        assert_eq!(identifier_at(26).unwrap(), "A");
        assert_eq!(identifier_at(51).unwrap(), "Z");
        assert_eq!(identifier_at(52).unwrap(), "aa");
        assert_eq!(identifier_at(53).unwrap(), "ab");
        assert_eq!(identifier_at(52 + 52 * 52 - 1).unwrap(), "ZZ");
        assert_eq!(identifier_at(52 + 52 * 52).unwrap(), "aaa");
        assert_eq!(
            identifier_at(IdentifierGenerator::CAPACITY - 1).unwrap(),
            "ZZZ"
        );
    }

    #[test]
    fn seeded_generator_continues_sequence() {
        let mut unseeded = IdentifierGenerator::new();
        let skipped: Vec<_> = (0..60).map(|_| unseeded.next_identifier().unwrap()).collect();

        let mut seeded = IdentifierGenerator::starting_at(55);
        for expected in &skipped[55..] {
            assert_eq!(&seeded.next_identifier().unwrap(), expected);
        }
        assert_eq!(seeded.current_count(), unseeded.current_count());
    }

    #[test]
    fn identifiers_are_unique() {
        let mut generator = IdentifierGenerator::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..3000 {
            assert!(seen.insert(generator.next_identifier().unwrap()));
        }
    }

    #[test]
    fn exhaustion_is_an_error() {
        let mut generator = IdentifierGenerator::starting_at(IdentifierGenerator::CAPACITY - 1);
        assert_eq!(generator.next_identifier().unwrap(), "ZZZ");
        assert!(matches!(
            generator.next_identifier(),
            Err(Error::IdentifiersExhausted(_))
        ));
        assert_eq!(generator.current_count(), IdentifierGenerator::CAPACITY);
    }

    #[test]
    fn counter_of_inverts_the_sequence() {
        for counter in [0, 25, 26, 51, 52, 53, 2755, 2756, IdentifierGenerator::CAPACITY - 1] {
            let identifier = identifier_at(counter).unwrap();
            assert_eq!(IdentifierGenerator::counter_of(&identifier), Some(counter));
        }
        assert_eq!(IdentifierGenerator::counter_of(""), None);
        assert_eq!(IdentifierGenerator::counter_of("abcd"), None);
        assert_eq!(IdentifierGenerator::counter_of("a-b"), None);
    }
}
