//! Deterministic string collections for tests and benches.
//!
//! Uses a seeded ChaCha generator so fixtures are reproducible across runs
//! and platforms.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const VOCAB: &[&str] = &[
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima", "mike", "november", "oscar", "papa", "quebec", "romeo", "sierra", "tango",
];

/// Generate `count` pseudo-random word sequences of up to `max_words` words.
/// Repeated vocabulary keeps the collection partially similar, which is what
/// similarity measures want to see.
pub fn generate_strings(seed: u64, count: usize, max_words: usize) -> Vec<String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let words = rng.gen_range(1..=max_words.max(1));
            (0..words)
                .map(|_| VOCAB[rng.gen_range(0..VOCAB.len())])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

/// Generate `count` pseudo-random byte strings of up to `max_len` bytes over
/// a small alphabet.
pub fn generate_bytes(seed: u64, count: usize, max_len: usize) -> Vec<Vec<u8>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let len = rng.gen_range(0..=max_len);
            (0..len).map(|_| rng.gen_range(b'a'..=b'f')).collect()
        })
        .collect()
}
