mod legacy;
mod novus;

pub use legacy::LegacySolver;
pub use novus::NovusSolver;

use sha2::{Digest, Sha256};

/// Small deterministic "duration" in the 1..=50 ms range, derived from seed
/// and an algorithm tag so legacy/novus report plausible, distinct timings.
fn synthetic_time_ms(seed: &str, tag: &str) -> u64 {
    let mut digest = Sha256::new();
    digest.update(seed.as_bytes());
    digest.update(b"|");
    digest.update(tag.as_bytes());
    let hash = digest.finalize();
    1 + (hash[0] as u64 % 50)
}
