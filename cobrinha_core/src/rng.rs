use hmac::{Hmac, Mac};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

// Randomness capability consumed by the board dealer.
// The provably-fair variant uses the classic construction:
// server_seed (secret) + client_seed + nonce -> HMAC-SHA256 -> bytes -> floats in [0,1)

pub type HmacSha256 = Hmac<Sha256>;

/// Source of uniform floats for mine placement.
///
/// `begin_round` runs once per round before any draws. Sources that key
/// their stream per round (nonce-based provably-fair streams) advance
/// there; plain entropy sources ignore it.
pub trait RandomSource: Send {
    fn begin_round(&mut self) {}

    /// Uniform float in [0, 1).
    fn next_float(&mut self) -> f64;
}

pub fn derive_hash_hex(input: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hex::encode(hasher.finalize())
}

/// OS-entropy source for live play.
pub struct EntropySource(StdRng);

impl Default for EntropySource {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl RandomSource for EntropySource {
    fn next_float(&mut self) -> f64 {
        self.0.gen()
    }
}

/// Deterministic ChaCha8 stream from a u64 seed, for tests and replayable
/// simulations.
pub struct SeededSource(ChaCha8Rng);

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for SeededSource {
    fn next_float(&mut self) -> f64 {
        self.0.gen()
    }
}

/// Provably-fair float stream.
///
/// The server seed is committed up front via its SHA-256 hash; each round
/// rekeys the stream as HMAC-SHA256(server_seed, "client_seed:nonce") with
/// the nonce bumped per round, so a finished round can be audited by
/// recomputing the layout from the revealed seeds.
pub struct FairSource {
    server_seed: String,
    client_seed: String,
    nonce: u64,
    buffer: Vec<u8>,
    pos: usize,
}

impl FairSource {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>) -> Self {
        Self {
            server_seed: server_seed.into(),
            client_seed: client_seed.into(),
            nonce: 0,
            buffer: Vec::new(),
            pos: 0,
        }
    }

    /// Stream positioned at a specific round, for auditing a finished one.
    pub fn at_nonce(
        server_seed: impl Into<String>,
        client_seed: impl Into<String>,
        nonce: u64,
    ) -> Self {
        let mut source = Self::new(server_seed, client_seed);
        source.nonce = nonce;
        source.rekey();
        source
    }

    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    fn rekey(&mut self) {
        let mut mac =
            HmacSha256::new_from_slice(self.server_seed.as_bytes()).expect("HMAC key");
        let msg = format!("{}:{}", self.client_seed, self.nonce);
        mac.update(msg.as_bytes());
        self.buffer = mac.finalize().into_bytes().to_vec();
        self.pos = 0;
    }
}

impl RandomSource for FairSource {
    fn begin_round(&mut self) {
        self.nonce += 1;
        self.rekey();
    }

    fn next_float(&mut self) -> f64 {
        if self.buffer.is_empty() {
            // drawing before any round: behave like round 1
            self.nonce = self.nonce.max(1);
            self.rekey();
        }
        if self.pos + 4 > self.buffer.len() {
            // extend the buffer deterministically by hashing the previous one
            self.buffer = Sha256::digest(&self.buffer).to_vec();
            self.pos = 0;
        }
        let chunk = &self.buffer[self.pos..self.pos + 4];
        self.pos += 4;
        let v = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        (v as f64) / (u32::MAX as f64 + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fair_stream_is_deterministic() {
        let mut a = FairSource::at_nonce("server", "client", 1);
        let mut b = FairSource::at_nonce("server", "client", 1);
        assert_eq!(a.server_seed_hash_hex(), b.server_seed_hash_hex());
        for _ in 0..64 {
            assert_eq!(a.next_float(), b.next_float());
        }
    }

    #[test]
    fn fair_stream_changes_per_round() {
        let mut a = FairSource::at_nonce("server", "client", 1);
        let mut b = FairSource::at_nonce("server", "client", 2);
        let first: Vec<f64> = (0..8).map(|_| a.next_float()).collect();
        let second: Vec<f64> = (0..8).map(|_| b.next_float()).collect();
        assert_ne!(first, second);
    }

    #[test]
    fn begin_round_matches_at_nonce() {
        let mut live = FairSource::new("server", "client");
        live.begin_round();
        live.begin_round();
        let mut audit = FairSource::at_nonce("server", "client", 2);
        for _ in 0..16 {
            assert_eq!(live.next_float(), audit.next_float());
        }
    }

    #[test]
    fn seeded_source_repeats() {
        let mut a = SeededSource::new(7);
        let mut b = SeededSource::new(7);
        for _ in 0..32 {
            assert_eq!(a.next_float(), b.next_float());
        }
    }

    #[test]
    fn floats_stay_in_unit_interval() {
        let mut entropy = EntropySource::default();
        let mut fair = FairSource::at_nonce("s", "c", 1);
        for _ in 0..256 {
            let e = entropy.next_float();
            let f = fair.next_float();
            assert!((0.0..1.0).contains(&e));
            assert!((0.0..1.0).contains(&f));
        }
    }
}
