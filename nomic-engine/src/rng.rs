//! Deterministic RNG streams for the famine simulation and command rolls.

use std::cell::{RefCell, RefMut};

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

/// Deterministic bundle of RNG streams segregated by game domain.
///
/// Farm production and starvation depletion draw from independent streams,
/// so one consuming more rolls cannot shift the other between runs.
/// Player-facing command rolls get a ChaCha stream of their own.
#[derive(Debug, Clone)]
pub struct RngBundle {
    production: RefCell<CountingRng<SmallRng>>,
    depletion: RefCell<CountingRng<SmallRng>>,
    command: RefCell<CountingRng<ChaCha20Rng>>,
}

impl RngBundle {
    /// Builds the bundle from a caller-chosen seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        let production = SmallRng::seed_from_u64(stream_seed(seed, b"production"));
        let depletion = SmallRng::seed_from_u64(stream_seed(seed, b"depletion"));
        let command = ChaCha20Rng::seed_from_u64(stream_seed(seed, b"command"));
        Self {
            production: RefCell::new(CountingRng::new(production)),
            depletion: RefCell::new(CountingRng::new(depletion)),
            command: RefCell::new(CountingRng::new(command)),
        }
    }

    /// Construct the bundle from an OS-sourced seed.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::from_user_seed(rand::random())
    }

    /// Access the farm-production RNG stream.
    #[must_use]
    pub fn production(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.production.borrow_mut()
    }

    /// Access the starvation-depletion RNG stream.
    #[must_use]
    pub fn depletion(&self) -> RefMut<'_, CountingRng<SmallRng>> {
        self.depletion.borrow_mut()
    }

    /// Access the command-roll RNG stream.
    #[must_use]
    pub fn command(&self) -> RefMut<'_, CountingRng<ChaCha20Rng>> {
        self.command.borrow_mut()
    }
}

/// RNG wrapper that counts how many draws a stream has served.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl<R: rand::RngCore> CountingRng<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, draws: 0 }
    }

    /// Draws served by this stream so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

fn stream_seed(base: u64, domain: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&base.to_le_bytes()).expect("hmac accepts any key length");
    mac.update(domain);
    let digest = mac.finalize().into_bytes();
    let bytes: [u8; 8] = digest[..8].try_into().expect("sha-256 digest holds eight bytes");
    u64::from_le_bytes(bytes)
}
