/* src/server/core/rust/src/nonce.rs */

use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Action name bound into reset tokens.
pub const RESET_ACTION: &str = "flu_reset_progress";

const NONCE_LEN: usize = 10;

/// Time-windowed tokens for state-changing requests.
///
/// Time is cut into ticks of half the lifetime; a token is accepted during
/// the tick it was issued in and the one after.
#[derive(Clone)]
pub struct NonceKeeper {
  secret: String,
  lifetime_secs: u64,
}

impl std::fmt::Debug for NonceKeeper {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("NonceKeeper").field("lifetime_secs", &self.lifetime_secs).finish_non_exhaustive()
  }
}

impl NonceKeeper {
  pub fn new(secret: impl Into<String>, lifetime_secs: u64) -> Self {
    Self { secret: secret.into(), lifetime_secs: lifetime_secs.max(2) }
  }

  fn tick(&self, now: SystemTime) -> u64 {
    let secs = now.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or_default();
    secs / (self.lifetime_secs / 2)
  }

  fn digest(&self, action: &str, tick: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tick.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(action.as_bytes());
    hasher.update(b"|");
    hasher.update(self.secret.as_bytes());
    let mut token = hex::encode(hasher.finalize());
    token.truncate(NONCE_LEN);
    token
  }

  pub fn create(&self, action: &str, now: SystemTime) -> String {
    self.digest(action, self.tick(now))
  }

  pub fn verify(&self, action: &str, nonce: &str, now: SystemTime) -> bool {
    if nonce.len() != NONCE_LEN {
      return false;
    }
    let tick = self.tick(now);
    [Some(tick), tick.checked_sub(1)]
      .into_iter()
      .flatten()
      .any(|t| constant_time_eq(self.digest(action, t).as_bytes(), nonce.as_bytes()))
  }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
  a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
