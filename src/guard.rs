/// Issues increasing request tokens and tells fresh responses from stale ones.
///
/// A response is fresh only if no other request was issued after it. Tokens are
/// compared when the response is applied, not when it arrives, so overlapping
/// requests always resolve in favour of the last one issued.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequenceGuard {
  seq: u64,
}

impl SequenceGuard {
  pub fn new() -> Self {
    Self::default()
  }

  /// Bump the counter and return the token for a new request.
  pub fn issue(&mut self) -> u64 {
    self.seq += 1;
    self.seq
  }

  pub fn current(&self) -> u64 {
    self.seq
  }

  pub fn is_fresh(&self, token: u64) -> bool {
    token == self.seq
  }
}
