//! Binder configuration.

/// Largest body the binder reads by default: 10 MiB.
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Settings threaded into a [`Binder`](super::Binder) when it is built.
///
/// ```rust
/// use tsu_binding::binding::Config;
///
/// let config = Config::default().max_body_size(64 * 1024);
/// assert_eq!(config.body_limit(), 64 * 1024);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Config {
    max_body_size: usize,
}

impl Config {
    /// Caps how many body bytes a binding attempt reads. Longer bodies are
    /// rejected with a `ReaderError`.
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    pub fn body_limit(&self) -> usize {
        self.max_body_size
    }
}

impl Default for Config {
    fn default() -> Self {
        Self { max_body_size: DEFAULT_MAX_BODY_SIZE }
    }
}
