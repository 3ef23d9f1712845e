//! Coder configuration.

use crate::error::{Error, Result};

/// Longest supported code. Page keys carry the bit offset in the top byte
/// of a `u64`, leaving 56 bits for the prefix.
pub const MAX_CODE_LEN: u32 = 56;

/// Bits consumed per multi-level page.
pub const PAGE_BITS: u32 = 8;

/// Slots per multi-level page.
pub const PAGE_SIZE: usize = 1 << PAGE_BITS;

/// Largest window an explicitly requested flat table may allocate.
pub const FLAT_MAX_BITS: u32 = 24;

/// Default `Auto` cut-over between flat and multi-level tables.
pub const DEFAULT_FLAT_LIMIT: u32 = 12;

/// Decode table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStrategy {
    /// Flat when the deepest code fits `flat_limit`, multi-level otherwise.
    #[default]
    Auto,
    /// One entry per `2^max_len` window value.
    Flat,
    /// Chained 256-entry pages, one per consumed byte.
    MultiLevel,
}

/// Configuration for a [`HuffCoder`](crate::HuffCoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoderConfig {
    /// Number of symbols in the alphabet.
    pub capacity: usize,
    /// Decode table layout.
    pub strategy: TableStrategy,
    /// `Auto` uses a flat table up to this code length.
    pub flat_limit: u32,
    /// Reject alphabets whose deepest code exceeds this.
    pub max_code_len: u32,
}

impl CoderConfig {
    pub fn new(capacity: usize) -> Self {
        CoderConfig {
            capacity,
            strategy: TableStrategy::Auto,
            flat_limit: DEFAULT_FLAT_LIMIT,
            max_code_len: MAX_CODE_LEN,
        }
    }

    pub fn with_strategy(mut self, strategy: TableStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_flat_limit(mut self, flat_limit: u32) -> Self {
        self.flat_limit = flat_limit;
        self
    }

    pub fn with_max_code_len(mut self, max_code_len: u32) -> Self {
        self.max_code_len = max_code_len;
        self
    }

    /// Check the configuration before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::configuration("capacity must be at least 1"));
        }
        if self.max_code_len == 0 || self.max_code_len > MAX_CODE_LEN {
            return Err(Error::configuration(format!(
                "max code length {} outside 1..={}",
                self.max_code_len, MAX_CODE_LEN
            )));
        }
        if self.flat_limit > FLAT_MAX_BITS {
            return Err(Error::configuration(format!(
                "flat limit {} exceeds {}",
                self.flat_limit, FLAT_MAX_BITS
            )));
        }
        Ok(())
    }

    /// Pick the concrete layout for a code set whose deepest code is `max_len`.
    pub fn resolve_strategy(&self, max_len: u32) -> TableStrategy {
        match self.strategy {
            TableStrategy::Auto if max_len <= self.flat_limit => TableStrategy::Flat,
            TableStrategy::Auto => TableStrategy::MultiLevel,
            other => other,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(CoderConfig::new(4).validate().is_ok());
        assert!(matches!(
            CoderConfig::new(0).validate(),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            CoderConfig::new(4).with_max_code_len(57).validate(),
            Err(Error::Configuration { .. })
        ));
        assert!(CoderConfig::new(4).with_max_code_len(56).validate().is_ok());
        assert!(CoderConfig::new(4).with_flat_limit(25).validate().is_err());
    }

    #[test]
    fn test_resolve_strategy() {
        let config = CoderConfig::new(4).with_flat_limit(10);
        assert_eq!(config.resolve_strategy(10), TableStrategy::Flat);
        assert_eq!(config.resolve_strategy(11), TableStrategy::MultiLevel);

        let config = config.with_strategy(TableStrategy::MultiLevel);
        assert_eq!(config.resolve_strategy(3), TableStrategy::MultiLevel);
    }
}
