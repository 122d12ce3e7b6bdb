use serde::Deserialize;
use thiserror::Error;

use crate::{
    cache::Cache,
    map::{DirectMapped, SetAssociative},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be at least 1, got {value}")]
    BelowMinimum { field: &'static str, value: usize },
    #[error("ways ({ways}) exceeds blocks ({blocks})")]
    MoreWaysThanBlocks { ways: usize, blocks: usize },
    #[error("expected `ways blocks block_size`, got fewer fields")]
    Truncated,
    #[error("could not parse {token:?} as an integer")]
    NotAnInteger { token: String },
    #[error("unexpected trailing input {token:?} on the configuration line")]
    TrailingInput { token: String },
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub ways: usize,
    pub blocks: usize,
    pub block_size: usize,
}

fn parse_field(token: Option<&str>) -> Result<usize, ConfigError> {
    let token = token.ok_or(ConfigError::Truncated)?;
    token.parse().map_err(|_| ConfigError::NotAnInteger {
        token: token.to_owned(),
    })
}

impl Config {
    /// Parses the stdin configuration form: one line holding exactly
    /// `ways blocks block_size`. Addresses start on the next line.
    pub fn from_line(line: &str) -> Result<Config, ConfigError> {
        let mut tokens = line.split_whitespace();
        let config = Config {
            ways: parse_field(tokens.next())?,
            blocks: parse_field(tokens.next())?,
            block_size: parse_field(tokens.next())?,
        };
        if let Some(extra) = tokens.next() {
            return Err(ConfigError::TrailingInput {
                token: extra.to_owned(),
            });
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("ways", self.ways),
            ("blocks", self.blocks),
            ("block size", self.block_size),
        ];
        for (field, value) in fields {
            if value < 1 {
                return Err(ConfigError::BelowMinimum { field, value });
            }
        }
        if self.ways > self.blocks {
            return Err(ConfigError::MoreWaysThanBlocks {
                ways: self.ways,
                blocks: self.blocks,
            });
        }
        Ok(())
    }

    /// One-time policy selection: a single way needs no replacement
    /// bookkeeping, anything wider runs LRU within its sets.
    pub fn to_cache(&self) -> Box<dyn Cache> {
        if self.ways == 1 {
            Box::new(DirectMapped::new(self.blocks, self.block_size))
        } else {
            Box::new(SetAssociative::new(self.ways, self.blocks, self.block_size))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::AccessResult;

    #[test]
    fn parses_the_stdin_form() {
        let config = Config::from_line("2 8 4\n").unwrap();
        assert_eq!((config.ways, config.blocks, config.block_size), (2, 8, 4));
    }

    #[test]
    fn rejects_bad_lines() {
        assert!(Config::from_line("2 8").is_err());
        assert!(Config::from_line("2 eight 4").is_err());
        assert!(Config::from_line("2 8 4 1010").is_err());
    }

    #[test]
    fn deserializes_json() {
        let config: Config =
            serde_json::from_str(r#"{"ways": 2, "blocks": 8, "block_size": 4}"#).unwrap();
        assert_eq!((config.ways, config.blocks, config.block_size), (2, 8, 4));
    }

    #[test]
    fn enforces_documented_bounds() {
        let ok = Config { ways: 1, blocks: 1, block_size: 1 };
        assert!(ok.validate().is_ok());

        let zero_ways = Config { ways: 0, blocks: 4, block_size: 1 };
        assert!(zero_ways.validate().is_err());

        let zero_block_size = Config { ways: 2, blocks: 4, block_size: 0 };
        assert!(zero_block_size.validate().is_err());

        let too_wide = Config { ways: 8, blocks: 4, block_size: 1 };
        assert!(too_wide.validate().is_err());
    }

    #[test]
    fn selects_policy_by_way_count() {
        // Direct-mapped: tags 0 and 2 share index 0 and evict each other.
        let mut direct = Config { ways: 1, blocks: 2, block_size: 1 }.to_cache();
        direct.access("0").unwrap();
        direct.access("10").unwrap();
        assert_eq!(direct.access("0"), Ok(AccessResult::Miss));

        // Two ways over the same two blocks keep both tags resident.
        let mut assoc = Config { ways: 2, blocks: 2, block_size: 1 }.to_cache();
        assoc.access("0").unwrap();
        assoc.access("10").unwrap();
        assert_eq!(assoc.access("0"), Ok(AccessResult::Hit));
    }
}
