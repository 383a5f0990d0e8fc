// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Codec configuration, optionally loaded from environment variables.

use std::str::FromStr;

/// Byte order of multi-byte primitives in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// The byte order of the running machine.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }
}

impl FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "little" | "le" => Ok(ByteOrder::Little),
            "big" | "be" => Ok(ByteOrder::Big),
            "native" => Ok(ByteOrder::native()),
            other => Err(format!("unknown byte order '{other}'")),
        }
    }
}

/// Default upper bound on any table or list count accepted by the reader.
pub const DEFAULT_MAX_TABLE_LEN: u32 = 16_777_216;

/// Codec configuration.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Byte order used when writing. Reading always follows the file.
    pub byte_order: ByteOrder,
    /// Counts above this are treated as corruption on read.
    pub max_table_len: u32,
}

impl CodecConfig {
    /// Load configuration from environment variables.
    ///
    /// `BREP_BYTE_ORDER` is one of `little`, `big` or `native`;
    /// `BREP_MAX_TABLE_LEN` bounds every count read from a file. Missing or
    /// unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            byte_order: var("BREP_BYTE_ORDER")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.byte_order),
            max_table_len: var("BREP_MAX_TABLE_LEN")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_table_len),
        }
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_max_table_len(mut self, max_table_len: u32) -> Self {
        self.max_table_len = max_table_len;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            byte_order: ByteOrder::native(),
            max_table_len: DEFAULT_MAX_TABLE_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_order_parsing() {
        assert_eq!("little".parse::<ByteOrder>(), Ok(ByteOrder::Little));
        assert_eq!(" BIG ".parse::<ByteOrder>(), Ok(ByteOrder::Big));
        assert_eq!("native".parse::<ByteOrder>(), Ok(ByteOrder::native()));
        assert!("middle".parse::<ByteOrder>().is_err());
    }

    #[test]
    fn vars_override_defaults() {
        let cfg = CodecConfig::from_vars(|name| match name {
            "BREP_BYTE_ORDER" => Some("big".into()),
            "BREP_MAX_TABLE_LEN" => Some("1024".into()),
            _ => None,
        });
        assert_eq!(cfg.byte_order, ByteOrder::Big);
        assert_eq!(cfg.max_table_len, 1024);
    }

    #[test]
    fn bad_vars_fall_back() {
        let cfg = CodecConfig::from_vars(|name| match name {
            "BREP_BYTE_ORDER" => Some("sideways".into()),
            "BREP_MAX_TABLE_LEN" => Some("lots".into()),
            _ => None,
        });
        assert_eq!(cfg.byte_order, ByteOrder::native());
        assert_eq!(cfg.max_table_len, DEFAULT_MAX_TABLE_LEN);
    }
}
