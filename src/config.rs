//! Backend configuration: which DN-index variant to run, the configured
//! suffix, and where the LMDB environment lives. Parses a generic
//! [toml::Value] and pulls fields out with defaults rather than deriving
//! `serde::Deserialize`, since the config surface here is small enough
//! that a dependency-free reader is clearer than a derive.

use crate::{dn::Dn, err_at, Result};

/// Which DN-index implementation a backend instance runs. The two
/// variants are interchangeable from the caller's point of view; the
/// choice is made once, at startup, from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Flat,
    Hierarchical,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub suffix: Dn,
    pub variant: Variant,
    pub env_path: String,
    pub map_size: usize,
}

const DEFAULT_MAP_SIZE: i64 = 10 * 1024 * 1024 * 1024; // 10 GiB

macro_rules! get_property {
    ($v:expr, $name:expr, $as_fn:ident, $default:expr) => {
        match $v.get($name) {
            Some(val) => match val.$as_fn() {
                Some(val) => val,
                None => return err_at!(Invalid, msg: "config field {} has the wrong type", $name),
            },
            None => $default,
        }
    };
}

impl Config {
    pub fn from_toml(v: toml::Value) -> Result<Config> {
        let suffix = get_property!(v, "suffix", as_str, "");
        if suffix.is_empty() {
            return err_at!(Invalid, msg: "config is missing a required `suffix` field");
        }

        let variant = match get_property!(v, "variant", as_str, "flat") {
            "flat" => Variant::Flat,
            "hierarchical" => Variant::Hierarchical,
            other => return err_at!(Invalid, msg: "unknown variant {:?}", other),
        };

        let env_path = get_property!(v, "env_path", as_str, "./dnindex.db").to_string();
        let map_size = get_property!(v, "map_size", as_integer, DEFAULT_MAP_SIZE) as usize;

        Ok(Config {
            suffix: Dn::new(suffix.to_string()),
            variant,
            env_path,
            map_size,
        })
    }

    pub fn parse_str(text: &str) -> Result<Config> {
        let v: toml::Value = err_at!(Invalid, text.parse())?;
        Config::from_toml(v)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
