// Copyright 2024 The Corvus Authors.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration for the engine, parsed from a small `key = value` text format (one setting per
//! line, `#` starts a comment, blank lines ignored). Every setting has a documented default, so a
//! missing or absent config file is always valid.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::search::heuristics::CompositeWeights;
use crate::time_manager::TimeManagerConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOrderMode {
    MvvLva,
    Killer,
    History,
    Composite,
}

#[derive(Clone, Debug)]
pub struct MoveOrderConfig {
    pub mode: MoveOrderMode,
    pub weights: CompositeWeights,
}

impl Default for MoveOrderConfig {
    fn default() -> Self {
        MoveOrderConfig {
            mode: MoveOrderMode::Composite,
            weights: CompositeWeights::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SearcherConfig {
    pub max_depth: u32,
    pub enable_null_move: bool,
    pub enable_futility: bool,
    pub enable_delta: bool,
    pub enable_aspiration: bool,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        SearcherConfig {
            max_depth: 64,
            enable_null_move: true,
            enable_futility: true,
            enable_delta: true,
            enable_aspiration: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Config {
    pub searcher: SearcherConfig,
    pub move_order: MoveOrderConfig,
    pub time_manager: TimeManagerConfig,
    pub opening_book_path: Option<PathBuf>,
    pub endgame_tablebase_path: Option<PathBuf>,
    pub remote_tablebase_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("line {0}: expected `key = value`")]
    MalformedLine(usize),
    #[error("line {0}: unknown key `{1}`")]
    UnknownKey(usize, String),
    #[error("line {0}: invalid value for `{1}`: {2}")]
    InvalidValue(usize, String, String),
}

impl Config {
    pub fn parse(text: &str) -> Result<Config, ConfigError> {
        let mut raw = HashMap::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or(ConfigError::MalformedLine(lineno + 1))?;
            raw.insert(key.trim().to_string(), (lineno + 1, value.trim().to_string()));
        }

        let mut config = Config::default();
        for (key, (lineno, value)) in raw {
            apply_setting(&mut config, &key, &value, lineno)?;
        }

        Ok(config)
    }
}

fn apply_setting(
    config: &mut Config,
    key: &str,
    value: &str,
    lineno: usize,
) -> Result<(), ConfigError> {
    let parse_f64 = |v: &str| {
        v.parse::<f64>()
            .map_err(|_| ConfigError::InvalidValue(lineno, key.to_string(), v.to_string()))
    };
    let parse_bool = |v: &str| {
        v.parse::<bool>()
            .map_err(|_| ConfigError::InvalidValue(lineno, key.to_string(), v.to_string()))
    };
    let parse_u32 = |v: &str| {
        v.parse::<u32>()
            .map_err(|_| ConfigError::InvalidValue(lineno, key.to_string(), v.to_string()))
    };

    match key {
        "max_depth" => config.searcher.max_depth = parse_u32(value)?,
        "enable_null_move" => config.searcher.enable_null_move = parse_bool(value)?,
        "enable_futility" => config.searcher.enable_futility = parse_bool(value)?,
        "enable_delta" => config.searcher.enable_delta = parse_bool(value)?,
        "enable_aspiration" => config.searcher.enable_aspiration = parse_bool(value)?,
        "move_order_mode" => {
            config.move_order.mode = match value {
                "mvv_lva" => MoveOrderMode::MvvLva,
                "killer" => MoveOrderMode::Killer,
                "history" => MoveOrderMode::History,
                "composite" => MoveOrderMode::Composite,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        lineno,
                        key.to_string(),
                        value.to_string(),
                    ))
                }
            }
        }
        "mvv_lva_weight" => config.move_order.weights.mvv_lva = parse_f64(value)?,
        "killer_moves_weight" => config.move_order.weights.killer = parse_f64(value)?,
        "history_weight" => config.move_order.weights.history = parse_f64(value)?,
        "time_weight" => config.time_manager.time_weight = parse_f64(value)?,
        "increment_weight" => config.time_manager.increment_weight = parse_f64(value)?,
        "opening_book_path" => config.opening_book_path = Some(PathBuf::from(value)),
        "endgame_tablebase_path" => config.endgame_tablebase_path = Some(PathBuf::from(value)),
        "remote_tablebase_url" => config.remote_tablebase_url = Some(value.to_string()),
        _ => return Err(ConfigError::UnknownKey(lineno, key.to_string())),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(64, config.searcher.max_depth);
        assert_eq!(MoveOrderMode::Composite, config.move_order.mode);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let config = Config::parse("# comment\n\nmax_depth = 12\n").unwrap();
        assert_eq!(12, config.searcher.max_depth);
    }

    #[test]
    fn unknown_key_is_an_error() {
        let err = Config::parse("not_a_real_key = 1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(1, _)));
    }

    #[test]
    fn malformed_line_is_an_error() {
        let err = Config::parse("max_depth").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedLine(1)));
    }

    #[test]
    fn paths_are_parsed() {
        let config = Config::parse("opening_book_path = /tmp/book.json").unwrap();
        assert_eq!(Some(PathBuf::from("/tmp/book.json")), config.opening_book_path);
    }

    #[test]
    fn remote_tablebase_url_is_independent_of_the_local_path() {
        let config = Config::parse("remote_tablebase_url = https://tablebase.example/query").unwrap();
        assert_eq!(None, config.endgame_tablebase_path);
        assert_eq!(
            Some("https://tablebase.example/query".to_string()),
            config.remote_tablebase_url
        );
    }
}
