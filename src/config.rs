use std::env::var;
use std::str::FromStr;

use crate::heap::MAX_CELLS;

pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Ceiling on live cells
    pub max_cells: usize,
    /// Evaluator recursion limit
    pub max_depth: usize,
    pub prompt: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_cells: MAX_CELLS,
            max_depth: MAX_DEPTH,
            prompt: "> ".into(),
        }
    }
}

impl Config {
    /// Defaults overlaid with `CELLISP_MAX_CELLS`, `CELLISP_MAX_DEPTH` and `CELLISP_PROMPT`.
    pub fn from_env() -> Config {
        Config::from_lookup(|key| var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(n) = parse_var(&lookup, "CELLISP_MAX_CELLS") {
            config.max_cells = n;
        }
        if let Some(n) = parse_var(&lookup, "CELLISP_MAX_DEPTH") {
            config.max_depth = n;
        }
        if let Some(prompt) = lookup("CELLISP_PROMPT") {
            config.prompt = prompt;
        }

        config
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {}={:?}: not a number", key, raw);
            None
        }
    }
}
