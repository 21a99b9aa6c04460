//! Configuration surface of the engine.
//!
//! A flat key/value map with dotted keys (`measures.dist_levenshtein.norm`)
//! seeded with the defaults every component expects. Parsing configuration
//! files belongs to the caller; this type only carries resolved values and
//! enforces the one cross-key rule (token granularity requires delimiters).

use ahash::AHashMap;
use log::warn;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Default values for every key a component reads. Options set by the caller
/// override these; unknown keys are accepted but ignored by the components.
fn default_table() -> Vec<(&'static str, Value)> {
    vec![
        ("input.decode_str", Value::Bool(false)),
        ("input.reverse_str", Value::Bool(false)),
        ("input.stoptoken_file", Value::Str(String::new())),
        ("input.soundex", Value::Bool(false)),
        ("measures.measure", Value::Str("dist_levenshtein".into())),
        ("measures.granularity", Value::Str("bytes".into())),
        ("measures.token_delim", Value::Str(" %0a%0d".into())),
        ("measures.num_threads", Value::Int(0)),
        ("measures.cache_size", Value::Int(256)),
        ("measures.global_cache", Value::Bool(false)),
        ("measures.col_range", Value::Str(String::new())),
        ("measures.row_range", Value::Str(String::new())),
        ("measures.split", Value::Str(String::new())),
        ("measures.dist_hamming.norm", Value::Str("none".into())),
        ("measures.dist_levenshtein.norm", Value::Str("none".into())),
        ("measures.dist_levenshtein.cost_ins", Value::Float(1.0)),
        ("measures.dist_levenshtein.cost_del", Value::Float(1.0)),
        ("measures.dist_levenshtein.cost_sub", Value::Float(1.0)),
        ("measures.dist_damerau.norm", Value::Str("none".into())),
        ("measures.dist_damerau.cost_ins", Value::Float(1.0)),
        ("measures.dist_damerau.cost_del", Value::Float(1.0)),
        ("measures.dist_damerau.cost_sub", Value::Float(1.0)),
        ("measures.dist_damerau.cost_tra", Value::Float(1.0)),
        ("measures.dist_osa.norm", Value::Str("none".into())),
        ("measures.dist_osa.cost_ins", Value::Float(1.0)),
        ("measures.dist_osa.cost_del", Value::Float(1.0)),
        ("measures.dist_osa.cost_sub", Value::Float(1.0)),
        ("measures.dist_osa.cost_tra", Value::Float(1.0)),
        ("measures.dist_jarowinkler.scaling", Value::Float(0.1)),
        ("measures.dist_lee.min_sym", Value::Int(0)),
        ("measures.dist_lee.max_sym", Value::Int(255)),
        ("measures.dist_compression.level", Value::Int(9)),
        ("measures.dist_bag.norm", Value::Str("none".into())),
        ("measures.dist_kernel.kern", Value::Str("kern_wdegree".into())),
        ("measures.dist_kernel.norm", Value::Str("none".into())),
        ("measures.dist_kernel.squared", Value::Bool(true)),
        ("measures.kern_wdegree.degree", Value::Int(3)),
        ("measures.kern_wdegree.shift", Value::Int(0)),
        ("measures.kern_wdegree.norm", Value::Str("none".into())),
        ("measures.kern_distance.dist", Value::Str("dist_bag".into())),
        ("measures.kern_distance.type", Value::Str("linear".into())),
        ("measures.kern_distance.gamma", Value::Float(1.0)),
        ("measures.kern_distance.degree", Value::Float(1.0)),
        ("measures.kern_distance.norm", Value::Str("none".into())),
        ("measures.kern_subsequence.length", Value::Int(3)),
        ("measures.kern_subsequence.lambda", Value::Float(0.1)),
        ("measures.kern_subsequence.norm", Value::Str("none".into())),
        ("measures.kern_spectrum.length", Value::Int(3)),
        ("measures.kern_spectrum.norm", Value::Str("none".into())),
        ("measures.sim_coefficient.matching", Value::Str("bin".into())),
    ]
}

#[derive(Debug, Clone)]
pub struct Config {
    map: AHashMap<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl Config {
    /// A configuration populated with the default for every known key.
    pub fn new() -> Self {
        let map = default_table()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Config { map }
    }

    /// Set a value. Numeric and boolean literals convert through `Into`.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.map.insert(key.to_string(), value.into());
    }

    pub fn get_str(&self, key: &str) -> &str {
        match self.map.get(key) {
            Some(Value::Str(s)) => s,
            Some(other) => {
                warn!("config key '{key}' is not a string ({other:?}); using ''");
                ""
            }
            None => {
                warn!("unknown config key '{key}'; using ''");
                ""
            }
        }
    }

    pub fn get_int(&self, key: &str) -> i64 {
        match self.map.get(key) {
            Some(Value::Int(v)) => *v,
            // Tolerate mis-typed numbers the way the defaults loader of the
            // original tool did.
            Some(Value::Float(v)) => v.round() as i64,
            Some(other) => {
                warn!("config key '{key}' is not an integer ({other:?}); using 0");
                0
            }
            None => {
                warn!("unknown config key '{key}'; using 0");
                0
            }
        }
    }

    pub fn get_float(&self, key: &str) -> f64 {
        match self.map.get(key) {
            Some(Value::Float(v)) => *v,
            Some(Value::Int(v)) => *v as f64,
            Some(other) => {
                warn!("config key '{key}' is not a float ({other:?}); using 0.0");
                0.0
            }
            None => {
                warn!("unknown config key '{key}'; using 0.0");
                0.0
            }
        }
    }

    pub fn get_bool(&self, key: &str) -> bool {
        match self.map.get(key) {
            Some(Value::Bool(v)) => *v,
            Some(Value::Int(v)) => *v != 0,
            Some(other) => {
                warn!("config key '{key}' is not a bool ({other:?}); using false");
                false
            }
            None => {
                warn!("unknown config key '{key}'; using false");
                false
            }
        }
    }

    /// Cross-key sanity check: token granularity without delimiters cannot
    /// produce symbols and is rejected up front.
    pub fn check(&self) -> Result<(), Error> {
        if self.get_str("measures.granularity").eq_ignore_ascii_case("tokens")
            && self.get_str("measures.token_delim").is_empty()
        {
            return Err(Error::MissingDelimiters);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_seeded() {
        let cfg = Config::new();
        assert_eq!(cfg.get_str("measures.measure"), "dist_levenshtein");
        assert_eq!(cfg.get_str("measures.granularity"), "bytes");
        assert_eq!(cfg.get_int("measures.cache_size"), 256);
        assert_eq!(cfg.get_float("measures.dist_levenshtein.cost_ins"), 1.0);
        assert!(!cfg.get_bool("measures.global_cache"));
    }

    #[test]
    fn set_overrides_defaults() {
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_hamming");
        cfg.set("measures.num_threads", 4i64);
        cfg.set("measures.dist_levenshtein.cost_ins", 2.5);
        assert_eq!(cfg.get_str("measures.measure"), "dist_hamming");
        assert_eq!(cfg.get_int("measures.num_threads"), 4);
        assert_eq!(cfg.get_float("measures.dist_levenshtein.cost_ins"), 2.5);
    }

    #[test]
    fn numeric_coercion() {
        let mut cfg = Config::new();
        cfg.set("measures.cache_size", 1.6);
        assert_eq!(cfg.get_int("measures.cache_size"), 2);
        cfg.set("measures.dist_jarowinkler.scaling", 1i64);
        assert_eq!(cfg.get_float("measures.dist_jarowinkler.scaling"), 1.0);
        cfg.set("measures.global_cache", 1i64);
        assert!(cfg.get_bool("measures.global_cache"));
    }

    #[test]
    fn tokens_without_delimiters_is_rejected() {
        let mut cfg = Config::new();
        cfg.set("measures.granularity", "tokens");
        cfg.set("measures.token_delim", "");
        assert!(matches!(cfg.check(), Err(Error::MissingDelimiters)));

        cfg.set("measures.token_delim", " ");
        assert!(cfg.check().is_ok());
    }
}
