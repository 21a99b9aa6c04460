//! Measure registry and dispatch.
//!
//! Every measure exposes a configure function that reads its options from
//! the configuration and a compare function producing the similarity or
//! dissimilarity value for a string pair. A static ordered table maps names
//! (and aliases) to these pairs; name matching accepts the full name or the
//! suffix after the first `_`, case-insensitively, and unknown names warn
//! and fall back to the default measure.
//!
//! The [`Measure`] context handle carries everything a comparison needs:
//! the configuration, the resolved options, the shared value cache, and the
//! global-cache flag. Wrapper measures (kernel-based distance, distance
//! substitution kernel) dispatch to their inner measure through the table
//! index resolved at configure time, never through name lookup on the hot
//! path.

pub mod bag;
pub mod coefficient;
pub mod compression;
pub mod damerau;
pub mod dist_kernel;
pub mod hamming;
pub mod jarowinkler;
pub mod kern_distance;
pub mod lee;
pub mod levenshtein;
pub mod osa;
pub mod spectrum;
pub mod subsequence;
pub mod wdegree;

use std::sync::Arc;

use ahash::AHashMap;
use log::warn;

use crate::cache::{CacheId, VCache};
use crate::config::{Config, Value};
use crate::error::Error;
use crate::hstring::{HString, Preproc, Sym};
use crate::norm::{KNorm, LNorm};

pub(crate) type ConfigureFn = fn(&Config, &mut Opts);
pub(crate) type CompareFn = fn(&Measure, &HString, &HString) -> f64;

pub(crate) struct Entry {
    pub name: &'static str,
    pub configure: ConfigureFn,
    pub compare: CompareFn,
}

/// Substitution type of the distance substitution kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Subst {
    #[default]
    Linear,
    Poly,
    Neg,
    Rbf,
}

/// Options shared by all measures; each configure function fills the fields
/// it cares about. Wrapper measures keep their own normalization fields so
/// configuring the inner measure cannot clobber them.
#[derive(Debug, Clone)]
pub struct Opts {
    pub lnorm: LNorm,
    pub knorm: KNorm,
    // Edit distances
    pub cost_ins: f64,
    pub cost_del: f64,
    pub cost_sub: f64,
    pub cost_tra: f64,
    // Compression
    pub level: u32,
    // Jaro-Winkler
    pub scaling: f64,
    // Lee
    pub min_sym: i64,
    pub max_sym: i64,
    // Set coefficients
    pub binary: bool,
    // Weighted-degree kernel
    pub degree: i64,
    pub shift: i64,
    // Spectrum / subsequence kernels
    pub length: usize,
    pub lambda: f64,
    // Distance substitution kernel
    pub subst: Subst,
    pub gamma: f64,
    pub ds_degree: f64,
    pub ds_dist: usize,
    pub ds_norm: KNorm,
    // Kernel-based distance
    pub dk_kern: usize,
    pub dk_squared: bool,
    pub dk_norm: KNorm,
}

impl Default for Opts {
    fn default() -> Self {
        Opts {
            lnorm: LNorm::None,
            knorm: KNorm::None,
            cost_ins: 1.0,
            cost_del: 1.0,
            cost_sub: 1.0,
            cost_tra: 1.0,
            level: 9,
            scaling: 0.1,
            min_sym: 0,
            max_sym: 255,
            binary: true,
            degree: 3,
            shift: 0,
            length: 3,
            lambda: 0.1,
            subst: Subst::Linear,
            gamma: 1.0,
            ds_degree: 1.0,
            ds_dist: 0,
            ds_norm: KNorm::None,
            dk_kern: 0,
            dk_squared: true,
            dk_norm: KNorm::None,
        }
    }
}

/// Registry of measures. Aliases share the configure/compare pair of their
/// canonical entry.
pub(crate) static MEASURES: &[Entry] = &[
    Entry { name: "dist_bag", configure: bag::configure, compare: bag::compare },
    Entry { name: "dist_compression", configure: compression::configure, compare: compression::compare },
    Entry { name: "dist_ncd", configure: compression::configure, compare: compression::compare },
    Entry { name: "dist_damerau", configure: damerau::configure, compare: damerau::compare },
    Entry { name: "dist_hamming", configure: hamming::configure, compare: hamming::compare },
    Entry { name: "dist_jaro", configure: jarowinkler::configure_jaro, compare: jarowinkler::compare_jaro },
    Entry { name: "dist_jarowinkler", configure: jarowinkler::configure, compare: jarowinkler::compare },
    Entry { name: "dist_kernel", configure: dist_kernel::configure, compare: dist_kernel::compare },
    Entry { name: "dist_lee", configure: lee::configure, compare: lee::compare },
    Entry { name: "dist_levenshtein", configure: levenshtein::configure, compare: levenshtein::compare },
    Entry { name: "dist_edit", configure: levenshtein::configure, compare: levenshtein::compare },
    Entry { name: "dist_osa", configure: osa::configure, compare: osa::compare },
    Entry { name: "kern_distance", configure: kern_distance::configure, compare: kern_distance::compare },
    Entry { name: "kern_dsk", configure: kern_distance::configure, compare: kern_distance::compare },
    Entry { name: "kern_spectrum", configure: spectrum::configure, compare: spectrum::compare },
    Entry { name: "kern_ngram", configure: spectrum::configure, compare: spectrum::compare },
    Entry { name: "kern_subsequence", configure: subsequence::configure, compare: subsequence::compare },
    Entry { name: "kern_ssk", configure: subsequence::configure, compare: subsequence::compare },
    Entry { name: "kern_wdegree", configure: wdegree::configure, compare: wdegree::compare },
    Entry { name: "kern_wdk", configure: wdegree::configure, compare: wdegree::compare },
    Entry { name: "sim_braun", configure: coefficient::configure, compare: coefficient::compare_braun },
    Entry { name: "sim_dice", configure: coefficient::configure, compare: coefficient::compare_dice },
    Entry { name: "sim_czekanowski", configure: coefficient::configure, compare: coefficient::compare_dice },
    Entry { name: "sim_jaccard", configure: coefficient::configure, compare: coefficient::compare_jaccard },
    Entry { name: "sim_kulczynski", configure: coefficient::configure, compare: coefficient::compare_kulczynski },
    Entry { name: "sim_otsuka", configure: coefficient::configure, compare: coefficient::compare_otsuka },
    Entry { name: "sim_ochiai", configure: coefficient::configure, compare: coefficient::compare_otsuka },
    Entry { name: "sim_simpson", configure: coefficient::configure, compare: coefficient::compare_simpson },
    Entry { name: "sim_sokal", configure: coefficient::configure, compare: coefficient::compare_sokal },
    Entry { name: "sim_anderberg", configure: coefficient::configure, compare: coefficient::compare_sokal },
];

const FALLBACK: &str = "dist_levenshtein";

/// Resolve a measure name to its registry index. Matches the full name or
/// the suffix after the first `_`, case-insensitively.
pub fn match_name(name: &str) -> Option<usize> {
    for (i, entry) in MEASURES.iter().enumerate() {
        if name.eq_ignore_ascii_case(entry.name) {
            return Some(i);
        }
        let suffix = &entry.name[entry.name.find('_').map_or(0, |p| p + 1)..];
        if name.eq_ignore_ascii_case(suffix) {
            return Some(i);
        }
    }
    None
}

pub(crate) fn match_name_or_fallback(name: &str) -> usize {
    match match_name(name) {
        Some(i) => i,
        None => {
            warn!("unknown measure '{name}'; using '{FALLBACK}' instead");
            match_name(FALLBACK).expect("fallback measure is registered")
        }
    }
}

/// List the canonical measure names (aliases excluded).
pub fn measure_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = Vec::new();
    let mut seen: Vec<CompareFn> = Vec::new();
    for entry in MEASURES {
        if seen.iter().any(|f| std::ptr::fn_addr_eq(*f, entry.compare)) {
            continue;
        }
        seen.push(entry.compare);
        names.push(entry.name);
    }
    names
}

/// Context handle for a configured measure: configuration, resolved options,
/// shared value cache and dispatch index.
pub struct Measure {
    cfg: Config,
    opts: Opts,
    cache: Arc<VCache>,
    idx: usize,
    global_cache: bool,
}

impl Measure {
    /// Configure the measure named by `measures.measure`, allocating a cache
    /// sized by `measures.cache_size`.
    pub fn new(cfg: Config) -> Result<Measure, Error> {
        let mb = cfg.get_int("measures.cache_size").max(0) as usize;
        let cache = Arc::new(VCache::with_capacity_mb(mb));
        Measure::with_cache(cfg, cache)
    }

    /// Configure the measure against an existing cache, so several measures
    /// can share one table.
    pub fn with_cache(cfg: Config, cache: Arc<VCache>) -> Result<Measure, Error> {
        cfg.check()?;
        let mut m = Measure {
            cfg,
            opts: Opts::default(),
            cache,
            idx: 0,
            global_cache: false,
        };
        m.reconfigure();
        Ok(m)
    }

    fn reconfigure(&mut self) {
        self.idx = match_name_or_fallback(self.cfg.get_str("measures.measure"));
        self.global_cache = self.cfg.get_bool("measures.global_cache");
        let mut opts = Opts::default();
        (MEASURES[self.idx].configure)(&self.cfg, &mut opts);
        self.opts = opts;
    }

    /// Resolved name of the active measure.
    pub fn name(&self) -> &'static str {
        MEASURES[self.idx].name
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Update a configuration value and re-run the measure configuration,
    /// mirroring a reconfiguration in a running tool.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.cfg.set(key, value);
        self.reconfigure();
    }

    /// Build the preprocessing plan matching this measure's configuration.
    pub fn preproc(&self) -> Result<Preproc, Error> {
        Preproc::from_config(&self.cfg)
    }

    /// Compare two preprocessed strings. With the global cache enabled the
    /// whole result is memoized under the directed pair hash, so measures
    /// that are not symmetric keep separate entries for `(x, y)` and
    /// `(y, x)`.
    pub fn compare(&self, x: &HString, y: &HString) -> f32 {
        if !self.global_cache {
            return (MEASURES[self.idx].compare)(self, x, y) as f32;
        }
        let key = HString::hash2_ordered(x, y);
        if let Some(v) = self.cache.load(key, CacheId::Compare) {
            return v;
        }
        let v = (MEASURES[self.idx].compare)(self, x, y) as f32;
        self.cache.store(key, v, CacheId::Compare);
        v
    }

    pub(crate) fn opts(&self) -> &Opts {
        &self.opts
    }

    pub(crate) fn cache(&self) -> &VCache {
        &self.cache
    }

    /// Shared handle to the value cache, for reporting.
    pub fn cache_handle(&self) -> &Arc<VCache> {
        &self.cache
    }

    /// Dispatch to another registry entry; used by wrapper measures.
    pub(crate) fn compare_idx(&self, idx: usize, x: &HString, y: &HString) -> f64 {
        (MEASURES[idx].compare)(self, x, y)
    }
}

/// Count the symbols of a string into a bag. Shared by the bag distance and
/// the set coefficients.
pub(crate) fn symbol_bag(x: &HString) -> AHashMap<Sym, f64> {
    let mut bag = AHashMap::with_capacity(x.len().min(64));
    for i in 0..x.len() {
        *bag.entry(x.get(i)).or_insert(0.0) += 1.0;
    }
    bag
}
