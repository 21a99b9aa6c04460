//! Jaro and Jaro-Winkler distances.
//!
//! Jaro. Advances in record linkage methodology as applied to the 1985
//! census of Tampa, Florida. JASA 84(406):414-420, 1989. Winkler. String
//! comparator metrics and enhanced decision rules in the Fellegi-Sunter
//! model of record linkage. 1990.
//!
//! Common characters are assigned by the earliest-position method (after
//! David Necas' code). The assignment is deterministic but can be
//! suboptimal; the behavior is kept as is, callers depend on it.

use smallvec::{smallvec, SmallVec};

use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{Measure, Opts};

pub(crate) fn configure_jaro(_cfg: &Config, _opts: &mut Opts) {}

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    opts.scaling = cfg.get_float("measures.dist_jarowinkler.scaling");
}

fn jaro_distance(x: &HString, y: &HString) -> f64 {
    if x.is_empty() || y.is_empty() {
        if x.is_empty() && y.is_empty() {
            return 0.0;
        }
        return 1.0;
    }

    // Make x the shorter (or equally long) string.
    let (x, y) = if x.len() > y.len() { (y, x) } else { (x, y) };

    let halflen = (x.len() + 1) / 2;
    let mut idx: SmallVec<[usize; 64]> = smallvec![0; x.len()];
    let mut matches = 0usize;

    // Window overlapping to the left.
    for i in 0..halflen {
        for j in 0..(i + halflen).min(x.len()) {
            if HString::compare(x, j, y, i) == 0 && idx[j] == 0 {
                matches += 1;
                idx[j] = matches;
                break;
            }
        }
    }

    // Window overlapping to the right.
    let to = (x.len() + halflen).min(y.len());
    for i in halflen..to {
        for j in (i - halflen)..x.len() {
            if HString::compare(x, j, y, i) == 0 && idx[j] == 0 {
                matches += 1;
                idx[j] = matches;
                break;
            }
        }
    }

    if matches == 0 {
        return 1.0;
    }

    // Transpositions: matched positions whose assignment order disagrees
    // with their position order.
    let mut seen = 0usize;
    let mut trans = 0usize;
    for &assigned in idx.iter() {
        if assigned != 0 {
            seen += 1;
            if assigned != seen {
                trans += 1;
            }
        }
    }

    let md = matches as f64;
    1.0 - (md / x.len() as f64 + md / y.len() as f64 + 1.0 - trans as f64 / md / 2.0) / 3.0
}

pub(crate) fn compare_jaro(_m: &Measure, x: &HString, y: &HString) -> f64 {
    jaro_distance(x, y)
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let d = jaro_distance(x, y);

    // Common prefix up to four symbols.
    let mut l = 0;
    let max_prefix = x.len().min(y.len()).min(4);
    while l < max_prefix && HString::compare(x, l, y, l) == 0 {
        l += 1;
    }

    d - l as f64 * m.opts().scaling * d
}
