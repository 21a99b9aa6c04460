//! Spectrum kernel (n-gram kernel).
//!
//! Leslie, Eskin, Noble. The spectrum kernel: a string kernel for SVM
//! protein classification. PSB 2002. Counts of all contiguous n-grams are
//! collected into bags keyed by substring hash; the kernel is the dot
//! product of the two bags.

use ahash::AHashMap;

use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{Measure, Opts};
use crate::norm::{knorm_apply, KNorm};

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    let length = cfg.get_int("measures.kern_spectrum.length");
    if length < 1 {
        log::warn!("spectrum length {length} is not positive; using 1 instead");
        opts.length = 1;
    } else {
        opts.length = length as usize;
    }
    opts.knorm = KNorm::parse(cfg.get_str("measures.kern_spectrum.norm"));
}

fn ngram_bag(x: &HString, n: usize) -> AHashMap<u64, f64> {
    let mut bag = AHashMap::with_capacity(x.len().saturating_sub(n) + 1);
    for i in 0..=(x.len() - n) {
        *bag.entry(x.hash_sub(i, n)).or_insert(0.0) += 1.0;
    }
    bag
}

fn kernel(m: &Measure, x: &HString, y: &HString) -> f64 {
    let n = m.opts().length;
    if x.len() < n || y.len() < n {
        return 0.0;
    }

    let bx = ngram_bag(x, n);
    let by = ngram_bag(y, n);
    let (small, large) = if bx.len() <= by.len() {
        (&bx, &by)
    } else {
        (&by, &bx)
    };

    small
        .iter()
        .map(|(g, c)| c * large.get(g).copied().unwrap_or(0.0))
        .sum()
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let k = kernel(m, x, y);
    knorm_apply(m, m.opts().knorm, k, x, y, kernel)
}
