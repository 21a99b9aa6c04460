//! Subsequence kernel (SSK).
//!
//! Lodhi, Saunders, Shawe-Taylor, Cristianini, Watkins. Text classification
//! using string kernels. JMLR 2:419-444, 2002. Counts common subsequences
//! of a fixed length, each occurrence weighted by `lambda` to the power of
//! its span. The dynamic program keeps one layer per subsequence length.

use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{Measure, Opts};
use crate::norm::{knorm_apply, KNorm};

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    let length = cfg.get_int("measures.kern_subsequence.length");
    if length < 1 {
        log::warn!("subsequence length {length} is not positive; using 1 instead");
        opts.length = 1;
    } else {
        opts.length = length as usize;
    }
    opts.lambda = cfg.get_float("measures.kern_subsequence.lambda");
    opts.knorm = KNorm::parse(cfg.get_str("measures.kern_subsequence.norm"));
}

fn kernel(m: &Measure, x: &HString, y: &HString) -> f64 {
    let n = m.opts().length;
    let lambda = m.opts().lambda;
    let (xl, yl) = (x.len(), y.len());
    if xl < n || yl < n {
        return 0.0;
    }

    let width = yl + 1;
    let idx = |i: usize, j: usize| i * width + j;

    // kp holds K'_{l-1}; K'_0 is identically one.
    let mut kp = vec![1.0f64; (xl + 1) * width];

    for l in 1..n {
        let mut kp_next = vec![0.0f64; (xl + 1) * width];
        for i in l..=xl {
            // Rolling inner term K'' along j.
            let mut kpp = 0.0;
            for j in l..=yl {
                kpp = if HString::compare(x, i - 1, y, j - 1) == 0 {
                    lambda * (kpp + lambda * kp[idx(i - 1, j - 1)])
                } else {
                    lambda * kpp
                };
                kp_next[idx(i, j)] = lambda * kp_next[idx(i - 1, j)] + kpp;
            }
        }
        kp = kp_next;
    }

    let mut k = 0.0;
    for i in n..=xl {
        for j in n..=yl {
            if HString::compare(x, i - 1, y, j - 1) == 0 {
                k += lambda * lambda * kp[idx(i - 1, j - 1)];
            }
        }
    }
    k
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let k = kernel(m, x, y);
    knorm_apply(m, m.opts().knorm, k, x, y, kernel)
}
