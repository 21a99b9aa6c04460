//! Weighted-degree kernel with shift.
//!
//! Sonnenburg, Raetsch, Rieck. Large scale learning with string kernels.
//! In Large Scale Kernel Machines, MIT Press, 2007. Matching runs inside
//! the overlap are weighted by a closed-form polynomial; the weight is kept
//! in f64 so long runs do not drift.

use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{Measure, Opts};
use crate::norm::{knorm_apply, KNorm};

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    opts.degree = cfg.get_int("measures.kern_wdegree.degree");
    opts.shift = cfg.get_int("measures.kern_wdegree.shift");
    opts.knorm = KNorm::parse(cfg.get_str("measures.kern_wdegree.norm"));
}

/// Weight of a matching run.
/// Sonnenburg, Raetsch, Schoelkopf. Large scale genomic sequence SVM
/// classifiers. ICML 2005.
fn weight(len: f64, degree: i64) -> f64 {
    assert!(len > 0.0 && degree > 0, "weight needs positive run and degree");
    let d = degree as f64;
    if len <= d {
        len * (-len * len + 3.0 * d * len + 3.0 * d + 1.0) / (3.0 * d * (d + 1.0))
    } else {
        (3.0 * len - d + 1.0) / 3.0
    }
}

/// Accumulate run weights over a shifted overlap.
fn block(m: &Measure, x: &HString, y: &HString, xs: usize, ys: usize, len: usize) -> f64 {
    let degree = m.opts().degree;
    let mut k = 0.0;
    let mut start: Option<usize> = None;

    for i in 0..len {
        if HString::compare(x, i + xs, y, i + ys) == 0 {
            if start.is_none() {
                start = Some(i);
            }
            continue;
        }
        if let Some(s) = start.take() {
            k += weight((i - s) as f64, degree);
        }
    }
    if let Some(s) = start {
        k += weight((len - s) as f64, degree);
    }

    k
}

fn kernel(m: &Measure, x: &HString, y: &HString) -> f64 {
    let shift = m.opts().shift;
    let mut k = 0.0;

    for s in -shift..=shift {
        if s <= 0 {
            let len = (x.len() as i64).min(y.len() as i64 + s).max(0) as usize;
            k += block(m, x, y, 0, (-s) as usize, len);
        } else {
            let len = (x.len() as i64 - s).min(y.len() as i64).max(0) as usize;
            k += block(m, x, y, s as usize, 0, len);
        }
    }

    k
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let k = kernel(m, x, y);
    knorm_apply(m, m.opts().knorm, k, x, y, kernel)
}
