//! Hamming distance.
//!
//! Hamming. Error-detecting and error-correcting codes. Bell System
//! Technical Journal, 29(2):147-160, 1950. Strings of unequal length count
//! the overhang of the longer string as mismatches.

use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{Measure, Opts};
use crate::norm::LNorm;

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    opts.lnorm = LNorm::parse(cfg.get_str("measures.dist_hamming.norm"));
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let mut d = 0.0;
    for i in 0..x.len().min(y.len()) {
        if HString::compare(x, i, y, i) != 0 {
            d += 1.0;
        }
    }
    d += (x.len() as f64 - y.len() as f64).abs();

    m.opts().lnorm.apply(d, x, y)
}
