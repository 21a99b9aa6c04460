//! Lee distance.
//!
//! Lee. Some properties of nonbinary error-correcting codes. IRE
//! Transactions on Information Theory, 4(2):77-82, 1958. Symbols live on a
//! ring of size `q = max_sym - min_sym`; each position contributes the
//! shorter way around the ring.

use log::warn;

use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{Measure, Opts};

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    opts.min_sym = cfg.get_int("measures.dist_lee.min_sym");
    opts.max_sym = cfg.get_int("measures.dist_lee.max_sym");
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let opts = m.opts();
    let q = (opts.max_sym - opts.min_sym) as f64;
    let mut d = 0.0;

    for i in 0..x.len().max(y.len()) {
        let mut ad = if i < x.len() && i < y.len() {
            HString::compare(x, i, y, i).abs() as f64
        } else if i < x.len() {
            (x.get(i) as i64 - opts.min_sym).abs() as f64
        } else {
            (y.get(i) as i64 - opts.min_sym).abs() as f64
        };

        if ad > q {
            warn!("distance of symbols larger than alphabet; clamping");
            ad = q - 1.0;
        }
        d += ad.min(q - ad);
    }

    d
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::hstring::HString;
    use crate::measures::Measure;

    fn lee(x: &str, y: &str) -> f32 {
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_lee");
        let m = Measure::new(cfg).unwrap();
        m.compare(&HString::from(x), &HString::from(y))
    }

    #[test]
    fn default_alphabet_cases() {
        assert_eq!(lee("", ""), 0.0);
        assert_eq!(lee("a", ""), 97.0);
        assert_eq!(lee("", "a"), 97.0);
        assert_eq!(lee("a", "a"), 0.0);
        assert_eq!(lee("ab", "ba"), 2.0);
        assert_eq!(lee("bab", "ba"), 98.0);
    }

    #[test]
    fn ring_wraps_around() {
        // q = 4: symbols 0 and 3 are one step apart around the ring.
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_lee");
        cfg.set("measures.dist_lee.min_sym", 0i64);
        cfg.set("measures.dist_lee.max_sym", 4i64);
        let m = Measure::new(cfg).unwrap();
        let x = HString::new(vec![0]);
        let y = HString::new(vec![3]);
        assert_eq!(m.compare(&x, &y), 1.0);
    }
}
