//! Optimal string alignment (OSA) distance.
//!
//! Restricted edit distance: adjacent transpositions are allowed but a
//! transposed pair cannot be edited again, so the plain `(|x|+1) x (|y|+1)`
//! grid suffices.

use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{Measure, Opts};
use crate::norm::LNorm;

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    opts.cost_ins = cfg.get_float("measures.dist_osa.cost_ins");
    opts.cost_del = cfg.get_float("measures.dist_osa.cost_del");
    opts.cost_sub = cfg.get_float("measures.dist_osa.cost_sub");
    opts.cost_tra = cfg.get_float("measures.dist_osa.cost_tra");
    opts.lnorm = LNorm::parse(cfg.get_str("measures.dist_osa.norm"));
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let opts = m.opts();

    if x.is_empty() && y.is_empty() {
        return 0.0;
    }

    let width = y.len() + 1;
    let idx = |i: usize, j: usize| i * width + j;
    let mut d = vec![0.0f64; (x.len() + 1) * width];

    for i in 0..=x.len() {
        d[idx(i, 0)] = i as f64 * opts.cost_ins;
    }
    for j in 0..=y.len() {
        d[idx(0, j)] = j as f64 * opts.cost_ins;
    }

    for i in 1..=x.len() {
        for j in 1..=y.len() {
            let c = HString::compare(x, i - 1, y, j - 1);

            let mut a = d[idx(i - 1, j)] + opts.cost_ins;
            let b = d[idx(i, j - 1)] + opts.cost_del;
            if a > b {
                a = b;
            }
            let b = d[idx(i - 1, j - 1)] + if c != 0 { opts.cost_sub } else { 0.0 };
            if a > b {
                a = b;
            }

            if i > 1
                && j > 1
                && HString::compare(x, i - 1, y, j - 2) == 0
                && HString::compare(x, i - 2, y, j - 1) == 0
            {
                let b = d[idx(i - 2, j - 2)] + if c != 0 { opts.cost_tra } else { 0.0 };
                if a > b {
                    a = b;
                }
            }

            d[idx(i, j)] = a;
        }
    }

    let r = d[idx(x.len(), y.len())];
    opts.lnorm.apply(r, x, y)
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::hstring::HString;
    use crate::measures::Measure;

    fn osa(x: &str, y: &str) -> f32 {
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_osa");
        let m = Measure::new(cfg).unwrap();
        m.compare(&HString::from(x), &HString::from(y))
    }

    #[test]
    fn byte_cases() {
        assert_eq!(osa("", ""), 0.0);
        assert_eq!(osa("a", ""), 1.0);
        assert_eq!(osa("", "a"), 1.0);
        assert_eq!(osa("a", "a"), 0.0);
        assert_eq!(osa("ab", "ba"), 1.0);
        // The restricted alignment cannot reuse the transposed pair.
        assert_eq!(osa("ca", "abc"), 3.0);
    }

    #[test]
    fn transposition_cost_is_configurable() {
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_osa");
        cfg.set("measures.dist_osa.cost_tra", 5.0);
        let m = Measure::new(cfg).unwrap();
        // Substitute both characters instead of paying the transposition.
        assert_eq!(m.compare(&HString::from("ab"), &HString::from("ba")), 2.0);
    }
}
