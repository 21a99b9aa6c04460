//! Bag distance.
//!
//! Bartolini, Ciaccia, Patella. String Matching with Metric Trees Using an
//! Approximate Distance. SPIRE 2002. The bag distance approximates and
//! lower-bounds the Levenshtein distance.

use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{symbol_bag, Measure, Opts};
use crate::norm::LNorm;

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    opts.lnorm = LNorm::parse(cfg.get_str("measures.dist_bag.norm"));
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let bx = symbol_bag(x);
    let by = symbol_bag(y);

    // Surplus of x over y and of y over x; symbols absent from x are picked
    // up through the running `missing` count.
    let mut xd = 0.0;
    let mut yd = 0.0;
    let mut missing = y.len() as f64;
    for (sym, cx) in &bx {
        match by.get(sym) {
            None => xd += cx,
            Some(cy) => {
                let diff = cx - cy;
                xd += diff.max(0.0);
                yd += (-diff).max(0.0);
                missing -= cy;
            }
        }
    }
    yd += missing;

    m.opts().lnorm.apply(xd.max(yd), x, y)
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::hstring::HString;
    use crate::measures::Measure;

    fn bag_dist(x: &str, y: &str) -> f32 {
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_bag");
        let m = Measure::new(cfg).unwrap();
        m.compare(&HString::from(x), &HString::from(y))
    }

    #[test]
    fn byte_cases() {
        assert_eq!(bag_dist("", ""), 0.0);
        assert_eq!(bag_dist("a", ""), 1.0);
        assert_eq!(bag_dist("", "a"), 1.0);
        assert_eq!(bag_dist("a", "a"), 0.0);
        assert_eq!(bag_dist("ab", "ba"), 0.0);
        assert_eq!(bag_dist("bab", "ba"), 1.0);
        assert_eq!(bag_dist("abba", "babb"), 1.0);
        assert_eq!(bag_dist("abcd", "axcy"), 2.0);
        assert_eq!(bag_dist("abc", "axcy"), 2.0);
        assert_eq!(bag_dist("abcd", "xcy"), 3.0);
    }

    #[test]
    fn bartolini_examples() {
        assert_eq!(bag_dist("spire", "fare"), 3.0);
        assert_eq!(bag_dist("fare", "spire"), 3.0);
        assert_eq!(bag_dist("spire", "paris"), 1.0);
        assert_eq!(bag_dist("paris", "spire"), 1.0);
    }

    #[test]
    fn token_cases() {
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_bag");
        cfg.set("measures.granularity", "tokens");
        cfg.set("measures.token_delim", ".");
        let m = Measure::new(cfg).unwrap();
        let plan = m.preproc().unwrap();
        let dist = |a: &str, b: &str| {
            let mut x = HString::from(a);
            let mut y = HString::from(b);
            plan.apply(&mut x);
            plan.apply(&mut y);
            m.compare(&x, &y)
        };
        assert_eq!(dist("a.b", "a.c"), 1.0);
        assert_eq!(dist(".a.b.", "a..c."), 1.0);
        assert_eq!(dist(".x.y.", ".x.y."), 0.0);
        assert_eq!(dist("x...y..", "...x..y"), 0.0);
        assert_eq!(dist("ab", "ba"), 1.0);
    }
}
