//! Similarity coefficients over symbol sets and bags.
//!
//! All seven coefficients share one matcher producing `(a, b, c)`: the
//! match count, the surplus of x, and the surplus of y, computed either on
//! symbol counts (`cnt`) or on distinct symbols (`bin`). Two identical or
//! both-empty strings score 1.

use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{symbol_bag, Measure, Opts};

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    let matching = cfg.get_str("measures.sim_coefficient.matching");
    opts.binary = if matching.eq_ignore_ascii_case("cnt") {
        false
    } else if matching.eq_ignore_ascii_case("bin") {
        true
    } else {
        log::warn!("unknown matching '{matching}'; using 'bin' instead");
        true
    };
}

struct MatchCounts {
    a: f64,
    b: f64,
    c: f64,
}

fn matches(m: &Measure, x: &HString, y: &HString) -> MatchCounts {
    let bx = symbol_bag(x);
    let by = symbol_bag(y);
    let mut out = MatchCounts {
        a: 0.0,
        b: 0.0,
        c: 0.0,
    };

    if !m.opts().binary {
        let mut missing = y.len() as f64;
        for (sym, cx) in &bx {
            match by.get(sym) {
                None => out.b += cx,
                Some(cy) => {
                    out.a += cx.min(*cy);
                    missing -= cx.min(*cy);
                    if cy < cx {
                        out.b += cx - cy;
                    }
                }
            }
        }
        out.c += missing;
    } else {
        let mut missing = by.len() as f64;
        for sym in bx.keys() {
            if by.contains_key(sym) {
                out.a += 1.0;
                missing -= 1.0;
            } else {
                out.b += 1.0;
            }
        }
        out.c += missing;
    }

    out
}

pub(crate) fn compare_jaccard(m: &Measure, x: &HString, y: &HString) -> f64 {
    let mt = matches(m, x, y);
    if mt.b == 0.0 && mt.c == 0.0 {
        return 1.0;
    }
    mt.a / (mt.a + mt.b + mt.c)
}

pub(crate) fn compare_simpson(m: &Measure, x: &HString, y: &HString) -> f64 {
    let mt = matches(m, x, y);
    if mt.b == 0.0 && mt.c == 0.0 {
        return 1.0;
    }
    mt.a / (mt.a + mt.b).min(mt.a + mt.c)
}

pub(crate) fn compare_braun(m: &Measure, x: &HString, y: &HString) -> f64 {
    let mt = matches(m, x, y);
    if mt.b == 0.0 && mt.c == 0.0 {
        return 1.0;
    }
    mt.a / (mt.a + mt.b).max(mt.a + mt.c)
}

pub(crate) fn compare_dice(m: &Measure, x: &HString, y: &HString) -> f64 {
    let mt = matches(m, x, y);
    if mt.b == 0.0 && mt.c == 0.0 {
        return 1.0;
    }
    2.0 * mt.a / (2.0 * mt.a + mt.b + mt.c)
}

pub(crate) fn compare_sokal(m: &Measure, x: &HString, y: &HString) -> f64 {
    let mt = matches(m, x, y);
    if mt.b == 0.0 && mt.c == 0.0 {
        return 1.0;
    }
    mt.a / (mt.a + 2.0 * (mt.b + mt.c))
}

pub(crate) fn compare_kulczynski(m: &Measure, x: &HString, y: &HString) -> f64 {
    let mt = matches(m, x, y);
    if mt.b == 0.0 && mt.c == 0.0 {
        return 1.0;
    }
    0.5 * (mt.a / (mt.a + mt.b) + mt.a / (mt.a + mt.c))
}

pub(crate) fn compare_otsuka(m: &Measure, x: &HString, y: &HString) -> f64 {
    let mt = matches(m, x, y);
    if mt.b == 0.0 && mt.c == 0.0 {
        return 1.0;
    }
    mt.a / ((mt.a + mt.b) * (mt.a + mt.c)).sqrt()
}
