//! Damerau-Levenshtein distance.
//!
//! Damerau. A technique for computer detection and correction of spelling
//! errors. Communications of the ACM, 7(3):171-176, 1964. Unlike the
//! restricted OSA variant, transposed blocks may be edited again, which
//! needs the full `(|x|+2) x (|y|+2)` grid and a per-symbol last-row map.

use ahash::AHashMap;

use crate::config::Config;
use crate::hstring::{HString, Sym};
use crate::measures::{Measure, Opts};
use crate::norm::LNorm;

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    opts.cost_ins = cfg.get_float("measures.dist_damerau.cost_ins");
    opts.cost_del = cfg.get_float("measures.dist_damerau.cost_del");
    opts.cost_sub = cfg.get_float("measures.dist_damerau.cost_sub");
    opts.cost_tra = cfg.get_float("measures.dist_damerau.cost_tra");
    opts.lnorm = LNorm::parse(cfg.get_str("measures.dist_damerau.norm"));
}

#[inline]
fn min4(a: f64, b: f64, c: f64, d: f64) -> f64 {
    a.min(b).min(c.min(d))
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let opts = m.opts();

    if x.is_empty() && y.is_empty() {
        return 0.0;
    }

    let width = y.len() + 2;
    let idx = |i: usize, j: usize| i * width + j;
    let inf = (x.len() + y.len()) as f64;
    let mut d = vec![0.0f64; (x.len() + 2) * width];

    d[idx(0, 0)] = inf;
    for i in 0..=x.len() {
        d[idx(i + 1, 1)] = i as f64;
        d[idx(i + 1, 0)] = inf;
    }
    for j in 0..=y.len() {
        d[idx(1, j + 1)] = j as f64;
        d[idx(0, j + 1)] = inf;
    }

    // Last grid row in which each symbol of x occurred.
    let mut last_row: AHashMap<Sym, usize> = AHashMap::with_capacity(x.len().min(64));

    for i in 1..=x.len() {
        let mut db = 0usize;
        for j in 1..=y.len() {
            let i1 = *last_row.get(&y.get(j - 1)).unwrap_or(&0);
            let j1 = db;
            let dz = if HString::compare(x, i - 1, y, j - 1) != 0 {
                opts.cost_sub
            } else {
                0.0
            };
            if dz == 0.0 {
                db = j;
            }

            d[idx(i + 1, j + 1)] = min4(
                d[idx(i, j)] + dz,
                d[idx(i + 1, j)] + opts.cost_ins,
                d[idx(i, j + 1)] + opts.cost_del,
                d[idx(i1, j1)] + (i - i1 - 1) as f64 + opts.cost_tra + (j - j1 - 1) as f64,
            );
        }
        last_row.insert(x.get(i - 1), i);
    }

    let r = d[idx(x.len() + 1, y.len() + 1)];

    match opts.lnorm {
        LNorm::None => r,
        norm => {
            let uniform = (opts.cost_ins - opts.cost_del).abs() < 1e-6
                && (opts.cost_del - opts.cost_sub).abs() < 1e-6
                && (opts.cost_sub - opts.cost_tra).abs() < 1e-6;
            if uniform {
                1.0 - norm.apply_weighted(r, opts.cost_ins, x, y)
            } else {
                norm.apply(r, x, y)
            }
        }
    }
}
