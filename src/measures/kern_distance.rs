//! Distance substitution kernel (DSK).
//!
//! Haasdonk, Bahlmann. Learning with distance substitution kernels. DAGM
//! 2004. A configured distance is substituted into a kernel; for the linear
//! and polynomial types the empty string acts as the origin of the implicit
//! feature space. If the distance is not Euclidean the result is undefined
//! but still computable.

use crate::cache::CacheId;
use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{match_name_or_fallback, Measure, Opts, Subst, MEASURES};
use crate::norm::{knorm_apply, KNorm};

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    // Inner distance first; its options land in the shared struct.
    let dist = cfg.get_str("measures.kern_distance.dist");
    opts.ds_dist = match_name_or_fallback(dist);
    (MEASURES[opts.ds_dist].configure)(cfg, opts);

    let subst = cfg.get_str("measures.kern_distance.type");
    opts.subst = if subst.eq_ignore_ascii_case("linear") {
        Subst::Linear
    } else if subst.eq_ignore_ascii_case("poly") {
        Subst::Poly
    } else if subst.eq_ignore_ascii_case("neg") {
        Subst::Neg
    } else if subst.eq_ignore_ascii_case("rbf") {
        Subst::Rbf
    } else {
        log::warn!("unknown substitution type '{subst}'; using 'linear' instead");
        Subst::Linear
    };

    opts.gamma = cfg.get_float("measures.kern_distance.gamma");
    opts.ds_degree = cfg.get_float("measures.kern_distance.degree");
    opts.ds_norm = KNorm::parse(cfg.get_str("measures.kern_distance.norm"));
}

/// Inner product centred at the empty string. The self-distances to the
/// origin are memoized per string.
fn dot(m: &Measure, x: &HString, y: &HString) -> f64 {
    let opts = m.opts();
    let origin = HString::empty(x.granularity());

    let xk = x.hash1();
    let d1 = match m.cache().load(xk, CacheId::KernDistance) {
        Some(v) => v as f64,
        None => {
            let v = m.compare_idx(opts.ds_dist, x, &origin);
            m.cache().store(xk, v as f32, CacheId::KernDistance);
            v
        }
    };

    let yk = y.hash1();
    let d2 = match m.cache().load(yk, CacheId::KernDistance) {
        Some(v) => v as f64,
        None => {
            let v = m.compare_idx(opts.ds_dist, y, &origin);
            m.cache().store(yk, v as f32, CacheId::KernDistance);
            v
        }
    };

    let d3 = m.compare_idx(opts.ds_dist, x, y);
    -0.5 * (d3 * d3 - d2 * d2 - d1 * d1)
}

fn kernel(m: &Measure, x: &HString, y: &HString) -> f64 {
    let opts = m.opts();
    match opts.subst {
        Subst::Linear => dot(m, x, y),
        Subst::Poly => (1.0 + opts.gamma * dot(m, x, y)).powf(opts.ds_degree),
        Subst::Neg => {
            let d = m.compare_idx(opts.ds_dist, x, y);
            -d.powf(opts.ds_degree)
        }
        Subst::Rbf => {
            let d = m.compare_idx(opts.ds_dist, x, y);
            (-opts.gamma * d * d).exp()
        }
    }
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let k = kernel(m, x, y);
    knorm_apply(m, m.opts().ds_norm, k, x, y, kernel)
}
