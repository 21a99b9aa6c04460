//! Kernel-based distance.
//!
//! Maps a configured kernel to a Euclidean distance through
//! `d^2 = K(x,x) + K(y,y) - 2 K(x,y)`. The self-values are memoized in the
//! shared cache.

use crate::cache::CacheId;
use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{match_name_or_fallback, Measure, Opts, MEASURES};
use crate::norm::{knorm_apply, KNorm};

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    // Inner kernel first; its options land in the shared struct.
    let kern = cfg.get_str("measures.dist_kernel.kern");
    opts.dk_kern = match_name_or_fallback(kern);
    (MEASURES[opts.dk_kern].configure)(cfg, opts);

    opts.dk_squared = cfg.get_bool("measures.dist_kernel.squared");
    opts.dk_norm = KNorm::parse(cfg.get_str("measures.dist_kernel.norm"));
}

/// The inner kernel with this measure's own normalization applied on top of
/// whatever the inner kernel already does for itself.
fn kernel(m: &Measure, x: &HString, y: &HString) -> f64 {
    let opts = m.opts();
    let k = m.compare_idx(opts.dk_kern, x, y);
    knorm_apply(m, opts.dk_norm, k, x, y, MEASURES[opts.dk_kern].compare)
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let opts = m.opts();

    let xk = x.hash1();
    let k1 = match m.cache().load(xk, CacheId::DistKernel) {
        Some(v) => v as f64,
        None => {
            let v = kernel(m, x, x);
            m.cache().store(xk, v as f32, CacheId::DistKernel);
            v
        }
    };

    let yk = y.hash1();
    let k2 = match m.cache().load(yk, CacheId::DistKernel) {
        Some(v) => v as f64,
        None => {
            let v = kernel(m, y, y);
            m.cache().store(yk, v as f32, CacheId::DistKernel);
            v
        }
    };

    let k3 = kernel(m, x, y);
    let d = k1 + k2 - 2.0 * k3;

    if opts.dk_squared {
        d
    } else {
        d.max(0.0).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::hstring::HString;
    use crate::measures::Measure;

    fn measure() -> Measure {
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_kernel");
        Measure::new(cfg).unwrap()
    }

    #[test]
    fn self_distance_is_zero() {
        let m = measure();
        let x = HString::from("abcdef");
        assert!((m.compare(&x, &x)).abs() < 1e-6);
    }

    #[test]
    fn wdegree_backed_values() {
        // Default inner kernel is kern_wdegree, degree 3, no shift.
        // K("ab","ab") = w(2), K("ab","ax") = w(1), K("ax","ax") = w(2).
        // d = 2*w(2) - 2*w(1); w(1) = 0.5, w(2) = 2*(-4+18+10)/36 = 4/3.
        let m = measure();
        let x = HString::from("ab");
        let y = HString::from("ax");
        let d = m.compare(&x, &y) as f64;
        let w1 = 0.5;
        let w2 = 4.0 / 3.0;
        assert!((d - (2.0 * w2 - 2.0 * w1)).abs() < 1e-6);
    }

    #[test]
    fn sqrt_form() {
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_kernel");
        cfg.set("measures.dist_kernel.squared", false);
        let m = Measure::new(cfg).unwrap();
        let sq = measure();
        let x = HString::from("ab");
        let y = HString::from("xy");
        let a = m.compare(&x, &y) as f64;
        let b = sq.compare(&x, &y) as f64;
        assert!((a * a - b).abs() < 1e-5);
    }

    #[test]
    fn symmetric() {
        let m = measure();
        let x = HString::from("abcd");
        let y = HString::from("abdc");
        assert!((m.compare(&x, &y) - m.compare(&y, &x)).abs() < 1e-6);
    }
}
