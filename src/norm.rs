//! Normalization of similarity values.
//!
//! Length normalization rescales edit distances by string lengths; kernel
//! normalization projects kernel values onto the unit sphere (L2). The L2
//! path memoizes the kernel self-values in the shared cache under the Norm
//! id.

use log::warn;

use crate::cache::CacheId;
use crate::hstring::HString;
use crate::measures::{CompareFn, Measure};

/// Length normalization variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LNorm {
    #[default]
    None,
    Min,
    Max,
    Avg,
}

impl LNorm {
    /// Parse a configuration value; unknown names warn and fall back to
    /// `none`.
    pub fn parse(s: &str) -> LNorm {
        if s.eq_ignore_ascii_case("none") {
            LNorm::None
        } else if s.eq_ignore_ascii_case("min") {
            LNorm::Min
        } else if s.eq_ignore_ascii_case("max") {
            LNorm::Max
        } else if s.eq_ignore_ascii_case("avg") {
            LNorm::Avg
        } else {
            warn!("unknown length norm '{s}'; using 'none' instead");
            LNorm::None
        }
    }

    /// Normalize a value by the string lengths.
    pub fn apply(self, d: f64, x: &HString, y: &HString) -> f64 {
        let (xl, yl) = (x.len() as f64, y.len() as f64);
        match self {
            LNorm::None => d,
            LNorm::Min => d / xl.min(yl),
            LNorm::Max => d / xl.max(yl),
            LNorm::Avg => d / (0.5 * (xl + yl)),
        }
    }

    /// Normalize a value by the string lengths scaled with a weight. Used by
    /// edit distances with uniform operation costs to map the distance into
    /// [0, 1].
    pub fn apply_weighted(self, d: f64, w: f64, x: &HString, y: &HString) -> f64 {
        let (xl, yl) = (x.len() as f64, y.len() as f64);
        match self {
            LNorm::None => d,
            LNorm::Min => d / (w * xl.min(yl)),
            LNorm::Max => d / (w * xl.max(yl)),
            LNorm::Avg => d / (w * 0.5 * (xl + yl)),
        }
    }
}

/// Kernel normalization variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KNorm {
    #[default]
    None,
    L2,
}

impl KNorm {
    /// Parse a configuration value; unknown names warn and fall back to
    /// `none`.
    pub fn parse(s: &str) -> KNorm {
        if s.eq_ignore_ascii_case("none") {
            KNorm::None
        } else if s.eq_ignore_ascii_case("l2") {
            KNorm::L2
        } else {
            warn!("unknown kernel norm '{s}'; using 'none' instead");
            KNorm::None
        }
    }
}

/// Apply kernel normalization to a computed value. For L2 the self-values
/// `K(x,x)` and `K(y,y)` come from the shared cache when available.
pub(crate) fn knorm_apply(
    m: &Measure,
    norm: KNorm,
    k: f64,
    x: &HString,
    y: &HString,
    kernel: CompareFn,
) -> f64 {
    match norm {
        KNorm::None => k,
        KNorm::L2 => {
            let xk = x.hash1();
            let xv = match m.cache().load(xk, CacheId::Norm) {
                Some(v) => v as f64,
                None => {
                    let v = kernel(m, x, x);
                    m.cache().store(xk, v as f32, CacheId::Norm);
                    v
                }
            };
            let yk = y.hash1();
            let yv = match m.cache().load(yk, CacheId::Norm) {
                Some(v) => v as f64,
                None => {
                    let v = kernel(m, y, y);
                    m.cache().store(yk, v as f32, CacheId::Norm);
                    v
                }
            };
            k / (xv * yv).sqrt()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_fallback() {
        assert_eq!(LNorm::parse("none"), LNorm::None);
        assert_eq!(LNorm::parse("MIN"), LNorm::Min);
        assert_eq!(LNorm::parse("avg"), LNorm::Avg);
        assert_eq!(LNorm::parse("bogus"), LNorm::None);
        assert_eq!(KNorm::parse("L2"), KNorm::L2);
        assert_eq!(KNorm::parse("bogus"), KNorm::None);
    }

    #[test]
    fn length_norms() {
        let x = HString::from("abcd");
        let y = HString::from("ab");
        assert_eq!(LNorm::None.apply(6.0, &x, &y), 6.0);
        assert_eq!(LNorm::Min.apply(6.0, &x, &y), 3.0);
        assert_eq!(LNorm::Max.apply(6.0, &x, &y), 1.5);
        assert_eq!(LNorm::Avg.apply(6.0, &x, &y), 2.0);
        assert_eq!(LNorm::Max.apply_weighted(6.0, 2.0, &x, &y), 0.75);
    }
}
