//! Normalized compression distance (NCD).
//!
//! Cilibrasi, Vitanyi. Clustering by compression. IEEE Transactions on
//! Information Theory, 51(4):1523-1545, 2005. Compressed lengths come from
//! zlib-format Deflate at the configured level; all four lengths entering
//! the formula are memoized in the shared cache.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::cache::CacheId;
use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{Measure, Opts};

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    let level = cfg.get_int("measures.dist_compression.level");
    if !(0..=9).contains(&level) {
        log::warn!("compression level {level} out of range; using 9 instead");
        opts.level = 9;
    } else {
        opts.level = level as u32;
    }
}

fn compressed_len(level: u32, data: &[u8]) -> f64 {
    let mut enc = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 2 + 64),
        Compression::new(level),
    );
    enc.write_all(data)
        .expect("compressing into memory cannot fail");
    let out = enc.finish().expect("compressing into memory cannot fail");
    out.len() as f64
}

/// Compressed length of one string, memoized by its hash.
fn len1(m: &Measure, x: &HString) -> f64 {
    let key = x.hash1();
    if let Some(v) = m.cache().load(key, CacheId::CompressStr) {
        return v as f64;
    }
    let v = compressed_len(m.opts().level, &x.payload_bytes());
    m.cache().store(key, v as f32, CacheId::CompressStr);
    v
}

/// Compressed length of the concatenated pair, memoized by the directed
/// pair hash so the two concatenation orders cache separately.
fn len2(m: &Measure, x: &HString, y: &HString) -> f64 {
    let key = HString::hash2_ordered(x, y);
    if let Some(v) = m.cache().load(key, CacheId::CompressPair) {
        return v as f64;
    }
    let xb = x.payload_bytes();
    let yb = y.payload_bytes();
    let mut buf = Vec::with_capacity(xb.len() + yb.len());
    buf.extend_from_slice(&yb);
    buf.extend_from_slice(&xb);
    let v = compressed_len(m.opts().level, &buf);
    m.cache().store(key, v as f32, CacheId::CompressPair);
    v
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let xl = len1(m, x);
    let yl = len1(m, y);
    let xyl = len2(m, x, y);
    let yxl = len2(m, y, x);

    // Symmetric version of the distance.
    (0.5 * (xyl + yxl) - xl.min(yl)) / xl.max(yl)
}
