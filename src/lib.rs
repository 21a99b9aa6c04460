//! Compute similarity and dissimilarity matrices over string collections.
//!
//! Strings are normalized into a uniform representation at one of three
//! granularities (bytes, bits, hashed tokens), compared pairwise with a
//! pluggable measure (edit distances, bag and set coefficients, compression
//! distance, convolution kernels), and the results are collected into a
//! triangular or rectangular matrix computed in parallel. A shared
//! lock-protected value cache deduplicates per-string sub-results across
//! measures and threads.
//!
//! ```
//! use simatrix::{Config, HString, Matrix, Measure};
//!
//! let mut cfg = Config::new();
//! cfg.set("measures.measure", "dist_levenshtein");
//! let measure = Measure::new(cfg).unwrap();
//! let plan = measure.preproc().unwrap();
//!
//! let mut strs: Vec<HString> =
//!     ["rick", "nick", "mick"].iter().map(|s| HString::from(*s)).collect();
//! plan.apply_all(&mut strs);
//!
//! let mut matrix = Matrix::new(strs.len());
//! matrix.compute(&measure, &strs);
//! assert_eq!(matrix.get(0, 1), Some(1.0));
//! assert_eq!(matrix.get(1, 0), Some(1.0));
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fixture;
pub mod hash;
pub mod hstring;
pub mod matrix;
pub mod measures;
pub mod norm;

pub use cache::{CacheId, CacheStats, VCache};
pub use config::{Config, Value};
pub use error::Error;
pub use hstring::{load_stoptokens, DelimSet, Granularity, HString, Preproc, Sym};
pub use matrix::{parse_range, Matrix, Range};
pub use measures::{match_name, measure_names, Measure};
pub use norm::{KNorm, LNorm};
