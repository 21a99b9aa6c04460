//! Similarity matrix driver.
//!
//! Owns the rectangular (or triangular) buffer of comparison results over a
//! configured row/column range of the input strings, optionally restricted
//! to one contiguous chunk of the linear cell list (`split`). Computation
//! fans the cell list out over a rayon pool sized by
//! `measures.num_threads`; each cell value is deterministic while the write
//! order between cells is not.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::config::Config;
use crate::error::Error;
use crate::hstring::HString;
use crate::measures::Measure;

/// Half-open index range into the string collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Parse `"start:end"` with an empty start meaning 0 and an empty end
/// meaning `num`. `start >= end` is invalid.
pub fn parse_range(spec: &str, num: usize) -> Result<Range, Error> {
    if spec.is_empty() {
        return Ok(Range {
            start: 0,
            end: num,
        });
    }
    let invalid = || Error::InvalidRange(spec.to_string());
    let (a, b) = spec.split_once(':').ok_or_else(invalid)?;
    let start = if a.is_empty() {
        0
    } else {
        a.trim().parse::<usize>().map_err(|_| invalid())?
    };
    let end = if b.is_empty() {
        num
    } else {
        b.trim().parse::<usize>().map_err(|_| invalid())?
    };
    if start >= end {
        return Err(invalid());
    }
    if end > num {
        return Err(Error::RangeOutOfBounds { start, end, num });
    }
    Ok(Range { start, end })
}

/// Parse `"blocks:id"`; empty means "no split".
fn parse_split(spec: &str) -> Result<Option<(usize, usize)>, Error> {
    if spec.is_empty() {
        return Ok(None);
    }
    let invalid = || Error::InvalidSplit(spec.to_string());
    let (blocks, id) = spec.split_once(':').ok_or_else(invalid)?;
    let blocks = blocks.trim().parse::<usize>().map_err(|_| invalid())?;
    let id = id.trim().parse::<usize>().map_err(|_| invalid())?;
    if blocks == 0 || id >= blocks {
        return Err(invalid());
    }
    Ok(Some((blocks, id)))
}

/// Geometry of the stored cell list, shared with worker closures.
#[derive(Debug, Clone, Copy)]
struct Geom {
    row: Range,
    col: Range,
    triangular: bool,
}

impl Geom {
    /// Number of stored cells before any split.
    fn total_cells(&self) -> usize {
        if self.triangular {
            let n = self.row.len();
            n * (n + 1) / 2
        } else {
            self.row.len() * self.col.len()
        }
    }

    /// Absolute `(i, j)` of a linear cell index.
    fn cell(&self, lin: usize) -> (usize, usize) {
        if self.triangular {
            // Invert the row-major upper-triangle offset; the float guess is
            // corrected to be safe against rounding.
            let n = self.row.len();
            let nf = 2.0 * n as f64 + 1.0;
            let mut a =
                ((nf - (nf * nf - 8.0 * lin as f64).sqrt()) / 2.0).floor() as usize;
            a = a.min(n - 1);
            while self.tri_offset(a) > lin {
                a -= 1;
            }
            while a + 1 < n && self.tri_offset(a + 1) <= lin {
                a += 1;
            }
            let b = a + (lin - self.tri_offset(a));
            (self.row.start + a, self.col.start + b)
        } else {
            let w = self.col.len();
            (self.row.start + lin / w, self.col.start + lin % w)
        }
    }

    /// Linear index of the first cell of triangle row `a`.
    fn tri_offset(&self, a: usize) -> usize {
        let n = self.row.len();
        a * n - a * a.saturating_sub(1) / 2
    }

    /// Linear index of absolute `(i, j)`; reflects below-diagonal reads of a
    /// triangular matrix.
    fn linear(&self, i: usize, j: usize) -> Option<usize> {
        if self.triangular {
            let mut a = i.checked_sub(self.row.start)?;
            let mut b = j.checked_sub(self.col.start)?;
            let n = self.row.len();
            if a >= n || b >= n {
                return None;
            }
            if a > b {
                std::mem::swap(&mut a, &mut b);
            }
            Some(self.tri_offset(a) + (b - a))
        } else {
            let a = i.checked_sub(self.row.start)?;
            let b = j.checked_sub(self.col.start)?;
            if a >= self.row.len() || b >= self.col.len() {
                return None;
            }
            Some(a * self.col.len() + b)
        }
    }
}

/// The owned result buffer plus its view geometry.
pub struct Matrix {
    values: Vec<f32>,
    geom: Geom,
    cell_start: usize,
    cell_end: usize,
}

impl Matrix {
    /// Full symmetric matrix over `num` strings.
    pub fn new(num: usize) -> Matrix {
        let full = Range {
            start: 0,
            end: num,
        };
        Matrix::with_ranges(full, full)
    }

    /// Matrix over explicit ranges. Equal ranges store only the upper
    /// triangle including the diagonal.
    pub fn with_ranges(row: Range, col: Range) -> Matrix {
        let geom = Geom {
            row,
            col,
            triangular: row == col,
        };
        let total = geom.total_cells();
        Matrix {
            values: vec![0.0; total],
            geom,
            cell_start: 0,
            cell_end: total,
        }
    }

    /// Resolve ranges and split from `measures.{row_range,col_range,split}`.
    pub fn from_config(cfg: &Config, num: usize) -> Result<Matrix, Error> {
        let row = parse_range(cfg.get_str("measures.row_range"), num)?;
        let col = parse_range(cfg.get_str("measures.col_range"), num)?;
        let mut mat = Matrix::with_ranges(row, col);
        if let Some((blocks, id)) = parse_split(cfg.get_str("measures.split"))? {
            mat = mat.split(blocks, id);
        }
        Ok(mat)
    }

    /// Keep only chunk `id` of the cell list partitioned into `blocks`
    /// contiguous chunks of as-equal size as possible.
    pub fn split(mut self, blocks: usize, id: usize) -> Matrix {
        assert!(id < blocks, "split id out of range");
        let total = self.geom.total_cells();
        let base = total / blocks;
        let rem = total % blocks;
        let start = id * base + id.min(rem);
        let len = base + usize::from(id < rem);
        self.cell_start = start;
        self.cell_end = start + len;
        self.values = vec![0.0; len];
        self
    }

    pub fn row_range(&self) -> Range {
        self.geom.row
    }

    pub fn col_range(&self) -> Range {
        self.geom.col
    }

    pub fn is_triangular(&self) -> bool {
        self.geom.triangular
    }

    /// Number of cells owned by this view (after any split).
    pub fn len(&self) -> usize {
        self.cell_end - self.cell_start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate the owned cells in linear order as `(i, j, value)` with
    /// absolute string indices. This is the order writers serialize.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, f32)> + '_ {
        self.values.iter().enumerate().map(move |(k, &v)| {
            let (i, j) = self.geom.cell(self.cell_start + k);
            (i, j, v)
        })
    }

    /// Value at absolute `(i, j)`. Triangular views reflect across the
    /// diagonal; cells outside the ranges or the owned split are `None`.
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        let lin = self.geom.linear(i, j)?;
        if lin < self.cell_start || lin >= self.cell_end {
            return None;
        }
        Some(self.values[lin - self.cell_start])
    }

    /// Store a value at absolute `(i, j)`. Out-of-view writes panic.
    pub fn set(&mut self, i: usize, j: usize, v: f32) {
        let lin = self
            .geom
            .linear(i, j)
            .expect("matrix position outside the configured ranges");
        assert!(
            lin >= self.cell_start && lin < self.cell_end,
            "matrix position outside the owned split"
        );
        self.values[lin - self.cell_start] = v;
    }

    /// Compute every owned cell with the configured measure. Strings must
    /// already be preprocessed.
    pub fn compute(&mut self, measure: &Measure, strs: &[HString]) {
        assert!(
            self.geom.row.end <= strs.len() && self.geom.col.end <= strs.len(),
            "matrix ranges exceed the string collection"
        );
        let geom = self.geom;
        let start = self.cell_start;
        let pool = thread_pool(measure.config().get_int("measures.num_threads"));
        log::info!(
            "computing {} cells of measure '{}' with {} threads",
            self.len(),
            measure.name(),
            pool.current_num_threads()
        );
        pool.install(|| {
            self.values.par_iter_mut().enumerate().for_each(|(k, v)| {
                let (i, j) = geom.cell(start + k);
                *v = measure.compare(&strs[i], &strs[j]);
            });
        });
    }

    /// Run comparisons over the owned cells for a wall-clock budget and
    /// report how many completed. Wall clock is polled between cells only.
    pub fn benchmark(&self, measure: &Measure, strs: &[HString], budget: Duration) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let geom = self.geom;
        let start = self.cell_start;
        let owned = self.len() as u64;
        let cursor = AtomicU64::new(0);
        let count = AtomicU64::new(0);
        let started = Instant::now();

        let pool = thread_pool(measure.config().get_int("measures.num_threads"));
        pool.broadcast(|_| {
            loop {
                if started.elapsed() >= budget {
                    break;
                }
                let k = cursor.fetch_add(1, Ordering::Relaxed) % owned;
                let (i, j) = geom.cell(start + k as usize);
                let _ = measure.compare(&strs[i], &strs[j]);
                count.fetch_add(1, Ordering::Relaxed);
            }
        });

        count.load(Ordering::Relaxed)
    }
}

fn thread_pool(num_threads: i64) -> rayon::ThreadPool {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if num_threads > 0 {
        builder = builder.num_threads(num_threads as usize);
    }
    builder.build().expect("failed to build worker thread pool")
}
