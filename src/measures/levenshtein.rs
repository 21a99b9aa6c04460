//! Levenshtein distance.
//!
//! Levenshtein. Binary codes capable of correcting deletions, insertions,
//! and reversals. Doklady Akademii Nauk SSSR, 163(4):845-848, 1966.
//!
//! Two implementations: a fast one-row variant (after David Necas' code)
//! that skips the two corner triangles when all operation costs are equal,
//! and a two-row weighted dynamic program (after Stephen Toub) otherwise.

use smallvec::{smallvec, SmallVec};

use crate::config::Config;
use crate::hstring::HString;
use crate::measures::{Measure, Opts};
use crate::norm::LNorm;

pub(crate) fn configure(cfg: &Config, opts: &mut Opts) {
    opts.cost_ins = cfg.get_float("measures.dist_levenshtein.cost_ins");
    opts.cost_del = cfg.get_float("measures.dist_levenshtein.cost_del");
    opts.cost_sub = cfg.get_float("measures.dist_levenshtein.cost_sub");
    opts.lnorm = LNorm::parse(cfg.get_str("measures.dist_levenshtein.norm"));
}

#[inline]
fn neq(x: &HString, i: usize, y: &HString, j: usize) -> usize {
    (HString::compare(x, i, y, j) != 0) as usize
}

/// Unit-cost Levenshtein distance with a single cost row. The two corner
/// triangles of the matrix cannot contain a best path and are skipped.
fn distance_uniform(x: &HString, y: &HString) -> usize {
    if x.is_empty() {
        return y.len();
    }
    if y.is_empty() {
        return x.len();
    }

    // Keep the inner cycle (y) the longer one.
    let (x, y) = if x.len() > y.len() { (y, x) } else { (x, y) };

    // The triangle skipping below breaks down for a single-symbol x.
    if x.len() == 1 {
        let hit = (0..y.len()).any(|k| neq(x, 0, y, k) == 0);
        return y.len() - hit as usize;
    }

    let len1 = x.len() + 1;
    let len2 = y.len() + 1;
    let half = len1 >> 1;

    let mut row: SmallVec<[usize; 64]> = smallvec![0; len2];
    for (i, slot) in row.iter_mut().enumerate().take(len2 - half) {
        *slot = i;
    }
    row[0] = len1 - half - 1;
    let mut end = len2 - 1;

    for i in 1..len1 {
        let char1 = i - 1;
        let mut p;
        let mut char2;
        let mut d;
        let mut k;

        if i >= len1 - half {
            // Skip the upper triangle.
            let offset = i - (len1 - half);
            char2 = offset;
            p = offset;
            let c3 = row[p] + neq(x, char1, y, char2);
            char2 += 1;
            p += 1;
            k = row[p] + 1;
            d = k;
            if k > c3 {
                k = c3;
            }
            row[p] = k;
            p += 1;
        } else {
            p = 1;
            char2 = 0;
            k = i;
            d = i;
        }

        // Skip the lower triangle.
        if i <= half + 1 {
            end = len2 + i - half - 2;
        }

        while p <= end {
            d -= 1;
            let c3 = d + neq(x, char1, y, char2);
            char2 += 1;
            k += 1;
            if k > c3 {
                k = c3;
            }
            d = row[p] + 1;
            if k > d {
                k = d;
            }
            row[p] = k;
            p += 1;
        }

        // Lower-triangle sentinel.
        if i <= half {
            d -= 1;
            let c3 = d + neq(x, char1, y, char2);
            k += 1;
            if k > c3 {
                k = c3;
            }
            row[p] = k;
        }
    }

    row[end]
}

/// Weighted Levenshtein distance keeping two physical rows.
fn distance_weighted(m: &Measure, x: &HString, y: &HString) -> f64 {
    let opts = m.opts();
    if x.is_empty() && y.is_empty() {
        return 0.0;
    }

    let width = y.len() + 1;
    let mut curr: SmallVec<[f64; 64]> = (0..width).map(|j| j as f64).collect();
    let mut next: SmallVec<[f64; 64]> = smallvec![0.0; width];

    for i in 1..=x.len() {
        next[0] = i as f64;
        for j in 1..=y.len() {
            let mut a = curr[j] + opts.cost_ins;
            let b = next[j - 1] + opts.cost_del;
            if a > b {
                a = b;
            }
            let b = curr[j - 1]
                + if neq(x, i - 1, y, j - 1) != 0 {
                    opts.cost_sub
                } else {
                    0.0
                };
            if a > b {
                a = b;
            }
            next[j] = a;
        }
        std::mem::swap(&mut curr, &mut next);
    }

    curr[y.len()]
}

pub(crate) fn compare(m: &Measure, x: &HString, y: &HString) -> f64 {
    let opts = m.opts();
    let uniform = (opts.cost_ins - opts.cost_del).abs() < 1e-6
        && (opts.cost_del - opts.cost_sub).abs() < 1e-6;

    let d = if uniform {
        opts.cost_ins * distance_uniform(x, y) as f64
    } else {
        distance_weighted(m, x, y)
    };

    match opts.lnorm {
        LNorm::None => d,
        norm if uniform => 1.0 - norm.apply_weighted(d, opts.cost_ins, x, y),
        norm => norm.apply(d, x, y),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::hstring::HString;
    use crate::measures::Measure;

    fn measure() -> Measure {
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_levenshtein");
        Measure::new(cfg).unwrap()
    }

    fn lev(x: &str, y: &str) -> f32 {
        measure().compare(&HString::from(x), &HString::from(y))
    }

    #[test]
    fn byte_cases() {
        let cases: &[(&str, &str, f32)] = &[
            ("", "", 0.0),
            ("a", "", 1.0),
            ("", "a", 1.0),
            ("a", "a", 0.0),
            ("ab", "ba", 2.0),
            ("bab", "ba", 1.0),
            ("abba", "babb", 2.0),
            ("a.b", "a.c", 1.0),
            (".a.b.", "a..c.", 3.0),
            ("abcd", "axcy", 2.0),
            ("abc", "axcy", 2.0),
            ("abcd", "xcy", 3.0),
            ("a", "b", 1.0),
            ("aa", "aa", 0.0),
            ("ab", "aa", 1.0),
            ("aba", "aaa", 1.0),
            ("a", "bab", 2.0),
            ("bbb", "a", 3.0),
            ("yyybca", "yyycba", 2.0),
            ("bcaxxx", "cbaxxx", 2.0),
            ("yyybcaxxx", "yyycbaxxx", 2.0),
        ];
        for &(x, y, v) in cases {
            assert_eq!(lev(x, y), v, "dist_levenshtein({x:?}, {y:?})");
        }
    }

    #[test]
    fn simmetrics_cases() {
        let cases: &[(&str, &str, f32)] = &[
            ("Healed", "Sealed", 1.0),
            ("Healed", "Healthy", 3.0),
            ("Healed", "Heard", 2.0),
            ("Healed", "Herded", 2.0),
            ("Healed", "Help", 3.0),
            ("Healed", "Sold", 4.0),
            ("Sam J Chapman", "Samuel John Chapman", 6.0),
            ("Sam Chapman", "S Chapman", 2.0),
            ("John Smith", "Samuel John Chapman", 14.0),
            ("John Smith", "Sam Chapman", 11.0),
            ("John Smith", "Sam J Chapman", 12.0),
            ("John Smith", "S Chapman", 9.0),
            (
                "Web Database Applications",
                "Web Database Applications with PHP & MySQL",
                17.0,
            ),
            (
                "Web Database Applications",
                "Creating Database Web Applications with PHP and ASP",
                28.0,
            ),
            (
                "Web Aplications",
                "Web Application Development With PHP",
                22.0,
            ),
        ];
        for &(x, y, v) in cases {
            assert_eq!(lev(x, y), v, "dist_levenshtein({x:?}, {y:?})");
        }
    }

    #[test]
    fn token_cases() {
        let mut cfg = Config::new();
        cfg.set("measures.measure", "dist_levenshtein");
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
        assert_eq!(dist("ab", "ba"), 1.0);
        assert_eq!(dist("abba", "babb"), 1.0);
        assert_eq!(dist("a.b", "a.c"), 1.0);
        assert_eq!(dist(".a.b.", "a..c."), 1.0);
        assert_eq!(dist(".x.y.", ".x.y."), 0.0);
        assert_eq!(dist("x...y..", "...x..y"), 0.0);
        assert_eq!(dist(".x.y", "x.y."), 0.0);
    }

    #[test]
    fn weighted_cases() {
        // (x, y, expected, cost_ins, cost_del, cost_sub)
        let cases: &[(&str, &str, f32, f64, f64, f64)] = &[
            ("abc", "ab", 1.0, 1.0, 1.0, 1.0),
            ("abc", "ab", 2.0, 2.0, 1.0, 1.0),
            ("abc", "ab", 3.0, 3.0, 1.0, 1.0),
            ("ab", "abc", 1.0, 1.0, 1.0, 1.0),
            ("ab", "abc", 2.0, 1.0, 2.0, 1.0),
            ("ab", "abc", 3.0, 1.0, 3.0, 1.0),
            ("abc", "adc", 1.0, 1.0, 1.0, 1.0),
            // Substitution d -> b
            ("abc", "adc", 2.0, 1.0, 1.0, 2.0),
            // Delete d + insert b
            ("abc", "adc", 2.0, 1.0, 1.0, 3.0),
            ("abc", "adc", 3.0, 1.0, 3.0, 3.0),
            ("abc", "adc", 3.0, 3.0, 1.0, 3.0),
            ("abc", "adc", 6.0, 4.0, 2.0, 15.0),
            ("abc", "adc", 4.0, 2.5, 1.5, 15.0),
        ];
        for &(x, y, v, ci, cd, cs) in cases {
            let mut m = measure();
            m.set("measures.dist_levenshtein.cost_ins", ci);
            m.set("measures.dist_levenshtein.cost_del", cd);
            m.set("measures.dist_levenshtein.cost_sub", cs);
            let d = m.compare(&HString::from(x), &HString::from(y));
            assert_eq!(d, v, "weighted({x:?}, {y:?}, {ci}/{cd}/{cs})");
        }
    }

    #[test]
    fn normalized_similarity_in_unit_range() {
        let mut m = measure();
        m.set("measures.dist_levenshtein.norm", "max");
        let x = HString::from("Healed");
        let y = HString::from("Sealed");
        let d = m.compare(&x, &y);
        // Similarity form: 1 - d / max(|x|, |y|).
        assert!((d - (1.0 - 1.0 / 6.0)).abs() < 1e-6);
        assert_eq!(m.compare(&x, &x), 1.0);
    }
}
