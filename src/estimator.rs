//! The register-histogram-driven cardinality estimator.
//!
//! Implements Ertl's improved HyperLogLog estimator (2017), which replaces
//! the original paper's piecewise small/large-range corrections with a
//! single formula: `sigma` corrects for the mass in the zero bucket, `tau`
//! corrects for the mass past the tail bucket `q+1`, and the sum over the
//! interior buckets is the classic harmonic mean term. A fresh sketch has
//! all mass in `histogram[0]`, so `sigma(1.0) = ∞` and the estimate is
//! exactly `0.0` without any special-casing.

/// `sigma(x) = x + sum_{k>=1} x^(2^k) * 2^(k-1)`, the correction term for
/// the proportion `x` of registers still at zero. Diverges to infinity at
/// `x == 1`, which is what drives a fresh histogram to an estimate of zero.
fn sigma(x: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&x));
    if x == 1.0 {
        return f64::INFINITY;
    }

    let mut prev = 0.0;
    let mut acc = x;
    let mut x_pow = x * x;
    let mut scale = 1.0;

    loop {
        prev = acc;
        acc += x_pow * scale;
        x_pow *= x_pow;
        scale += scale;
        if (acc - prev).abs() < 1e-12 {
            break;
        }
    }

    acc
}

/// `tau(x) = 1/3 * (1 - x - sum_{k>=1} (1 - x^(2^-k))^2 * 2^-k)`, the
/// correction term for the proportion `x` of registers past the tail
/// bucket.
fn tau(x: f64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&x));
    if x == 0.0 || x == 1.0 {
        return 0.0;
    }

    let mut prev = 0.0;
    let mut acc = 1.0 - x;
    let mut x_pow = x;
    let mut scale = 1.0;

    loop {
        prev = acc;
        x_pow = x_pow.sqrt();
        scale *= 0.5;
        let term = (1.0 - x_pow).powi(2) * scale;
        acc -= term;
        if (acc - prev).abs() < 1e-12 {
            break;
        }
    }

    acc / 3.0
}

/// Folds a fixed-width `[u32; 65]` register histogram into the `q+2`
/// buckets Ertl's formula operates over, where `q = 64 - p`: bucket `0` is
/// the zero registers, buckets `1..=q` are the interior harmonic-mean
/// terms, and bucket `q+1` absorbs every register value past the tail
/// (ranks are derived capped at 63, so this never loses a nonzero count
/// for the `p` range this crate supports).
fn fold_histogram(histogram: &[u32; 65], q: usize) -> Vec<f64> {
    let mut c = vec![0f64; q + 2];
    for (v, &count) in histogram.iter().enumerate() {
        let bucket = v.min(q + 1);
        c[bucket] += count as f64;
    }
    c
}

pub(crate) fn estimate(p: u32, m: u32, alpha_msquared: f64, histogram: &[u32; 65]) -> f64 {
    let q = (64 - p) as usize;
    let c = fold_histogram(histogram, q);
    let m_f = m as f64;

    let mut denominator = m_f * sigma(c[0] / m_f);
    for (k, &count) in c.iter().enumerate().take(q + 1).skip(1) {
        denominator += count * 2f64.powi(-(k as i32));
    }
    denominator += m_f * tau(1.0 - c[q + 1] / m_f) * 2f64.powi(-(q as i32));

    if denominator == f64::INFINITY {
        return 0.0;
    }

    alpha_msquared / denominator
}
