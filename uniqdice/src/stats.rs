use approx::relative_eq;
use claim::{debug_assert_ge, debug_assert_le};
use log::debug;
use ndarray::{ArrayView1, Zip};
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

const EPS: f64 = 1e-10;

/// The [Wilson score interval](https://www.wikiwand.com/en/Binomial_proportion_confidence_interval#Wilson_score_interval)
/// for a binomial proportion after observing `successes` out of `n` trials.
///
/// `confidence` is the two-sided confidence level, e.g. `0.99`. Unlike the
/// plain normal approximation, the interval stays inside `[0, 1]` and behaves
/// well for proportions near the edges, which matters here since we win most
/// games.
pub fn wilson_interval(successes: u64, n: u64, confidence: f64) -> Result<(f64, f64), String> {
    if n == 0 {
        return Err("need at least one trial for a confidence interval".to_string());
    }
    if successes > n {
        return Err(format!("more successes ({successes}) than trials ({n})"));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(format!("confidence level must be in (0, 1): {confidence}"));
    }

    let z = std_normal_quantile(1.0 - (1.0 - confidence) / 2.0)?;
    let n = n as f64;
    let p_hat = successes as f64 / n;
    let z2_n = z * z / n;

    let center = (p_hat + z2_n / 2.0) / (1.0 + z2_n);
    let half_width =
        (z / (1.0 + z2_n)) * ((p_hat * (1.0 - p_hat) / n) + (z2_n / (4.0 * n))).sqrt();

    Ok(((center - half_width).max(0.0), (center + half_width).min(1.0)))
}

/// The inverse CDF of the standard normal distribution.
pub fn std_normal_quantile(p: f64) -> Result<f64, String> {
    let normal = Normal::new(0.0, 1.0).map_err(|err| err.to_string())?;
    Ok(normal.inverse_cdf(p))
}

/// Return true iff `supp(p) ⊆ supp(q)` for dense PMFs `p` and `q`.
pub fn is_pmf_subset(p: ArrayView1<f64>, q: ArrayView1<f64>) -> bool {
    Zip::from(p).and(q).all(|&p_i, &q_i| {
        // A = (q_i == 0.0)
        // B = (p_i == 0.0)
        // (A ==> B) <==> (¬A ∨ B)
        (q_i > 0.0) || (p_i <= 0.0)
    })
}

/// Compute the [KL-divergence](https://www.wikiwand.com/en/Kullback%E2%80%93Leibler_divergence).
/// between dense PMFs `p` and `q`.
///
/// `D_{KL}(p || q) = \sum_i p_i * \ln(p_i / q_i)`
///
/// Note: p's support must be a subset of q's support (`q_i = 0` implies `p_i = 0`).
pub fn kl_divergence(p: ArrayView1<f64>, q: ArrayView1<f64>) -> f64 {
    debug_assert!(is_pmf_subset(p, q));

    Zip::from(p)
        .and(q)
        .fold(0.0, |sum, &p_i, &q_i| sum + kl_div_term(p_i, q_i))
}

#[inline]
fn kl_div_term(p_i: f64, q_i: f64) -> f64 {
    if p_i <= EPS {
        0.0
    } else if q_i > EPS {
        p_i * (p_i / q_i).ln()
    } else {
        f64::INFINITY
    }
}

/// The G-test statistic, `2 * n * D_{KL}(p_hat || p)`.
///
/// `n`: the number of samples
/// `p`: the expected PMF
/// `p_hat`: the observed PMF
///
/// Asymptotically approximates the chi^2-test statistic.
pub fn g_test(n: usize, p: ArrayView1<f64>, p_hat: ArrayView1<f64>) -> f64 {
    (n as f64) * (2.0 * kl_divergence(p_hat, p))
}

/// The CDF of the Chi^2-distribution with `dof` degrees-of-freedom.
pub fn chisq_cdf(dof: f64, x: f64) -> Result<f64, String> {
    let chisq = ChiSquared::new(dof).map_err(|err| err.to_string())?;
    Ok(chisq.cdf(x))
}

/// A goodness-of-fit test between a hypothesized multinomial distribution, `p`,
/// and an experimentally observed distribution, `p_hat`, both represented as
/// dense PMFs. `n` is the number of samples taken to construct `p_hat`.
///
/// Returns a p-value, `Pr[G(x) >= G(p_hat) | H_0: x ~ p]`.
pub fn multinomial_test(
    n: usize,
    p: ArrayView1<f64>,
    p_hat: ArrayView1<f64>,
) -> Result<f64, String> {
    debug_assert!(relative_eq!(p.sum(), 1.0, epsilon = 1e-9));
    debug_assert!(relative_eq!(p_hat.sum(), 1.0, epsilon = 1e-9));

    let nnz = p.fold(0.0, |nnz, &x| nnz + if x > 0.0 { 1.0 } else { 0.0 });
    let dof = nnz - 1.0;

    debug_assert_le!(nnz, p.dim() as f64);
    debug_assert_ge!(dof, 1.0);

    // impossible to draw p_hat from p
    if !is_pmf_subset(p_hat, p) {
        return Ok(0.0);
    }

    let g = g_test(n, p, p_hat);
    let pvalue = 1.0 - chisq_cdf(dof, g)?;

    debug!(
        "multinomial_test: n: {n}, |p|: {}, dof: {dof}, g: {g}, p-value: {pvalue}",
        p.dim()
    );

    Ok(pvalue)
}
