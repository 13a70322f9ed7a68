//! Mixed-effects logistic regression with a single random intercept factor.
//!
//! Estimation is penalized IRLS (the single-integration-point approximation):
//! given the intercept variance, the working weighted least-squares system is
//! solved with the random intercepts treated as ridge-penalized coefficients;
//! the variance is then re-estimated from the posterior means and variances of
//! the intercepts, and the two steps alternate to convergence.
//!
//! The random block of the penalized normal matrix is diagonal (each row
//! belongs to exactly one constituency), so the solve reduces to a Schur
//! complement onto the fixed-effect block.

use std::collections::HashMap;

use anyhow::{Result, anyhow, ensure};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::model::design::{N_FIXED, design_row};
use crate::types::{AgeBand, ConstCode, Education};

/// One training observation: fixed-effect row, group index, binary outcome.
#[derive(Debug, Clone)]
pub struct TrainRow {
    pub x: [f64; N_FIXED],
    pub group: usize,
    pub y: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct FitConfig {
    pub max_outer: usize,
    pub max_inner: usize,
    pub tol: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self { max_outer: 30, max_inner: 50, tol: 1e-6 }
    }
}

/// Convergence summary of one fit, carried into the run manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub outcome: String,
    pub converged: bool,
    pub iterations: usize,
    pub sigma2: f64,
    pub deviance: f64,
    pub n_obs: usize,
    pub n_groups: usize,
}

/// A fitted model: a function from (sex, age, education, constituency) to a
/// predicted probability. Constituencies unseen in training predict with a
/// zero random effect (fixed effects only).
#[derive(Debug, Clone)]
pub struct FittedModel {
    fixed: [f64; N_FIXED],
    random: HashMap<ConstCode, f64>,
    pub diagnostics: FitDiagnostics,
}

impl FittedModel {
    pub fn predict(&self, female: bool, age: AgeBand, education: Education, code: &ConstCode) -> f64 {
        let x = design_row(female, age, education);
        let eta = dot(&x, &self.fixed) + self.random.get(code).copied().unwrap_or(0.0);
        inv_logit(eta)
    }

    /// Estimated random intercept for a constituency seen in training.
    pub fn random_effect(&self, code: &ConstCode) -> Option<f64> {
        self.random.get(code).copied()
    }

    pub fn fixed_effects(&self) -> &[f64; N_FIXED] {
        &self.fixed
    }
}

/// Fit one model. Pure: no state is shared between fits.
pub fn fit(
    outcome: &str,
    rows: &[TrainRow],
    groups: &[ConstCode],
    config: &FitConfig,
) -> Result<FittedModel> {
    let n = rows.len();
    let j = groups.len();
    ensure!(n > 0, "[model::glmm] {outcome}: no observations to fit");
    ensure!(j > 0, "[model::glmm] {outcome}: no grouping levels");
    ensure!(
        rows.iter().all(|row| row.group < j),
        "[model::glmm] {outcome}: group index out of range"
    );
    let positives = rows.iter().filter(|row| row.y > 0.5).count();
    ensure!(
        positives > 0 && positives < n,
        "[model::glmm] {outcome}: outcome is constant ({positives}/{n} positive)"
    );

    let p = N_FIXED;
    let mut beta = DVector::<f64>::zeros(p);
    let mut u = vec![0.0_f64; j];
    let mut sigma2 = 1.0_f64;
    let mut penalized_diag = vec![0.0_f64; j];
    let mut converged = false;
    let mut iterations = 0;

    for outer in 1..=config.max_outer {
        iterations = outer;

        // Penalized IRLS at fixed sigma2.
        for _ in 0..config.max_inner {
            let mut a_ff = DMatrix::<f64>::zeros(p, p);
            let mut a_fu = DMatrix::<f64>::zeros(p, j);
            let mut b_f = DVector::<f64>::zeros(p);
            let mut b_u = vec![0.0_f64; j];
            penalized_diag.iter_mut().for_each(|v| *v = 1.0 / sigma2);

            for row in rows {
                let eta = dot(&row.x, beta.as_slice()) + u[row.group];
                let mu = inv_logit(eta);
                let w = (mu * (1.0 - mu)).max(1e-10);
                let z = eta + (row.y - mu) / w;

                for a in 0..p {
                    let wxa = w * row.x[a];
                    for b in a..p {
                        a_ff[(a, b)] += wxa * row.x[b];
                    }
                    a_fu[(a, row.group)] += wxa;
                    b_f[a] += wxa * z;
                }
                penalized_diag[row.group] += w;
                b_u[row.group] += w * z;
            }
            for a in 0..p {
                for b in 0..a {
                    a_ff[(a, b)] = a_ff[(b, a)];
                }
            }

            // Schur complement onto the fixed block; the random block is diagonal.
            let mut schur = a_ff;
            let mut rhs = b_f;
            for g in 0..j {
                let inv_d = 1.0 / penalized_diag[g];
                for a in 0..p {
                    let ca = a_fu[(a, g)] * inv_d;
                    rhs[a] -= ca * b_u[g];
                    for b in 0..p {
                        schur[(a, b)] -= ca * a_fu[(b, g)];
                    }
                }
            }

            let beta_new = solve_symmetric(&schur, &rhs)
                .ok_or_else(|| anyhow!("[model::glmm] {outcome}: singular working system"))?;

            let mut delta = (0..p).map(|a| (beta_new[a] - beta[a]).abs()).fold(0.0, f64::max);
            for g in 0..j {
                let fu_beta: f64 = (0..p).map(|a| a_fu[(a, g)] * beta_new[a]).sum();
                let u_new = (b_u[g] - fu_beta) / penalized_diag[g];
                delta = delta.max((u_new - u[g]).abs());
                u[g] = u_new;
            }
            beta = beta_new;

            if delta < config.tol {
                break;
            }
        }

        // Variance update from posterior means and variances of the intercepts;
        // the posterior variance is approximated by the inverse penalized
        // diagonal (fixed-effect uncertainty ignored).
        let sum_sq: f64 = u.iter().map(|v| v * v).sum();
        let trace: f64 = penalized_diag.iter().map(|v| 1.0 / v).sum();
        let sigma2_new = ((sum_sq + trace) / j as f64).max(1e-8);

        let done = (sigma2_new - sigma2).abs() < config.tol * sigma2.max(1.0);
        sigma2 = sigma2_new;
        if done {
            converged = true;
            break;
        }
    }

    let mut deviance = 0.0;
    for row in rows {
        let eta = dot(&row.x, beta.as_slice()) + u[row.group];
        let mu = inv_logit(eta).clamp(1e-12, 1.0 - 1e-12);
        deviance -= 2.0 * (row.y * mu.ln() + (1.0 - row.y) * (1.0 - mu).ln());
    }

    let mut fixed = [0.0; N_FIXED];
    fixed.copy_from_slice(beta.as_slice());
    let random = groups.iter().cloned().zip(u.iter().copied()).collect();

    Ok(FittedModel {
        fixed,
        random,
        diagnostics: FitDiagnostics {
            outcome: outcome.to_string(),
            converged,
            iterations,
            sigma2,
            deviance,
            n_obs: n,
            n_groups: j,
        },
    })
}

#[inline]
fn inv_logit(eta: f64) -> f64 {
    1.0 / (1.0 + (-eta).exp())
}

#[inline]
fn dot(x: &[f64; N_FIXED], beta: &[f64]) -> f64 {
    x.iter().zip(beta).map(|(a, b)| a * b).sum()
}

/// Solve the symmetric working system, preferring Cholesky.
///
/// Near-singular designs (an empty category in a small survey) fail the
/// Cholesky factorization; fall back to SVD with progressively looser
/// tolerances.
fn solve_symmetric(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    if let Some(chol) = a.clone().cholesky() {
        let x = chol.solve(b);
        if x.iter().all(|v| v.is_finite()) {
            return Some(x);
        }
    }

    let svd = a.clone().svd(true, true);
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(x) = svd.solve(b, tol) {
            if x.iter().all(|v| v.is_finite()) {
                return Some(x);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(x_female: bool, group: usize, y: f64) -> TrainRow {
        TrainRow {
            x: design_row(x_female, AgeBand::A16To24, Education::NoQualifications),
            group,
            y,
        }
    }

    fn codes(n: usize) -> Vec<ConstCode> {
        (0..n).map(|i| ConstCode::new(&format!("E{i}"))).collect()
    }

    #[test]
    fn intercept_recovery_on_balanced_data() {
        // 30 observations, half positive, one group: the intercept should sit
        // near logit(0.5) = 0 and the prediction near 0.5.
        let rows: Vec<TrainRow> = (0..30).map(|i| row(false, 0, (i % 2) as f64)).collect();
        let model = fit("test", &rows, &codes(1), &FitConfig::default()).unwrap();

        let p = model.predict(false, AgeBand::A16To24, Education::NoQualifications, &ConstCode::new("E0"));
        assert!((p - 0.5).abs() < 0.05, "predicted {p}");
    }

    #[test]
    fn group_effects_order_matches_group_rates() {
        // Group 0 mostly positive, group 1 mostly negative.
        let mut rows = Vec::new();
        for i in 0..40 {
            rows.push(row(false, 0, if i % 5 == 0 { 0.0 } else { 1.0 }));
            rows.push(row(false, 1, if i % 5 == 0 { 1.0 } else { 0.0 }));
        }
        let model = fit("test", &rows, &codes(2), &FitConfig::default()).unwrap();

        let u0 = model.random_effect(&ConstCode::new("E0")).unwrap();
        let u1 = model.random_effect(&ConstCode::new("E1")).unwrap();
        assert!(u0 > u1, "u0={u0} u1={u1}");

        let p0 = model.predict(false, AgeBand::A16To24, Education::NoQualifications, &ConstCode::new("E0"));
        let p1 = model.predict(false, AgeBand::A16To24, Education::NoQualifications, &ConstCode::new("E1"));
        assert!(p0 > 0.5 && p1 < 0.5, "p0={p0} p1={p1}");
    }

    #[test]
    fn unseen_group_uses_fixed_effects_only() {
        let mut rows = Vec::new();
        for i in 0..40 {
            rows.push(row(false, 0, if i % 3 == 0 { 0.0 } else { 1.0 }));
            rows.push(row(false, 1, if i % 3 == 0 { 1.0 } else { 0.0 }));
        }
        let model = fit("test", &rows, &codes(2), &FitConfig::default()).unwrap();

        assert_eq!(model.random_effect(&ConstCode::new("E9")), None);

        let unseen = model.predict(false, AgeBand::A16To24, Education::NoQualifications, &ConstCode::new("E9"));
        let x = design_row(false, AgeBand::A16To24, Education::NoQualifications);
        let eta: f64 = x.iter().zip(model.fixed_effects()).map(|(a, b)| a * b).sum();
        assert!((unseen - 1.0 / (1.0 + (-eta).exp())).abs() < 1e-12);
    }

    #[test]
    fn partial_pooling_shrinks_small_groups() {
        // Group 1 has 4 observations, all positive; complete separation would
        // send an unpooled intercept to infinity. Partial pooling keeps the
        // prediction strictly inside (0, 1).
        let mut rows: Vec<TrainRow> = (0..100).map(|i| row(false, 0, (i % 2) as f64)).collect();
        for _ in 0..4 {
            rows.push(row(false, 1, 1.0));
        }
        let model = fit("test", &rows, &codes(2), &FitConfig::default()).unwrap();

        let p = model.predict(false, AgeBand::A16To24, Education::NoQualifications, &ConstCode::new("E1"));
        assert!(p > 0.5 && p < 0.95, "small all-positive group predicted {p}");
    }

    #[test]
    fn predictions_stay_in_unit_interval() {
        let mut rows = Vec::new();
        for i in 0..20 {
            rows.push(TrainRow {
                x: design_row(i % 2 == 0, AgeBand::A65Plus, Education::Level4),
                group: i % 3,
                y: if i % 4 == 0 { 0.0 } else { 1.0 },
            });
        }
        let model = fit("test", &rows, &codes(3), &FitConfig::default()).unwrap();

        for band in AgeBand::order().into_iter().filter(AgeBand::voting_age) {
            for education in Education::order() {
                for female in [false, true] {
                    let p = model.predict(female, band, education, &ConstCode::new("E0"));
                    assert!((0.0..=1.0).contains(&p));
                }
            }
        }
    }

    #[test]
    fn constant_outcome_is_an_error() {
        let rows: Vec<TrainRow> = (0..10).map(|_| row(false, 0, 1.0)).collect();
        assert!(fit("test", &rows, &codes(1), &FitConfig::default()).is_err());
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(fit("test", &[], &codes(1), &FitConfig::default()).is_err());
    }
}
