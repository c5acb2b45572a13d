//! Adaptive ODE integration for the physiological model.
//!
//! Implements the Dormand–Prince 5(4) embedded Runge–Kutta pair with
//! first-same-as-last reuse and per-component error scaling. Concentrations in
//! this model span roughly 1e-15 to 1e-2, so the absolute tolerance is scaled by
//! each component's initial magnitude rather than applied uniformly.
//!
//! The span is cut at every output grid point and at every forcing
//! discontinuity reported by the system, so no step straddles a meal onset.
//!
//! Reference: Dormand JR, Prince PJ. J Comput Appl Math. 1980;6:19-26
//! Reference: Hairer E, Nørsett SP, Wanner G. Solving ODEs I, 2nd ed., 1993

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

// Dormand–Prince 5(4) tableau
const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (also row 7 of the tableau)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Difference between 5th and 4th order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

/// Output grid points closer than this (hours) are merged
const TIME_EPSILON: f64 = 1e-12;

/// Steps between wall-clock budget checks
const BUDGET_CHECK_INTERVAL: u64 = 256;

/// A system of ordinary differential equations dy/dt = f(t, y)
pub trait OdeSystem {
    /// Number of state variables
    fn dimension(&self) -> usize;

    /// Write f(t, y) into `dydt`
    fn derivatives(&self, t: f64, y: &[f64], dydt: &mut [f64]);

    /// Times in (t0, t1) where f is discontinuous
    fn breakpoints(&self, _t0: f64, _t1: f64) -> Vec<f64> {
        Vec::new()
    }
}

/// Configuration for the adaptive integrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance, multiplied by each component's initial magnitude
    pub atol: f64,
    /// Step attempts before the run is declared divergent
    pub max_steps: u64,
    /// First trial step (hours)
    pub initial_step_hours: f64,
    /// Step size below which the run is declared divergent (hours)
    pub min_step_hours: f64,
    /// Step growth clamp
    pub max_factor: f64,
    /// Step shrink clamp
    pub min_factor: f64,
    /// Floor applied to accepted states; `None` disables clamping
    pub min_value: Option<f64>,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            rtol: 1e-8,
            atol: 1e-10,
            max_steps: 2_000_000,
            initial_step_hours: 1.0 / 12.0,
            min_step_hours: 1e-12,
            max_factor: 5.0,
            min_factor: 0.2,
            min_value: Some(0.0),
        }
    }
}

impl IntegratorConfig {
    fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.rtol) || !positive(self.atol) {
            return Err(SimulationError::InvalidProfile(format!(
                "tolerances must be positive: rtol={}, atol={}",
                self.rtol, self.atol
            )));
        }
        if !positive(self.initial_step_hours) || !positive(self.min_step_hours) {
            return Err(SimulationError::InvalidProfile("step sizes must be positive".into()));
        }
        if self.max_steps == 0 {
            return Err(SimulationError::InvalidProfile("max_steps must be > 0".into()));
        }
        Ok(())
    }
}

/// Wall-clock budget and cancellation for one run
#[derive(Debug, Clone)]
pub struct RunBudget {
    started: Instant,
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

impl RunBudget {
    /// Budget with no deadline and no cancellation
    pub fn unlimited() -> Self {
        Self {
            started: Instant::now(),
            deadline: None,
            cancel: None,
        }
    }

    /// Budget expiring `limit` from now; `None` means unlimited
    pub fn with_timeout(limit: Option<Duration>) -> Self {
        let started = Instant::now();
        Self {
            started,
            deadline: limit.map(|d| started + d),
            cancel: None,
        }
    }

    /// Abort as soon as `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fails with `Timeout` once the deadline passes or the run is cancelled
    pub fn check(&self) -> Result<()> {
        let cancelled = self
            .cancel
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false);
        let expired = self.deadline.map(|d| Instant::now() >= d).unwrap_or(false);
        if cancelled || expired {
            Err(SimulationError::Timeout {
                elapsed_ms: self.elapsed().as_millis(),
            })
        } else {
            Ok(())
        }
    }
}

impl Default for RunBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}

/// Work counters for one integration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationStats {
    pub accepted_steps: u64,
    pub rejected_steps: u64,
    pub rhs_evaluations: u64,
    /// Accepted steps whose result needed clamping to the floor
    pub clamped_steps: u64,
}

/// Dormand–Prince 5(4) integrator with dense output on a fixed grid
///
/// Solves dy/dt = f(t, y) and reports y at `t0 + i / samples_per_hour`.
pub struct DormandPrince45 {
    /// Configuration
    pub config: IntegratorConfig,
    // Scratch vectors for stage derivatives
    k1: Vec<f64>,
    k2: Vec<f64>,
    k3: Vec<f64>,
    k4: Vec<f64>,
    k5: Vec<f64>,
    k6: Vec<f64>,
    k7: Vec<f64>,
    y_temp: Vec<f64>,
    y_new: Vec<f64>,
    abs_tol: Vec<f64>,
}

impl DormandPrince45 {
    /// Create a new integrator for a system with n variables
    pub fn new(n_variables: usize, config: IntegratorConfig) -> Self {
        Self {
            config,
            k1: vec![0.0; n_variables],
            k2: vec![0.0; n_variables],
            k3: vec![0.0; n_variables],
            k4: vec![0.0; n_variables],
            k5: vec![0.0; n_variables],
            k6: vec![0.0; n_variables],
            k7: vec![0.0; n_variables],
            y_temp: vec![0.0; n_variables],
            y_new: vec![0.0; n_variables],
            abs_tol: vec![0.0; n_variables],
        }
    }

    /// Resize internal buffers if system size changes
    pub fn resize(&mut self, n_variables: usize) {
        if self.k1.len() != n_variables {
            for buf in [
                &mut self.k1,
                &mut self.k2,
                &mut self.k3,
                &mut self.k4,
                &mut self.k5,
                &mut self.k6,
                &mut self.k7,
                &mut self.y_temp,
                &mut self.y_new,
                &mut self.abs_tol,
            ] {
                buf.resize(n_variables, 0.0);
            }
        }
    }

    /// Integrate from `t0` to `t1`, calling `on_sample` at t0 and at every
    /// output grid point (including t1).
    pub fn integrate<S, F>(
        &mut self,
        system: &S,
        y0: &[f64],
        t0: f64,
        t1: f64,
        samples_per_hour: usize,
        budget: &RunBudget,
        mut on_sample: F,
    ) -> Result<IntegrationStats>
    where
        S: OdeSystem + ?Sized,
        F: FnMut(f64, &[f64]),
    {
        self.config.validate()?;
        let n = system.dimension();
        if y0.len() != n {
            return Err(SimulationError::InvalidProfile(format!(
                "initial state has {} values, system expects {}",
                y0.len(),
                n
            )));
        }
        if !(t0.is_finite() && t1.is_finite() && t1 > t0) || samples_per_hour == 0 {
            return Err(SimulationError::InvalidProfile(format!(
                "invalid time span [{}, {}] at {} samples/hour",
                t0, t1, samples_per_hour
            )));
        }
        if let Some(i) = y0.iter().position(|v| !v.is_finite()) {
            return Err(SimulationError::InvalidProfile(format!("initial value {} is not finite", i)));
        }
        self.resize(n);

        for (tol, &y) in self.abs_tol.iter_mut().zip(y0) {
            *tol = self.config.atol * y.abs().max(1e-30);
        }

        let stops = self.stop_times(system, t0, t1, samples_per_hour);
        let mut stats = IntegrationStats::default();
        let mut y = y0.to_vec();
        let mut t = t0;
        let mut h = self.config.initial_step_hours;
        let mut attempts: u64 = 0;

        on_sample(t, &y);

        for (stop, record) in stops {
            budget.check()?;
            system.derivatives(t, &y, &mut self.k1);
            stats.rhs_evaluations += 1;

            while t < stop {
                attempts += 1;
                if attempts > self.config.max_steps {
                    return Err(SimulationError::IntegrationDivergence(format!(
                        "step budget of {} exhausted at t = {:.4} h",
                        self.config.max_steps, t
                    )));
                }
                if attempts % BUDGET_CHECK_INTERVAL == 0 {
                    budget.check()?;
                }

                let clipped = t + h >= stop;
                let step = if clipped { stop - t } else { h };

                let err = self.attempt(system, t, &y, step, before(stop));
                stats.rhs_evaluations += 6;

                let factor = if err == 0.0 {
                    self.config.max_factor
                } else if err.is_finite() {
                    (0.9 * err.powf(-0.2)).clamp(self.config.min_factor, self.config.max_factor)
                } else {
                    self.config.min_factor
                };

                if err <= 1.0 {
                    t = if clipped { stop } else { t + step };
                    let clamped = self.accept(&mut y);
                    if y.iter().any(|v| !v.is_finite()) {
                        return Err(SimulationError::IntegrationDivergence(format!(
                            "state became non-finite at t = {:.4} h",
                            t
                        )));
                    }
                    if clamped {
                        stats.clamped_steps += 1;
                        system.derivatives(t, &y, &mut self.k1);
                        stats.rhs_evaluations += 1;
                    } else {
                        std::mem::swap(&mut self.k1, &mut self.k7);
                    }
                    if !clipped {
                        h = step * factor;
                    }
                    stats.accepted_steps += 1;
                } else {
                    h = step * factor;
                    stats.rejected_steps += 1;
                    if h < self.config.min_step_hours {
                        return Err(SimulationError::IntegrationDivergence(format!(
                            "step size underflow ({:.3e} h) at t = {:.4} h",
                            h, t
                        )));
                    }
                }
            }

            if record {
                on_sample(stop, &y);
            }
        }

        log::debug!(
            "Integrated [{}, {}] h: {} accepted, {} rejected, {} evaluations",
            t0,
            t1,
            stats.accepted_steps,
            stats.rejected_steps,
            stats.rhs_evaluations
        );
        Ok(stats)
    }

    /// Output grid merged with the system's breakpoints; the flag marks grid points
    fn stop_times<S: OdeSystem + ?Sized>(
        &self,
        system: &S,
        t0: f64,
        t1: f64,
        samples_per_hour: usize,
    ) -> Vec<(f64, bool)> {
        let res = samples_per_hour as f64;
        let n_grid = ((t1 - t0) * res + 1e-9).floor() as usize;
        let mut stops: Vec<(f64, bool)> = (1..=n_grid).map(|i| (t0 + i as f64 / res, true)).collect();
        if stops.last().map(|&(t, _)| t < t1 - TIME_EPSILON).unwrap_or(true) {
            stops.push((t1, true));
        }
        stops.extend(
            system
                .breakpoints(t0, t1)
                .into_iter()
                .filter(|&b| b > t0 && b < t1)
                .map(|b| (b, false)),
        );
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut merged: Vec<(f64, bool)> = Vec::with_capacity(stops.len());
        for (t, record) in stops {
            match merged.last_mut() {
                Some(last) if (t - last.0).abs() < TIME_EPSILON => {
                    // keep the grid time so samples stay on the grid
                    if record && !last.1 {
                        *last = (t, true);
                    }
                }
                _ => merged.push((t, record)),
            }
        }
        merged
    }

    /// One trial step from (t, y) of size `h`; leaves the candidate in
    /// `y_new` and f(t + h, y_new) in `k7`. Returns the scaled error norm.
    ///
    /// Stage times are capped at `limit` so a step ending on a breakpoint
    /// sees the forcing of the segment it belongs to.
    fn attempt<S: OdeSystem + ?Sized>(&mut self, system: &S, t: f64, y: &[f64], h: f64, limit: f64) -> f64 {
        let n = y.len();
        let at = |c: f64| (t + c * h).min(limit);

        for i in 0..n {
            self.y_temp[i] = y[i] + h * A21 * self.k1[i];
        }
        system.derivatives(at(C2), &self.y_temp, &mut self.k2);

        for i in 0..n {
            self.y_temp[i] = y[i] + h * (A31 * self.k1[i] + A32 * self.k2[i]);
        }
        system.derivatives(at(C3), &self.y_temp, &mut self.k3);

        for i in 0..n {
            self.y_temp[i] = y[i] + h * (A41 * self.k1[i] + A42 * self.k2[i] + A43 * self.k3[i]);
        }
        system.derivatives(at(C4), &self.y_temp, &mut self.k4);

        for i in 0..n {
            self.y_temp[i] = y[i]
                + h * (A51 * self.k1[i] + A52 * self.k2[i] + A53 * self.k3[i] + A54 * self.k4[i]);
        }
        system.derivatives(at(C5), &self.y_temp, &mut self.k5);

        for i in 0..n {
            self.y_temp[i] = y[i]
                + h * (A61 * self.k1[i]
                    + A62 * self.k2[i]
                    + A63 * self.k3[i]
                    + A64 * self.k4[i]
                    + A65 * self.k5[i]);
        }
        system.derivatives(at(1.0), &self.y_temp, &mut self.k6);

        for i in 0..n {
            self.y_new[i] = y[i]
                + h * (B1 * self.k1[i]
                    + B3 * self.k3[i]
                    + B4 * self.k4[i]
                    + B5 * self.k5[i]
                    + B6 * self.k6[i]);
        }
        system.derivatives(at(1.0), &self.y_new, &mut self.k7);

        let mut sum_sq = 0.0;
        for i in 0..n {
            let e = h
                * (E1 * self.k1[i]
                    + E3 * self.k3[i]
                    + E4 * self.k4[i]
                    + E5 * self.k5[i]
                    + E6 * self.k6[i]
                    + E7 * self.k7[i]);
            let scale = self.abs_tol[i] + self.config.rtol * y[i].abs().max(self.y_new[i].abs());
            let r = e / scale;
            sum_sq += r * r;
        }
        (sum_sq / n as f64).sqrt()
    }

    /// Copy the accepted candidate into `y`; returns true if any value was floored
    fn accept(&self, y: &mut [f64]) -> bool {
        let mut clamped = false;
        for (dst, &src) in y.iter_mut().zip(&self.y_new) {
            *dst = match self.config.min_value {
                Some(floor) if src < floor => {
                    clamped = true;
                    floor
                }
                _ => src,
            };
        }
        clamped
    }
}

/// Largest float strictly below `x`
fn before(x: f64) -> f64 {
    if x > 0.0 {
        f64::from_bits(x.to_bits() - 1)
    } else if x < 0.0 {
        f64::from_bits(x.to_bits() + 1)
    } else {
        -f64::from_bits(1)
    }
}
