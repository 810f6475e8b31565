use alloc::vec::Vec;

use crate::error::{FilterError, Result};
use crate::zeroed_state;

/// An [LMS](https://en.wikipedia.org/wiki/Least_mean_squares_filter)
/// adaptive filter.
///
/// An FIR filter whose weights are rewritten on every processed sample to
/// drive the adaptation error toward zero.  Each call takes two samples,
/// the input `x` (the interference reference in cancellation use) and the
/// desired signal `d` (the contaminated primary channel), and performs,
/// in this order:
///
/// 1. `y = Σ w[k] · x[n-k]` over the current weights and delay line
/// 2. `e = d - y`
/// 3. `w[k] ← w[k] + μ · e · x[n-k]` for every weight, same history
/// 4. shift `x` into the delay line
///
/// Both `y` and `e` are returned; in interference cancellation `e` is the
/// cleaned signal, since the filter learns to reproduce exactly the part
/// of `d` that is predictable from the reference.
///
/// The weight buffer is caller-owned but exclusively borrowed and mutated
/// in place: it is a live, evolving parameter vector, not a constant, and
/// the adapted weights remain in the caller's storage after the filter is
/// dropped.  The delay line (`taps` samples, no block-size extension) is
/// owned by the filter.
///
/// Weight updates are strictly sequential: inside a block, every sample's
/// update depends on the previous one, so block processing is an ordered
/// fold, not a parallel map, and matches per-sample calls exactly.
///
/// The step size `μ` trades convergence speed against stability and is not
/// bounds-checked; a value too large for the reference signal power makes
/// the weights diverge.
///
/// # Examples
///
/// Cancelling 60 Hz powerline interference with a reference oscillator:
///
/// ```
/// use bio_filters::LmsFilter;
/// use core::f32::consts::PI;
///
/// let mut weights = [0.0f32; 32];
/// let mut canceller = LmsFilter::new(&mut weights, 0.02, 1).unwrap();
///
/// for i in 0..1000 {
///     let t = i as f32 / 1000.0;
///     let clean = 0.5 * (2.0 * PI * 7.0 * t).sin();
///     let interference = 2.0 * (2.0 * PI * 60.0 * t).sin();
///     let reference = (2.0 * PI * 60.0 * t).sin();
///
///     let (_, error) = canceller.process_sample(reference, clean + interference);
///     // after convergence, `error` tracks `clean`
/// }
/// ```
#[derive(Debug)]
pub struct LmsFilter<'a> {
    // adaptive weights, externally owned, rewritten every sample
    coeffs: &'a mut [f32],

    // ring delay line, taps samples
    state: Vec<f32>,

    // slot of the most recent sample
    index: usize,

    mu: f32,

    block_size: usize,
}

impl<'a> LmsFilter<'a> {
    /// Create an adaptive filter over the caller's weight buffer.
    ///
    /// The weights are used as-is (commonly all zero to start adaptation
    /// from scratch) and will be mutated by every processed sample.  Fails
    /// if `coeffs` is empty, `block_size` is zero, or the delay line
    /// cannot be allocated.  `mu` is taken on faith.
    pub fn new(coeffs: &'a mut [f32], mu: f32, block_size: usize) -> Result<Self> {
        if coeffs.is_empty() {
            return Err(FilterError::NoCoefficients);
        }
        if block_size == 0 {
            return Err(FilterError::InvalidBlockSize);
        }
        let state = zeroed_state(coeffs.len())?;
        let index = coeffs.len() - 1;

        Ok(Self {
            coeffs,
            state,
            index,
            mu,
            block_size,
        })
    }

    /// Process one input/desired pair, returning `(output, error)`.
    ///
    /// Adapts the weights before the new sample enters the delay line, so
    /// a sample first contributes to the output on the following call.
    #[inline]
    pub fn process_sample(&mut self, input: f32, desired: f32) -> (f32, f32) {
        let taps = self.coeffs.len();

        let mut output = 0.0;
        let mut idx = self.index;
        for &w in self.coeffs.iter() {
            output += w * self.state[idx];
            idx = if idx == 0 { taps - 1 } else { idx - 1 };
        }

        let error = desired - output;

        let step = self.mu * error;
        let mut idx = self.index;
        for w in self.coeffs.iter_mut() {
            *w += step * self.state[idx];
            idx = if idx == 0 { taps - 1 } else { idx - 1 };
        }

        self.index = (self.index + 1) % taps;
        self.state[self.index] = input;

        (output, error)
    }

    /// Process a block of input/desired pairs into `output` and `error`.
    ///
    /// A strictly sequential fold over the samples: weights evolve inside
    /// the block, so the first sample sees the entry weights and the last
    /// one sees weights adapted `n - 1` times.  All four slices must have
    /// equal length (debug-asserted caller obligation).
    pub fn process_block(
        &mut self,
        input: &[f32],
        desired: &[f32],
        output: &mut [f32],
        error: &mut [f32],
    ) {
        debug_assert_eq!(input.len(), desired.len(), "input/desired length mismatch");
        debug_assert_eq!(input.len(), output.len(), "input/output length mismatch");
        debug_assert_eq!(input.len(), error.len(), "input/error length mismatch");

        let pairs = input.iter().zip(desired).zip(output.iter_mut().zip(error.iter_mut()));
        for ((&x, &d), (y, e)) in pairs {
            let (out, err) = self.process_sample(x, d);
            *y = out;
            *e = err;
        }
    }

    /// Current step size.
    pub fn mu(&self) -> f32 {
        self.mu
    }

    /// Overwrite the step size, effective on the next processed sample.
    ///
    /// Does not touch the weights or the delay line, so adaptation can be
    /// slowed down or frozen (`mu = 0`) mid-stream without losing state.
    pub fn set_mu(&mut self, mu: f32) {
        self.mu = mu;
    }

    /// Discard the accumulated adaptation.
    ///
    /// Overwrites every weight with `new_coeffs` (which must have exactly
    /// `taps` elements) or with zero, and zeros the whole delay line.
    /// This is the only operation that resets the filter; normal
    /// processing never does so implicitly.
    pub fn reset_coefficients(&mut self, new_coeffs: Option<&[f32]>) {
        match new_coeffs {
            Some(weights) => {
                debug_assert_eq!(weights.len(), self.coeffs.len(), "weight length mismatch");
                self.coeffs.copy_from_slice(weights);
            }
            None => self.coeffs.fill(0.0),
        }
        self.state.fill(0.0);
        self.index = self.coeffs.len() - 1;
    }

    /// View of the live weights as adapted so far.
    pub fn coefficients(&self) -> &[f32] {
        self.coeffs
    }

    /// Number of adaptive taps.
    pub fn taps(&self) -> usize {
        self.coeffs.len()
    }

    /// Configured processing block size.
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use core::f32::consts::PI;

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|e| e * e).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn cancels_sinusoidal_interference() {
        let mut weights = [0.0f32; 32];
        let mut filter = LmsFilter::new(&mut weights, 0.02, 1).unwrap();

        // primary = clean + 2·sin(2π·60·t), reference = sin(2π·60·t)
        let mut residual = Vec::new();
        for i in 0..10_000 {
            let t = i as f32 / 1000.0;
            let clean = 0.5 * (2.0 * PI * 7.0 * t).sin();
            let reference = (2.0 * PI * 60.0 * t).sin();
            let primary = clean + 2.0 * reference;

            let (output, error) = filter.process_sample(reference, primary);
            assert!(output.is_finite() && error.is_finite());
            residual.push(error - clean);
        }

        // uncancelled at first, converged well inside a few hundred samples,
        // and still converged after 10k samples
        assert!(residual[..50].iter().any(|r| r.abs() > 0.5));
        assert!(rms(&residual[300..1000]) < 0.35);
        assert!(rms(&residual[9000..]) < 0.35);
        assert!(filter.coefficients().iter().all(|w| w.is_finite()));
    }

    #[test]
    fn reset_to_zero_silences_the_next_output() {
        let mut weights = [0.0f32; 8];
        let mut filter = LmsFilter::new(&mut weights, 0.1, 1).unwrap();

        for i in 0..50 {
            let x = (i as f32 * 0.9).sin();
            filter.process_sample(x, 2.0 * x);
        }
        assert!(filter.coefficients().iter().any(|w| w.abs() > 1e-3));

        filter.reset_coefficients(None);

        let (output, error) = filter.process_sample(1.0, 0.75);
        assert_eq!(output, 0.0);
        assert_abs_diff_eq!(error, 0.75, epsilon = 1e-6);
        assert!(filter.coefficients().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn reset_installs_supplied_weights_and_clears_history() {
        let mut weights = [0.0f32; 4];
        let mut filter = LmsFilter::new(&mut weights, 0.05, 1).unwrap();

        for i in 0..20 {
            filter.process_sample(i as f32 * 0.1, 1.0);
        }

        let fresh = [1.0, 0.0, 0.0, 0.0];
        filter.reset_coefficients(Some(&fresh));
        filter.set_mu(0.0); // freeze to observe the installed weights

        assert_eq!(filter.coefficients(), &fresh);
        // delay line was zeroed, and the new sample only surfaces one call
        // later through w[0]
        let (y0, _) = filter.process_sample(5.0, 0.0);
        assert_eq!(y0, 0.0);
        let (y1, _) = filter.process_sample(0.0, 0.0);
        assert_abs_diff_eq!(y1, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn block_call_matches_per_sample_calls() {
        let input: Vec<f32> = (0..64).map(|i| ((i * 11) % 19) as f32 / 19.0 - 0.5).collect();
        let desired: Vec<f32> = input.iter().map(|x| 1.5 * x + 0.1).collect();

        let mut weights_a = [0.0f32; 6];
        let mut by_sample = LmsFilter::new(&mut weights_a, 0.05, 1).unwrap();
        let expected: Vec<(f32, f32)> = input
            .iter()
            .zip(&desired)
            .map(|(&x, &d)| by_sample.process_sample(x, d))
            .collect();

        let mut weights_b = [0.0f32; 6];
        let mut by_block = LmsFilter::new(&mut weights_b, 0.05, 16).unwrap();
        let mut output = vec![0.0; input.len()];
        let mut error = vec![0.0; input.len()];
        by_block.process_block(&input, &desired, &mut output, &mut error);

        for (i, (y, e)) in expected.iter().enumerate() {
            assert_abs_diff_eq!(output[i], *y, epsilon = 1e-6);
            assert_abs_diff_eq!(error[i], *e, epsilon = 1e-6);
        }
        drop(by_sample);
        drop(by_block);
        for (a, b) in weights_a.iter().zip(&weights_b) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-6);
        }
    }

    #[test]
    fn zero_step_size_freezes_adaptation() {
        let mut weights = [0.2, -0.1, 0.4];
        let mut filter = LmsFilter::new(&mut weights, 0.0, 1).unwrap();

        for i in 0..30 {
            filter.process_sample((i as f32).sin(), 1.0);
        }
        assert_eq!(filter.coefficients(), &[0.2, -0.1, 0.4]);

        // takes effect on the next sample
        filter.set_mu(0.5);
        assert_eq!(filter.mu(), 0.5);
        filter.process_sample(1.0, 1.0);
        assert!(filter.coefficients() != &[0.2, -0.1, 0.4]);
    }

    #[test]
    fn adapted_weights_survive_in_caller_storage() {
        let mut weights = [0.0f32; 4];
        {
            let mut filter = LmsFilter::new(&mut weights, 0.1, 1).unwrap();
            for _ in 0..100 {
                filter.process_sample(1.0, 2.0);
            }
        }
        // the engine wrote its adaptation into our buffer
        assert!(weights.iter().any(|w| w.abs() > 0.1));
    }

    #[test]
    fn zero_signals_leave_everything_zero() {
        let mut weights = [0.0f32; 16];
        let mut filter = LmsFilter::new(&mut weights, 0.02, 1).unwrap();

        for _ in 0..100 {
            let (output, error) = filter.process_sample(0.0, 0.0);
            assert_eq!(output, 0.0);
            assert_eq!(error, 0.0);
        }
        assert!(filter.coefficients().iter().all(|&w| w == 0.0));
    }

    #[test]
    fn rejects_bad_configuration() {
        assert_eq!(
            LmsFilter::new(&mut [], 0.01, 1).unwrap_err(),
            FilterError::NoCoefficients
        );
        let mut weights = [0.0f32; 4];
        assert_eq!(
            LmsFilter::new(&mut weights, 0.01, 0).unwrap_err(),
            FilterError::InvalidBlockSize
        );
    }

    #[test]
    fn reports_dimensions() {
        let mut weights = [0.0f32; 24];
        let filter = LmsFilter::new(&mut weights, 0.01, 8).unwrap();
        assert_eq!(filter.taps(), 24);
        assert_eq!(filter.block_size(), 8);
        assert_eq!(filter.mu(), 0.01);
    }
}
