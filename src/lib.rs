// Copyright 2025 the bio-filters authors
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

/*!
# `bio-filters`

Streaming digital filters for biosignals.

`bio-filters` is a `#![no_std]` library for filtering continuous sample
streams (ECG, EMG, EEG and similar) on resource-constrained real-time
targets.  It provides three engines: a finite-impulse-response filter
([FirFilter](crate::fir::FirFilter)), a cascade of second-order recursive
sections ([IirFilter](crate::iir::IirFilter)), and a least-mean-squares
adaptive filter ([LmsFilter](crate::lms::LmsFilter)).  All three keep their
state across calls, so a stream can be fed one sample at a time for minimum
latency or in blocks for throughput, in any mix, with identical results.

Filter coefficients are designed offline (scipy, MATLAB, a filter-design
tool) and passed in as plain `f32` slices; the library never computes
cutoff-frequency coefficients itself.

# How to use

Each engine allocates its state buffer once, at construction, and never
again.  Construction is the only fallible step: an empty coefficient slice,
a zero block size, or a state buffer that cannot be allocated is reported
as a [FilterError] before the real-time loop starts.

```rust
use bio_filters::FirFilter;

// 5-tap symmetric lowpass, designed offline
let coeffs = [0.1, 0.2, 0.4, 0.2, 0.1];
let mut filter = FirFilter::new(&coeffs, 8).unwrap();

// one sample at a time...
let y = filter.process_sample(1.0);

// ...or a whole block, continuing the same stream
let input = [0.5, -0.25, 0.75, 1.5];
let mut output = [0.0; 4];
filter.process_block(&input, &mut output);
```

High-selectivity responses use the biquad cascade.  Coefficients come in
groups of five per section, `{b0, b1, b2, a1, a2}`, already normalized so
that `a0 = 1`:

```rust
use bio_filters::IirFilter;

// 0.5 Hz Butterworth high-pass at 1000 Hz sampling, one section
let coeffs = [0.99778102, -1.99556205, 0.99778102, -1.99555712, 0.99556697];
let mut highpass = IirFilter::new(&coeffs, 1).unwrap();

let y = highpass.process_sample(0.2);
```

The adaptive engine cancels interference whose waveform is roughly known
(a powerline reference, an EOG channel) but whose amplitude and phase are
not.  Its weight buffer is caller-owned and mutated in place on every
sample:

```rust
use bio_filters::LmsFilter;

let mut weights = [0.0f32; 32];
let mut canceller = LmsFilter::new(&mut weights, 0.02, 1).unwrap();

// x: interference reference, d: contaminated primary signal
let (output, error) = canceller.process_sample(0.8, 1.3);
// `error` is the cleaned signal in interference-cancellation use
```

# Coefficient ownership

The fixed engines borrow their coefficients read-only (`&[f32]`) for the
instance lifetime.  The LMS engine instead takes an exclusive mutable
borrow (`&mut [f32]`) because adaptation rewrites the weights on every
processed sample; the borrow checker rules out reading that storage while
the engine is live, and the adapted weights remain in the caller's buffer
after the engine is dropped.

# Real-time behavior

`process_sample` and `process_block` perform no allocation, no I/O and no
locking, and complete in time proportional to the tap/section count and the
call length.  One instance encodes the history of exactly one stream; to
filter several channels, construct one instance per channel.  Numerical
stability is the caller's responsibility: unstable IIR coefficient sets or
an oversized LMS step size diverge without detection or clamping, since
saturating would corrupt otherwise-valid high-dynamic-range biosignal data.
*/
#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod error;
pub mod fir;
pub mod iir;
pub mod lms;

pub use error::{FilterError, Result};
pub use fir::FirFilter;
pub use iir::IirFilter;
pub use lms::LmsFilter;

use alloc::vec::Vec;

/// Allocate a zero-initialized state buffer, reporting failure instead of
/// aborting.  All engine state is sized here, once, at construction.
pub(crate) fn zeroed_state(len: usize) -> Result<Vec<f32>> {
    let mut state = Vec::new();
    if state.try_reserve_exact(len).is_err() {
        return Err(FilterError::OutOfMemory(len));
    }
    state.resize(len, 0.0);
    Ok(state)
}
