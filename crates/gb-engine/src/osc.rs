//! Waveform generation: naive shapes and polyBLEP correction.
//!
//! Phase is always normalized to [0, 1). The naive shapes serve both the
//! plain oscillator and the LFOs; the BLEP variants subtract a polynomial
//! residual at each detected discontinuity to suppress aliasing.

use gb_ir::Waveform;

pub(crate) const TWO_PI: f32 = 2.0 * core::f32::consts::PI;

/// Evaluate a naive waveform at the given phase in [0, 1).
pub fn waveform_value(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => libm::sinf(TWO_PI * phase),
        Waveform::Saw => 2.0 * phase - 1.0,
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => {
            if phase < 0.5 {
                4.0 * phase - 1.0
            } else {
                3.0 - 4.0 * phase
            }
        }
    }
}

/// Polynomial band-limited step residual around a discontinuity.
///
/// `t` is the phase in [0, 1), `dt` the per-sample phase increment. Returns
/// a nonzero correction only within one sample of the wrap point.
pub fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

/// Band-limited saw at the given phase and increment.
pub(crate) fn blep_saw(phase: f32, dt: f32) -> f32 {
    waveform_value(Waveform::Saw, phase) - poly_blep(phase, dt)
}

/// Band-limited square at the given phase and increment.
pub(crate) fn blep_square(phase: f32, dt: f32) -> f32 {
    let mut v = waveform_value(Waveform::Square, phase);
    v += poly_blep(phase, dt);
    v -= poly_blep(wrap_phase(phase + 0.5), dt);
    v
}

/// Wrap a phase into [0, 1).
pub(crate) fn wrap_phase(phase: f32) -> f32 {
    phase - libm::floorf(phase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_endpoints() {
        assert!(waveform_value(Waveform::Sine, 0.0).abs() < 1e-6);
        assert!((waveform_value(Waveform::Sine, 0.25) - 1.0).abs() < 1e-6);
        assert!((waveform_value(Waveform::Sine, 0.75) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn saw_ramps_minus_one_to_one() {
        assert_eq!(waveform_value(Waveform::Saw, 0.0), -1.0);
        assert_eq!(waveform_value(Waveform::Saw, 0.5), 0.0);
        assert!((waveform_value(Waveform::Saw, 0.999) - 0.998).abs() < 1e-3);
    }

    #[test]
    fn square_halves() {
        assert_eq!(waveform_value(Waveform::Square, 0.1), 1.0);
        assert_eq!(waveform_value(Waveform::Square, 0.6), -1.0);
    }

    #[test]
    fn triangle_peaks() {
        assert_eq!(waveform_value(Waveform::Triangle, 0.0), -1.0);
        assert_eq!(waveform_value(Waveform::Triangle, 0.5), 1.0);
        assert!((waveform_value(Waveform::Triangle, 0.25)).abs() < 1e-6);
    }

    #[test]
    fn all_shapes_bounded() {
        for shape in [Waveform::Sine, Waveform::Saw, Waveform::Square, Waveform::Triangle] {
            for i in 0..1000 {
                let v = waveform_value(shape, i as f32 / 1000.0);
                assert!((-1.0..=1.0).contains(&v), "{:?} at {} gave {}", shape, i, v);
            }
        }
    }

    #[test]
    fn poly_blep_zero_away_from_discontinuity() {
        assert_eq!(poly_blep(0.5, 0.01), 0.0);
        assert_eq!(poly_blep(0.25, 0.001), 0.0);
    }

    #[test]
    fn poly_blep_active_near_wrap() {
        assert!(poly_blep(0.0005, 0.01) != 0.0);
        assert!(poly_blep(0.9995, 0.01) != 0.0);
    }

    #[test]
    fn blep_saw_stays_bounded() {
        let dt = 440.0 / 44_100.0;
        let mut phase = 0.0;
        for _ in 0..2000 {
            let v = blep_saw(phase, dt);
            assert!((-1.5..=1.5).contains(&v));
            phase = wrap_phase(phase + dt);
        }
    }

    #[test]
    fn wrap_phase_stays_in_unit_interval() {
        assert!((wrap_phase(1.25) - 0.25).abs() < 1e-6);
        assert!((wrap_phase(-0.25) - 0.75).abs() < 1e-6);
        assert_eq!(wrap_phase(0.5), 0.5);
    }
}
