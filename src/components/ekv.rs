//! EKV (Enz-Krummenacher-Vittoz) MOSFET current model.
//!
//! A single continuous expression covers weak and strong inversion:
//!
//! ```text
//! IF = Is * ln(1 + exp((κ·(Vgb − VT0) − Vsb) / 2UT))²
//! IR = Is * ln(1 + exp((κ·(Vgb − VT0) − Vdb) / 2UT))²
//! I  = IF − IR
//! ```
//!
//! All voltages are referenced to the body terminal. PMOS devices use the
//! same form with every body-referenced voltage sign-flipped.
//!
//! The functions here are pure and never fail for finite inputs.

use super::mosfet::MosfetType;
use crate::THERMAL_VOLTAGE;

/// Floor added to the forward current before dividing by it (1 fA).
pub const CURRENT_FLOOR: f64 = 1e-15;

/// Channel-length modulation coefficient used when the Early effect is enabled (1/V).
pub const EARLY_LAMBDA: f64 = 0.05;

/// Technology constants for one device polarity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EkvParams {
    /// Threshold voltage (V)
    pub vt0: f64,
    /// Subthreshold slope factor
    pub kappa: f64,
    /// Specific current (A)
    pub is: f64,
}

impl EkvParams {
    /// N-channel constants.
    pub const NMOS: Self = Self {
        vt0: 0.4,
        kappa: 0.7,
        is: 1e-7,
    };

    /// P-channel constants. Lower specific current models the lower hole mobility.
    pub const PMOS: Self = Self {
        vt0: 0.4,
        kappa: 0.7,
        is: 4e-8,
    };

    /// Constants for the given polarity.
    pub fn for_type(mosfet_type: MosfetType) -> Self {
        match mosfet_type {
            MosfetType::Nmos => Self::NMOS,
            MosfetType::Pmos => Self::PMOS,
        }
    }
}

/// Voltages at the four device terminals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TerminalVoltages {
    pub gate: f64,
    pub source: f64,
    pub drain: f64,
    pub body: f64,
}

impl TerminalVoltages {
    pub fn new(gate: f64, source: f64, drain: f64, body: f64) -> Self {
        Self {
            gate,
            source,
            drain,
            body,
        }
    }
}

/// Result of one model evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EkvOutput {
    /// Net channel current IF − IR (A)
    pub current: f64,
    /// Forward component IF (A)
    pub forward_current: f64,
    /// Net current as a fraction of the forward current
    pub saturation_level: f64,
}

/// `ln(1 + exp(x))` without overflow for large `x`.
#[inline]
fn softplus(x: f64) -> f64 {
    if x > 35.0 {
        x
    } else {
        x.exp().ln_1p()
    }
}

/// One of the two interpolation terms (IF or IR).
#[inline]
fn interpolation_current(params: &EkvParams, pinch_off: f64, terminal: f64) -> f64 {
    let l = softplus((pinch_off - terminal) / (2.0 * THERMAL_VOLTAGE));
    params.is * l * l
}

/// Evaluate the EKV expression on body-referenced voltages.
pub fn ekv(params: &EkvParams, vgb: f64, vsb: f64, vdb: f64) -> EkvOutput {
    let pinch_off = params.kappa * (vgb - params.vt0);
    let forward_current = interpolation_current(params, pinch_off, vsb);
    let reverse_current = interpolation_current(params, pinch_off, vdb);
    let current = forward_current - reverse_current;

    EkvOutput {
        current,
        forward_current,
        saturation_level: current / (forward_current + CURRENT_FLOOR),
    }
}

/// N-channel device with absolute terminal voltages.
pub fn ekv_nmos(vg: f64, vs: f64, vd: f64, vb: f64) -> EkvOutput {
    ekv(&EkvParams::NMOS, vg - vb, vs - vb, vd - vb)
}

/// P-channel device with absolute terminal voltages.
///
/// A positive current flows from source to drain.
pub fn ekv_pmos(vg: f64, vs: f64, vd: f64, vb: f64) -> EkvOutput {
    ekv(&EkvParams::PMOS, vb - vg, vb - vs, vb - vd)
}

/// Evaluate a device of the given polarity.
///
/// With `early_effect` set the net current is scaled by `1 + λ·|Vds|`;
/// the saturation level always reflects the unscaled current.
pub fn evaluate(mosfet_type: MosfetType, v: TerminalVoltages, early_effect: bool) -> EkvOutput {
    let mut out = match mosfet_type {
        MosfetType::Nmos => ekv_nmos(v.gate, v.source, v.drain, v.body),
        MosfetType::Pmos => ekv_pmos(v.gate, v.source, v.drain, v.body),
    };

    if early_effect {
        out.current *= 1.0 + EARLY_LAMBDA * (v.drain - v.source).abs();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_zero_vds_gives_zero_current() {
        let out = ekv_nmos(3.0, 1.0, 1.0, 0.0);
        assert_abs_diff_eq!(out.current, 0.0);
        assert_abs_diff_eq!(out.saturation_level, 0.0);
    }

    #[test]
    fn test_cutoff_and_zero_bias_are_finite() {
        let out = ekv_nmos(0.0, 0.0, 0.0, 0.0);
        assert!(out.saturation_level.is_finite());

        // Rails far outside the supply still evaluate cleanly
        let out = ekv_nmos(500.0, -200.0, 300.0, 0.0);
        assert!(out.current.is_finite());
        assert!(out.forward_current.is_finite());
    }

    #[test]
    fn test_nmos_gate_monotonicity() {
        let mut previous = ekv_nmos(0.5, 0.0, 5.0, 0.0).current;
        let mut vg = 0.5;
        while vg <= 5.0 {
            let i = ekv_nmos(vg, 0.0, 5.0, 0.0).current;
            assert!(i >= previous, "current fell at Vg = {vg}");
            previous = i;
            vg += 0.05;
        }
    }

    #[test]
    fn test_saturation_bound_over_drain_sweep() {
        for step in 0..=100 {
            let vd = step as f64 * 0.05;
            let out = ekv_nmos(2.0, 0.0, vd, 0.0);
            assert!(
                (0.0..=1.0).contains(&out.saturation_level),
                "saturation {} out of range at Vd = {vd}",
                out.saturation_level
            );
        }
        // Deep saturation approaches one
        assert!(ekv_nmos(2.0, 0.0, 5.0, 0.0).saturation_level > 0.99);
    }

    #[test]
    fn test_reversed_channel_flips_sign() {
        let forward = ekv_nmos(3.0, 0.0, 1.0, 0.0).current;
        let reverse = ekv_nmos(3.0, 1.0, 0.0, 0.0).current;
        assert!(forward > 0.0);
        assert_relative_eq!(forward, -reverse, max_relative = 1e-12);
    }

    #[test]
    fn test_pmos_mirrors_nmos_form() {
        // PMOS with source at 5V and gate at 0V conducts source -> drain
        let out = ekv_pmos(0.0, 5.0, 0.0, 5.0);
        assert!(out.current > 0.0);

        let expected = ekv(&EkvParams::PMOS, 5.0, 0.0, 5.0);
        assert_relative_eq!(out.current, expected.current);

        // Same bias magnitudes as an NMOS, scaled by the specific currents
        let n = ekv_nmos(5.0, 0.0, 5.0, 0.0).current;
        assert_relative_eq!(out.current / n, EkvParams::PMOS.is / EkvParams::NMOS.is, max_relative = 1e-9);
    }

    #[test]
    fn test_pmos_off_with_gate_high() {
        let out = ekv_pmos(5.0, 5.0, 0.0, 5.0);
        assert!(out.current < 1e-12);
    }

    #[test]
    fn test_early_effect_scales_current() {
        let v = TerminalVoltages::new(2.0, 0.0, 4.0, 0.0);
        let plain = evaluate(MosfetType::Nmos, v, false);
        let early = evaluate(MosfetType::Nmos, v, true);
        assert_relative_eq!(early.current, plain.current * (1.0 + EARLY_LAMBDA * 4.0));
        assert_relative_eq!(early.saturation_level, plain.saturation_level);
    }
}
