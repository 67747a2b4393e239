use crate::NfError;

/// Floating point type used throughout system
pub type Real = f64;

/// Tolerance applied when checking that user-supplied fractions sum to one.
pub const FRACTION_SUM_TOL: Real = 1e-3;

/// Slack allowed on flows before a consistency check calls them negative.
pub const FLOW_NEGATIVE_TOL: Real = 1e-9;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, NfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(NfError::NonFinite { what, value: v })
    }
}

/// Finite and within the closed unit interval.
pub fn ensure_fraction(v: Real, what: &'static str) -> Result<Real, NfError> {
    let v = ensure_finite(v, what)?;
    if (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(NfError::FractionOutOfRange { what, value: v })
    }
}

pub fn is_fraction(v: Real) -> bool {
    v.is_finite() && (0.0..=1.0).contains(&v)
}
