//! # Bracketed Root Finding
//!
//! Brent's method on a sign-changing bracket. Combines bisection, secant and
//! inverse quadratic interpolation; converges on any bracket, including
//! residuals with jumps (it then converges onto the jump).

use crate::error::{MeshError, MeshResult};
use config::constants::{ROOT_MAX_ITERATIONS, ROOT_TOLERANCE};

/// Finds a root of `f` in `[a, b]`.
///
/// `f(a)` and `f(b)` must have opposite signs (or one of them be zero).
/// Errors raised by `f` are propagated unchanged.
///
/// # Example
///
/// ```rust,ignore
/// let root = brent(|x| Ok(x * x - 2.0), 0.0, 2.0)?;
/// assert!((root - 2f64.sqrt()).abs() < 1e-12);
/// ```
pub(crate) fn brent<F>(mut f: F, a: f64, b: f64) -> MeshResult<f64>
where
    F: FnMut(f64) -> MeshResult<f64>,
{
    let (mut a, mut b) = (a, b);
    let mut fa = f(a)?;
    let mut fb = f(b)?;

    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa.is_nan() || fb.is_nan() || fa.signum() == fb.signum() {
        return Err(MeshError::series(format!(
            "root not bracketed on [{a}, {b}]: f(a) = {fa}, f(b) = {fb}"
        )));
    }

    let mut c = b;
    let mut fc = fb;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..ROOT_MAX_ITERATIONS {
        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * ROOT_TOLERANCE;
        let xm = 0.5 * (c - b);
        if xm.abs() <= tol || fb == 0.0 {
            return Ok(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            // Interpolation step
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * xm * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            let min1 = 3.0 * xm * q - (tol * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        if d.abs() > tol {
            b += d;
        } else {
            b += tol.copysign(xm);
        }
        fb = f(b)?;
    }

    Err(MeshError::series(format!(
        "root search did not converge after {ROOT_MAX_ITERATIONS} iterations"
    )))
}
