//! Accuracy checks against the serial reference.

use crate::error::SpmvResult;
use crate::serial::spmv_coo_serial_f64_i64;
use flatspmv_core::Coo;
use wide::f64x4;

/// Relative L2 distance `||test - reference|| / ||reference||`.
///
/// Falls back to the absolute distance when the reference is all zeros.
#[must_use]
pub fn l2_error(test: &[f64], reference: &[f64]) -> f64 {
    assert_eq!(test.len(), reference.len(), "vectors must have equal length");
    let mut numv = f64x4::from([0.0; 4]);
    let mut denv = f64x4::from([0.0; 4]);
    let mut i = 0usize;
    let limit4 = test.len() & !3;
    while i < limit4 {
        let t = f64x4::from([test[i], test[i + 1], test[i + 2], test[i + 3]]);
        let r = f64x4::from([reference[i], reference[i + 1], reference[i + 2], reference[i + 3]]);
        let d = t - r;
        numv += d * d;
        denv += r * r;
        i += 4;
    }
    let mut num: f64 = numv.to_array().iter().sum();
    let mut den: f64 = denv.to_array().iter().sum();
    while i < test.len() {
        let d = test[i] - reference[i];
        num += d * d;
        den += reference[i] * reference[i];
        i += 1;
    }
    if den == 0.0 {
        num.sqrt()
    } else {
        (num / den).sqrt()
    }
}

/// Run `kernel` and the serial reference from zeroed outputs and return the
/// L2 error between them.
pub fn check_spmv<F>(a: &Coo<f64, i64>, x: &[f64], kernel: F) -> SpmvResult<f64>
where
    F: FnOnce(&Coo<f64, i64>, &[f64], &mut [f64]) -> SpmvResult<()>,
{
    let mut reference = vec![0.0f64; a.nrows];
    spmv_coo_serial_f64_i64(a, x, &mut reference);
    let mut test = vec![0.0f64; a.nrows];
    kernel(a, x, &mut test)?;
    Ok(l2_error(&test, &reference))
}
