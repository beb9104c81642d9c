//! Single-worker COO reducer: the tail of the flat kernels and the whole of
//! very small inputs.

use crate::cache::XSource;
use crate::util::i64_to_usize;
use flatspmv_core::Coo;

/// `y[row[k]] += data[k] * x[col[k]]` for every entry of the sub-range.
#[inline]
pub fn spmv_coo_serial<X: XSource + ?Sized>(
    row: &[i64],
    col: &[i64],
    data: &[f64],
    x: &X,
    y: &mut [f64],
) {
    debug_assert!(row.len() == col.len() && col.len() == data.len());
    for ((&i, &j), &v) in row.iter().zip(col).zip(data) {
        y[i64_to_usize(i)] += v * x.fetch(j);
    }
}

/// y += A @ x, one entry at a time.
pub fn spmv_coo_serial_f64_i64(a: &Coo<f64, i64>, x: &[f64], y: &mut [f64]) {
    assert_eq!(x.len(), a.ncols, "x length must equal ncols");
    assert_eq!(y.len(), a.nrows, "y length must equal nrows");
    spmv_coo_serial(&a.row, &a.col, &a.data, x, y);
}
