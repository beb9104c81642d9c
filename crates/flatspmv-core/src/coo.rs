//! COO format definition and constructors
//!
//! Entries are stored as three parallel arrays. The SpMV kernels require the
//! row array to be non-decreasing; columns inside a row may come in any order
//! and repeated (row, col) pairs are summed.

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Coo<T, I> {
    pub data: Vec<T>,
    pub row: Vec<I>, // length nnz, non-decreasing
    pub col: Vec<I>, // length nnz
    pub ncols: usize,
    pub nrows: usize,
}

impl<T, I> Coo<T, I> {
    #[inline]
    #[must_use]
    pub const fn nnz(&self) -> usize {
        self.data.len()
    }
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }
}

impl<T, I: PartialOrd> Coo<T, I> {
    /// True when row ids never decrease.
    #[inline]
    #[must_use]
    pub fn is_row_sorted(&self) -> bool {
        self.row.windows(2).all(|w| w[0] <= w[1])
    }
}

impl Coo<f64, i64> {
    /// Build from raw triplet arrays.
    ///
    /// With `check` the indices are bounds-checked against the shape and the
    /// row array must be sorted ascending.
    #[inline]
    pub fn from_parts(
        nrows: usize,
        ncols: usize,
        row: Vec<i64>,
        col: Vec<i64>,
        data: Vec<f64>,
        check: bool,
    ) -> Result<Self, String> {
        if row.len() != data.len() || col.len() != data.len() {
            return Err("row/col/data must have equal length".into());
        }
        let out = Self {
            data,
            row,
            col,
            ncols,
            nrows,
        };
        if check {
            out.check_entries()?;
        }
        Ok(out)
    }

    #[inline]
    #[must_use]
    pub const fn from_parts_unchecked(
        nrows: usize,
        ncols: usize,
        row: Vec<i64>,
        col: Vec<i64>,
        data: Vec<f64>,
    ) -> Self {
        Self {
            data,
            row,
            col,
            ncols,
            nrows,
        }
    }

    /// Expand a CSR row pointer into row-sorted coordinate form.
    ///
    /// `indices` and `data` are taken verbatim; `indptr[i]..indptr[i + 1]`
    /// becomes a run of row id `i`.
    pub fn from_row_offsets(
        nrows: usize,
        ncols: usize,
        indptr: &[i64],
        indices: Vec<i64>,
        data: Vec<f64>,
        check: bool,
    ) -> Result<Self, String> {
        if indptr.len() != nrows + 1 {
            return Err("indptr length must be nrows + 1".into());
        }
        if indices.len() != data.len() {
            return Err("indices and data must have equal length".into());
        }
        if indptr.first().copied().unwrap_or(0) != 0 {
            return Err("indptr first element must be 0".into());
        }
        let nnz = data.len();
        if usize::try_from(indptr[nrows]).ok() != Some(nnz) {
            return Err("indptr last element must equal nnz".into());
        }
        let mut row = Vec::with_capacity(nnz);
        for (i, w) in indptr.windows(2).enumerate() {
            if w[1] < w[0] {
                return Err("indptr must be non-decreasing".into());
            }
            let count = usize::try_from(w[1] - w[0]).map_err(|e| e.to_string())?;
            let id = i64::try_from(i).map_err(|e| e.to_string())?;
            row.extend(std::iter::repeat(id).take(count));
        }
        Self::from_parts(nrows, ncols, row, indices, data, check)
    }

    fn check_entries(&self) -> Result<(), String> {
        let mut prev = i64::MIN;
        for (&i, &j) in self.row.iter().zip(&self.col) {
            if i < 0 || j < 0 {
                return Err("indices must be non-negative".into());
            }
            let ok_i = usize::try_from(i).is_ok_and(|ii| ii < self.nrows);
            let ok_j = usize::try_from(j).is_ok_and(|jj| jj < self.ncols);
            if !ok_i || !ok_j {
                return Err("indices out of bounds".into());
            }
            if i < prev {
                return Err("row indices must be sorted ascending".into());
            }
            prev = i;
        }
        Ok(())
    }
}
