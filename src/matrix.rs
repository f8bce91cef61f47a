use std::fmt;
use std::fs;
use std::ops::{AddAssign, Index, IndexMut, Mul};
use std::path::Path;

use itertools::Itertools;
use num_traits::{One, Zero};
use rand::distributions::{Distribution, Standard};
use rand::{thread_rng, Rng};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Numeric types a matrix can hold. Covers the integer and float primitives.
pub trait Element: Copy + Send + 'static + Zero + Mul<Output = Self> + AddAssign {}

impl<T: Copy + Send + 'static + Zero + Mul<Output = T> + AddAssign> Element for T {}

/// A dense matrix in row-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T: Element> Matrix<T> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::zero())
    }

    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    pub fn random(rows: usize, cols: usize) -> Self
    where
        Standard: Distribution<T>,
    {
        let mut rng = thread_rng();
        Self {
            rows,
            cols,
            data: (0..rows * cols).map(|_| rng.gen()).collect(),
        }
    }

    pub fn identity(n: usize) -> Self
    where
        T: One,
    {
        let mut result = Self::zeros(n, n);
        for i in 0..n {
            result[(i, i)] = T::one();
        }
        result
    }

    /// Builds a matrix from nested rows, the shape the JSON input uses.
    /// Rows of uneven length are rejected.
    ///
    /// * `rows`: Outer vec of matrix rows, top to bottom.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let m = rows.len();
        let n = rows.first().map_or(0, |row| row.len());
        if m == 0 || n == 0 {
            return Err(Error::Input("matrix must not be empty".into()));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(Error::Input(format!(
                    "row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
        }
        Ok(Self {
            rows: m,
            cols: n,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.data.chunks(self.cols).map(<[T]>::to_vec).collect()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// The contiguous storage of rows `[offset, offset + count)`.
    pub fn row_block(&self, offset: usize, count: usize) -> &[T] {
        &self.data[offset * self.cols..(offset + count) * self.cols]
    }

    pub fn row_block_mut(&mut self, offset: usize, count: usize) -> &mut [T] {
        &mut self.data[offset * self.cols..(offset + count) * self.cols]
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * self.cols + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row * self.cols + col]
    }
}

impl<T: fmt::Display> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.data.chunks(self.cols) {
            writeln!(f, "{}", row.iter().format(" "))?;
        }
        Ok(())
    }
}

/// Multiplies `a` by `b` in one go. For every output element the
/// accumulation runs over the shared dimension in increasing index order,
/// which pins down the rounding of float elements.
///
/// * `a`: Left operand, `m x p`.
/// * `b`: Right operand, `p x n`.
pub fn multiply<T: Element>(a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
    assert_eq!(a.cols(), b.rows(), "operand shapes do not match");

    let mut product = Matrix::zeros(a.rows(), b.cols());
    for r in 0..a.rows() {
        for c in 0..b.cols() {
            let mut sum = T::zero();
            for j in 0..a.cols() {
                sum += a[(r, j)] * b[(j, c)];
            }
            product[(r, c)] = sum;
        }
    }

    product
}

#[derive(Deserialize)]
struct InputMatrices<T> {
    a: Vec<Vec<T>>,
    b: Vec<Vec<T>>,
}

/// Reads an operand pair from a JSON file shaped `{"a": [[..]], "b": [[..]]}`.
///
/// * `path`: File to read.
pub fn load_pair<T>(path: &Path) -> Result<(Matrix<T>, Matrix<T>)>
where
    T: Element + DeserializeOwned,
{
    let text = fs::read_to_string(path)?;
    let input: InputMatrices<T> = serde_json::from_str(&text)?;
    Ok((Matrix::from_rows(input.a)?, Matrix::from_rows(input.b)?))
}

/// Writes a matrix to a JSON file as nested rows.
pub fn save<T>(matrix: &Matrix<T>, path: &Path) -> Result<()>
where
    T: Element + Serialize,
{
    fs::write(path, serde_json::to_string(&matrix.to_rows())?)?;
    Ok(())
}
