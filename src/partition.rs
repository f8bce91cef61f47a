use crate::{Error, Result};

/// A contiguous range of matrix rows assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowBlock {
    pub offset: usize,
    pub count: usize,
}

/// Splits the rows of an `n x n` matrix evenly over `workers` workers.
/// Every worker gets `n / workers` rows; when `n` is not divisible by
/// `workers` the last `n % workers` rows are assigned to nobody and the
/// corresponding product rows stay untouched.
///
/// * `n`: Matrix dimension.
/// * `workers`: Number of workers, at least 1.
pub fn plan(n: usize, workers: usize) -> Result<Vec<RowBlock>> {
    if workers == 0 {
        return Err(Error::Config("at least one worker is required".into()));
    }
    if n == 0 {
        return Err(Error::Config("matrix dimension must be positive".into()));
    }

    let rows_per_worker = n / workers;
    Ok((0..workers)
        .map(|i| RowBlock {
            offset: i * rows_per_worker,
            count: rows_per_worker,
        })
        .collect())
}
