use crate::matrix::{Element, Matrix};
use crate::partition;
use crate::transport::{Rank, Transport, RESULT_TAG, WORK_TAG};
use crate::{Error, Result};

/// The overall work of the manager: plan the row split, ship every worker
/// its share, collect the partial products and assemble the result.
/// Returns a freshly zeroed product matrix; rows the plan does not cover
/// stay zero.
///
/// * `link`: Transport to send requests over.
/// * `a`: Left operand, `n x n`.
/// * `b`: Right operand, `n x n`.
/// * `workers`: Pool size, ranks `1..=workers`.
pub fn multiply<T, L>(link: &mut L, a: &Matrix<T>, b: &Matrix<T>, workers: usize) -> Result<Matrix<T>>
where
    T: Element,
    L: Transport<T>,
{
    let mut product = Matrix::zeros(a.rows(), a.rows());
    multiply_into(link, a, b, workers, &mut product)?;
    Ok(product)
}

/// Like [`multiply`], but assembles into a caller-provided buffer. Rows
/// outside every assigned block keep their prior contents.
pub fn multiply_into<T, L>(
    link: &mut L,
    a: &Matrix<T>,
    b: &Matrix<T>,
    workers: usize,
    product: &mut Matrix<T>,
) -> Result<()>
where
    T: Element,
    L: Transport<T>,
{
    let n = a.rows();
    if !a.is_square() || !b.is_square() || b.rows() != n {
        return Err(Error::Config(format!(
            "operands must be square with equal dimensions, got {}x{} and {}x{}",
            a.rows(),
            a.cols(),
            b.rows(),
            b.cols()
        )));
    }
    if product.rows() != n || product.cols() != n {
        return Err(Error::Config(format!(
            "product buffer is {}x{}, operands are {n}x{n}",
            product.rows(),
            product.cols()
        )));
    }

    // rejects an empty pool and a zero dimension before anything is sent
    let plan = partition::plan(n, workers)?;

    // ship each worker its rows of a and the whole of b
    for (i, block) in plan.iter().enumerate() {
        let dest = (i + 1) as Rank;
        link.send_index(dest, WORK_TAG, block.offset)?;
        link.send_index(dest, WORK_TAG, block.count)?;
        link.send_block(dest, WORK_TAG, a.row_block(block.offset, block.count))?;
        link.send_block(dest, WORK_TAG, b.as_slice())?;
    }

    // collect in the same rank order the work went out
    for (i, block) in plan.iter().enumerate() {
        let source = (i + 1) as Rank;
        let offset = link.recv_index(source, RESULT_TAG)?;
        let count = link.recv_index(source, RESULT_TAG)?;
        if offset != block.offset || count != block.count {
            return Err(Error::SizeMismatch {
                expected: block.count,
                got: count,
            });
        }
        link.recv_block(source, RESULT_TAG, product.row_block_mut(offset, count))?;
    }

    Ok(())
}
