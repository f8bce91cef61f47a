use crate::matrix::{self, Element, Matrix};
use crate::transport::{Transport, RESULT_TAG, ROOT_RANK, WORK_TAG};
use crate::Result;

/// Serves a single row-block assignment: receive the offset, the row
/// count, the rows of the left operand and the whole right operand,
/// multiply, and send the rows of the product back under the original
/// offset. Every run hands each worker exactly one assignment.
///
/// * `link`: Transport to talk to the manager over.
/// * `n`: Matrix dimension all participants were launched with.
pub fn serve<T, L>(link: &mut L, n: usize) -> Result<()>
where
    T: Element,
    L: Transport<T>,
{
    let offset = link.recv_index(ROOT_RANK, WORK_TAG)?;
    let count = link.recv_index(ROOT_RANK, WORK_TAG)?;

    let mut fragment = Matrix::zeros(count, n);
    link.recv_block(ROOT_RANK, WORK_TAG, fragment.as_mut_slice())?;

    let mut b = Matrix::zeros(n, n);
    link.recv_block(ROOT_RANK, WORK_TAG, b.as_mut_slice())?;

    let partial = matrix::multiply(&fragment, &b);

    link.send_index(ROOT_RANK, RESULT_TAG, offset)?;
    link.send_index(ROOT_RANK, RESULT_TAG, count)?;
    link.send_block(ROOT_RANK, RESULT_TAG, partial.as_slice())?;

    Ok(())
}
