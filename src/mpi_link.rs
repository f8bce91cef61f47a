use mpi::topology::SimpleCommunicator;
use mpi::traits::*;

use crate::transport::{Rank, Tag, Transport};
use crate::{Error, Result};

/// Point-to-point transport over a real MPI communicator.
pub struct MpiLink<'a> {
    world: &'a SimpleCommunicator,
}

impl<'a> MpiLink<'a> {
    pub fn new(world: &'a SimpleCommunicator) -> Self {
        Self { world }
    }

    pub fn rank(&self) -> Rank {
        self.world.rank()
    }

    /// Pool size with rank 0 taken by the manager.
    pub fn workers(&self) -> usize {
        (self.world.size() - 1).max(0) as usize
    }
}

impl<T: Equivalence> Transport<T> for MpiLink<'_> {
    fn send_index(&mut self, dest: Rank, tag: Tag, value: usize) -> Result<()> {
        self.world
            .process_at_rank(dest)
            .send_with_tag(&(value as i32), tag);
        Ok(())
    }

    fn recv_index(&mut self, source: Rank, tag: Tag) -> Result<usize> {
        let (value, _status): (i32, _) = self.world.process_at_rank(source).receive_with_tag(tag);
        Ok(value as usize)
    }

    fn send_block(&mut self, dest: Rank, tag: Tag, block: &[T]) -> Result<()> {
        self.world.process_at_rank(dest).send_with_tag(block, tag);
        Ok(())
    }

    fn recv_block(&mut self, source: Rank, tag: Tag, buf: &mut [T]) -> Result<()> {
        let status = self
            .world
            .process_at_rank(source)
            .receive_into_with_tag(buf, tag);

        let got = status.count(T::equivalent_datatype()) as usize;
        if got != buf.len() {
            return Err(Error::SizeMismatch {
                expected: buf.len(),
                got,
            });
        }
        Ok(())
    }
}
