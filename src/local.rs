use std::collections::{HashMap, VecDeque};
use std::sync::mpsc::{self, Receiver, Sender};

use crate::transport::{Rank, Tag, Transport};
use crate::{Error, Result};

enum Payload<T> {
    Index(usize),
    Block(Vec<T>),
}

struct Envelope<T> {
    source: Rank,
    tag: Tag,
    payload: Payload<T>,
}

/// One participant's endpoint of an in-process group, typically driven
/// with one thread per participant. Delivery is by value over channels,
/// so mailboxes share no matrix buffers.
pub struct Mailbox<T> {
    rank: Rank,
    peers: HashMap<Rank, Sender<Envelope<T>>>,
    inbox: Receiver<Envelope<T>>,
    stash: VecDeque<Envelope<T>>,
}

/// Wires up a fully connected group of `participants` mailboxes, rank `i`
/// at index `i`.
pub fn mailboxes<T>(participants: usize) -> Vec<Mailbox<T>> {
    let (senders, inboxes): (Vec<_>, Vec<_>) =
        (0..participants).map(|_| mpsc::channel()).unzip();

    inboxes
        .into_iter()
        .enumerate()
        .map(|(rank, inbox)| Mailbox {
            rank: rank as Rank,
            peers: senders
                .iter()
                .enumerate()
                .map(|(peer, sender)| (peer as Rank, sender.clone()))
                .collect(),
            inbox,
            stash: VecDeque::new(),
        })
        .collect()
}

impl<T> Mailbox<T> {
    pub fn rank(&self) -> Rank {
        self.rank
    }

    fn post(&self, dest: Rank, tag: Tag, payload: Payload<T>) -> Result<()> {
        let peer = self
            .peers
            .get(&dest)
            .ok_or_else(|| Error::PartnerUnavailable(format!("no participant with rank {dest}")))?;
        peer.send(Envelope {
            source: self.rank,
            tag,
            payload,
        })
        .map_err(|_| Error::PartnerUnavailable(format!("participant {dest} is gone")))
    }

    /// Takes the next message matching `source` and `tag`, stashing
    /// whatever else arrives in the meantime for later receives.
    fn take_matching(&mut self, source: Rank, tag: Tag) -> Result<Payload<T>> {
        if let Some(pos) = self
            .stash
            .iter()
            .position(|e| e.source == source && e.tag == tag)
        {
            if let Some(envelope) = self.stash.remove(pos) {
                return Ok(envelope.payload);
            }
        }

        loop {
            let envelope = self.inbox.recv().map_err(|_| {
                Error::PartnerUnavailable(format!("no message from rank {source} will ever arrive"))
            })?;
            if envelope.source == source && envelope.tag == tag {
                return Ok(envelope.payload);
            }
            self.stash.push_back(envelope);
        }
    }
}

impl<T: Clone> Transport<T> for Mailbox<T> {
    fn send_index(&mut self, dest: Rank, tag: Tag, value: usize) -> Result<()> {
        self.post(dest, tag, Payload::Index(value))
    }

    fn recv_index(&mut self, source: Rank, tag: Tag) -> Result<usize> {
        match self.take_matching(source, tag)? {
            Payload::Index(value) => Ok(value),
            Payload::Block(block) => Err(Error::SizeMismatch {
                expected: 1,
                got: block.len(),
            }),
        }
    }

    fn send_block(&mut self, dest: Rank, tag: Tag, block: &[T]) -> Result<()> {
        self.post(dest, tag, Payload::Block(block.to_vec()))
    }

    fn recv_block(&mut self, source: Rank, tag: Tag, buf: &mut [T]) -> Result<()> {
        match self.take_matching(source, tag)? {
            Payload::Block(block) if block.len() == buf.len() => {
                buf.clone_from_slice(&block);
                Ok(())
            }
            Payload::Block(block) => Err(Error::SizeMismatch {
                expected: buf.len(),
                got: block.len(),
            }),
            Payload::Index(_) => Err(Error::SizeMismatch {
                expected: buf.len(),
                got: 1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{RESULT_TAG, WORK_TAG};

    #[test]
    fn delivers_between_ranks() {
        let mut boxes = mailboxes::<f64>(2);
        let mut receiver = boxes.pop().unwrap();
        let mut sender = boxes.pop().unwrap();

        sender.send_index(1, WORK_TAG, 42).unwrap();

        assert_eq!(receiver.recv_index(0, WORK_TAG).unwrap(), 42);
    }

    #[test]
    fn matches_by_tag_regardless_of_arrival_order() {
        let mut boxes = mailboxes::<f64>(2);
        let mut receiver = boxes.pop().unwrap();
        let mut sender = boxes.pop().unwrap();

        sender.send_index(1, RESULT_TAG, 7).unwrap();
        sender.send_index(1, WORK_TAG, 3).unwrap();

        // the work message arrived second but is asked for first
        assert_eq!(receiver.recv_index(0, WORK_TAG).unwrap(), 3);
        assert_eq!(receiver.recv_index(0, RESULT_TAG).unwrap(), 7);
    }

    #[test]
    fn preserves_send_order_within_a_tag() {
        let mut boxes = mailboxes::<f64>(2);
        let mut receiver = boxes.pop().unwrap();
        let mut sender = boxes.pop().unwrap();

        for value in [1, 2, 3] {
            sender.send_index(1, WORK_TAG, value).unwrap();
        }

        for expected in [1, 2, 3] {
            assert_eq!(receiver.recv_index(0, WORK_TAG).unwrap(), expected);
        }
    }

    #[test]
    fn rejects_unknown_rank() {
        let mut boxes = mailboxes::<f64>(2);
        let mut sender = boxes.remove(0);

        let result = sender.send_index(7, WORK_TAG, 0);

        assert!(matches!(result, Err(Error::PartnerUnavailable(_))));
    }

    #[test]
    fn send_to_departed_peer_fails() {
        let mut boxes = mailboxes::<f64>(2);
        let departed = boxes.pop().unwrap();
        let mut sender = boxes.pop().unwrap();
        drop(departed);

        let result = sender.send_index(1, WORK_TAG, 0);

        assert!(matches!(result, Err(Error::PartnerUnavailable(_))));
    }

    #[test]
    fn undersized_block_is_a_size_mismatch() {
        let mut boxes = mailboxes::<f64>(2);
        let mut receiver = boxes.pop().unwrap();
        let mut sender = boxes.pop().unwrap();

        sender.send_block(1, WORK_TAG, &[1.0, 2.0, 3.0]).unwrap();

        let mut buf = [0.0; 5];
        let result = receiver.recv_block(0, WORK_TAG, &mut buf);

        assert!(matches!(
            result,
            Err(Error::SizeMismatch {
                expected: 5,
                got: 3
            })
        ));
    }
}
