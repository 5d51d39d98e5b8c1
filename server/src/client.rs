use std::collections::VecDeque;

// ClientKey
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct ClientKey(u64);

impl ClientKey {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

/// Incoming clients wait for a snapshot, connected ones receive diffs
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum ClientStatus {
    Incoming,
    Connected,
}

pub(crate) struct Client {
    pub status: ClientStatus,
    outbox: VecDeque<Vec<u8>>,
    capacity: usize,
}

impl Client {
    pub fn new(capacity: usize) -> Self {
        Self {
            status: ClientStatus::Incoming,
            outbox: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Queues a frame; returns false when the outbox is already full
    pub fn push(&mut self, frame: Vec<u8>) -> bool {
        if self.outbox.len() >= self.capacity {
            return false;
        }
        self.outbox.push_back(frame);
        true
    }

    pub fn drain(&mut self) -> Vec<Vec<u8>> {
        self.outbox.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.outbox.len()
    }
}
