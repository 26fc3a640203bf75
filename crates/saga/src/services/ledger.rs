//! Redelivery guard for inbound envelopes.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use common::TransactionId;

use crate::channel::Channel;
use crate::envelope::ReplayKey;

/// Claims and closed sagas kept by [`DeliveryLedger::new`].
pub const DEFAULT_CAPACITY: usize = 65_536;

type Delivery = (Channel, ReplayKey);

#[derive(Debug, Default)]
struct LedgerState {
    /// Claimed deliveries and their claim sequence number.
    claims: HashMap<Delivery, u64>,
    /// Claims by age, oldest first.
    order: BTreeMap<u64, Delivery>,
    next_seq: u64,
    /// Sagas that finished or were dead-lettered, oldest first.
    closed: HashSet<TransactionId>,
    closed_order: VecDeque<TransactionId>,
}

/// Remembers which `(channel, replay key)` pairs are being or have been
/// processed, so a redelivered envelope is not routed twice.
///
/// When a saga ends it is [closed](Self::close): its claims are replaced by a
/// single tombstone and every later delivery for it is refused. Claims and
/// tombstones are each capped; past the cap the oldest entry is evicted.
#[derive(Debug, Clone)]
pub struct DeliveryLedger {
    capacity: usize,
    state: Arc<RwLock<LedgerState>>,
}

impl Default for DeliveryLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl DeliveryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a ledger holding at most `capacity` claims and `capacity`
    /// closed sagas. A zero capacity is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Arc::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Claims a delivery. Returns false if it was already claimed or its
    /// saga is closed.
    pub fn claim(&self, channel: &Channel, key: &ReplayKey) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.closed.contains(&key.transaction_id) {
            return false;
        }

        let delivery = (channel.clone(), key.clone());
        if state.claims.contains_key(&delivery) {
            return false;
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.claims.insert(delivery.clone(), seq);
        state.order.insert(seq, delivery);

        while state.claims.len() > self.capacity {
            let Some((_, oldest)) = state.order.pop_first() else {
                break;
            };
            state.claims.remove(&oldest);
            tracing::debug!(
                transaction_id = %oldest.1.transaction_id,
                channel = %oldest.0,
                "evicted oldest delivery claim"
            );
        }
        true
    }

    /// Releases a claim so a failed delivery can be retried.
    pub fn release(&self, channel: &Channel, key: &ReplayKey) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(seq) = state.claims.remove(&(channel.clone(), key.clone())) {
            state.order.remove(&seq);
        }
    }

    /// Ends a saga: drops its claims and refuses any further delivery for it.
    pub fn close(&self, transaction_id: &TransactionId) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state
            .claims
            .retain(|(_, key), _| &key.transaction_id != transaction_id);
        state
            .order
            .retain(|_, (_, key)| &key.transaction_id != transaction_id);

        if state.closed.insert(transaction_id.clone()) {
            state.closed_order.push_back(transaction_id.clone());
        }
        while state.closed_order.len() > self.capacity {
            if let Some(oldest) = state.closed_order.pop_front() {
                state.closed.remove(&oldest);
            }
        }
    }

    /// Returns true if `transaction_id` has been closed.
    pub fn is_closed(&self, transaction_id: &TransactionId) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .closed
            .contains(transaction_id)
    }

    /// Returns the number of claims currently held.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .claims
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of closed sagas remembered.
    pub fn closed_len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .closed
            .len()
    }
}
