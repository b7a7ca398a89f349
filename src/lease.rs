//! Fixed-capacity lease table.
//!
//! The table is an arena of `capacity` slots, each holding a client hash and
//! an absolute expiration time in seconds. A slot's *index* is the
//! externally meaningful value: the engine adds it to the configured base
//! address to form the client's assigned address. A client hash of 0 marks
//! an empty slot, so 0 is rejected as a lookup or allocation key.
//!
//! All operations are linear scans; with the intended table sizes (tens of
//! slots) a secondary index would buy nothing. Expiration is evaluated
//! lazily: the engine calls [`flush_expired`](LeaseTable::flush_expired)
//! once per inbound message, before any lookup.

/// One lease slot: client hash plus absolute expiration time in seconds.
///
/// `(0, 0)` is the empty state.
#[derive(Debug, Clone, Copy, Default)]
struct LeaseSlot {
    client_hash: u32,
    lease_end: u64,
}

/// Fixed-capacity associative store of client hash → slot index.
#[derive(Debug)]
pub struct LeaseTable {
    slots: Box<[LeaseSlot]>,
}

impl LeaseTable {
    /// Creates an empty table with `capacity` slots. The capacity is fixed
    /// for the lifetime of the table.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![LeaseSlot::default(); capacity].into_boxed_slice(),
        }
    }

    /// Tries to allocate a new lease for `client_hash`, expiring at the
    /// absolute time `lease_end`.
    ///
    /// Returns the allocated slot index, or `None` if the hash is the empty
    /// sentinel (0), a lease for this client already exists, or the table
    /// is full.
    pub fn new_lease(&mut self, client_hash: u32, lease_end: u64) -> Option<usize> {
        if client_hash == 0 || self.get_lease(client_hash).is_some() {
            return None;
        }

        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.client_hash == 0 {
                slot.client_hash = client_hash;
                slot.lease_end = lease_end;
                return Some(index);
            }
        }
        None
    }

    /// Returns the slot index leased to `client_hash`, if any.
    pub fn get_lease(&self, client_hash: u32) -> Option<usize> {
        if client_hash == 0 {
            return None;
        }
        self.slots
            .iter()
            .position(|slot| slot.client_hash == client_hash)
    }

    /// Updates the expiration time of an existing lease. Returns false if
    /// the client holds no lease.
    pub fn update_lease(&mut self, client_hash: u32, lease_end: u64) -> bool {
        if client_hash == 0 {
            return false;
        }
        for slot in self.slots.iter_mut() {
            if slot.client_hash == client_hash {
                slot.lease_end = lease_end;
                return true;
            }
        }
        false
    }

    /// Frees every slot whose expiration time is at or before `curr_time`.
    pub fn flush_expired(&mut self, curr_time: u64) {
        for slot in self.slots.iter_mut() {
            if slot.lease_end <= curr_time {
                *slot = LeaseSlot::default();
            }
        }
    }

    /// Number of occupied slots.
    pub fn active_leases(&self) -> usize {
        self.slots.iter().filter(|slot| slot.client_hash != 0).count()
    }

    /// Table capacity in slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
