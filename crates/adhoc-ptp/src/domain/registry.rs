//! Socket Registry
//!
//! Owns every [`PtpSocketState`] record and hands out generation-checked
//! handles in place of the original's pointer-as-integer scheme. A stale
//! handle (slot reused after removal) fails lookup with `NotFound` instead
//! of reading another socket's memory.

use crate::domain::{AdhocError, PtpSocketState};

/// Opaque reference to a registry-owned socket record.
///
/// `index` addresses the slot; `generation` must match the slot's current
/// generation, so handles die with their record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle {
    index: u32,
    generation: u32,
}

impl SocketHandle {
    /// Slot index, useful only for diagnostics.
    pub fn index(&self) -> u32 {
        self.index
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    record: Option<PtpSocketState>,
}

/// Arena of socket records.
///
/// Append order is preserved by slot index for enumeration stability; it
/// carries no other meaning.
#[derive(Debug)]
pub struct SocketRegistry {
    slots: Vec<Slot>,
    live: usize,
    max_sockets: usize,
}

impl SocketRegistry {
    /// Create an empty registry bounded at `max_sockets` live records.
    pub fn new(max_sockets: usize) -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
            max_sockets,
        }
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.live
    }

    /// True when no records are registered.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Register a record, reusing the first free slot or growing the arena.
    ///
    /// Fails with `SocketUnavailable` when the registry is at capacity; the
    /// caller still owns the record's transport descriptor and must close it.
    pub fn append(&mut self, record: PtpSocketState) -> Result<SocketHandle, AdhocError> {
        if self.live >= self.max_sockets {
            return Err(AdhocError::SocketUnavailable);
        }
        if let Some(index) = self.slots.iter().position(|s| s.record.is_none()) {
            let slot = &mut self.slots[index];
            slot.record = Some(record);
            self.live += 1;
            return Ok(SocketHandle {
                index: index as u32,
                generation: slot.generation,
            });
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            record: Some(record),
        });
        self.live += 1;
        Ok(SocketHandle {
            index,
            generation: 0,
        })
    }

    fn slot_for(&self, handle: SocketHandle) -> Option<&Slot> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
    }

    /// Look up a record by handle.
    pub fn get(&self, handle: SocketHandle) -> Result<&PtpSocketState, AdhocError> {
        self.slot_for(handle)
            .and_then(|s| s.record.as_ref())
            .ok_or(AdhocError::NotFound)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, handle: SocketHandle) -> Result<&mut PtpSocketState, AdhocError> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.record.as_mut())
            .ok_or(AdhocError::NotFound)
    }

    /// Detach a record, returning ownership to the caller.
    ///
    /// The caller is responsible for releasing the record's transport
    /// descriptor. The slot's generation is bumped so outstanding handles
    /// to the removed record go stale.
    pub fn remove(&mut self, handle: SocketHandle) -> Result<PtpSocketState, AdhocError> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .ok_or(AdhocError::NotFound)?;
        let record = slot.record.take().ok_or(AdhocError::NotFound)?;
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        Ok(record)
    }

    /// True if any live record holds `port` as its local port.
    ///
    /// All socket kinds share the virtual port namespace, so this scans
    /// every record regardless of state.
    pub fn is_port_in_use(&self, port: u16) -> bool {
        self.iter().any(|(_, rec)| rec.local_port == port)
    }

    /// Enumerate live records in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SocketHandle, &PtpSocketState)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.record.as_ref().map(|rec| {
                (
                    SocketHandle {
                        index: i as u32,
                        generation: slot.generation,
                    },
                    rec,
                )
            })
        })
    }

    /// Detach every record, emptying the registry.
    ///
    /// Used by subsystem shutdown; the caller closes each record's
    /// transport descriptor.
    pub fn take_all(&mut self) -> Vec<PtpSocketState> {
        let mut records = Vec::with_capacity(self.live);
        for slot in &mut self.slots {
            if let Some(record) = slot.record.take() {
                slot.generation = slot.generation.wrapping_add(1);
                records.push(record);
            }
        }
        self.live = 0;
        records
    }
}
