//! Focus bookkeeping between the editor core and the rendering layer.
//!
//! The renderer registers every block and list item it mounts and receives
//! an opaque handle for it. Focus requests name ids, never handles, and are
//! only released once their target has been mounted, since caret placement
//! needs the new layout.

use std::collections::HashMap;

use log::trace;

use crate::types::{BlockId, Caret, Edge, ItemId};

/// A block, or an item inside a list block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusTarget {
    pub block: BlockId,
    pub item: Option<ItemId>,
}

impl FocusTarget {
    pub fn block(block: BlockId) -> Self {
        Self { block, item: None }
    }

    pub fn item(block: BlockId, item: ItemId) -> Self {
        Self {
            block,
            item: Some(item),
        }
    }
}

impl From<Caret> for FocusTarget {
    fn from(caret: Caret) -> Self {
        Self {
            block: caret.block,
            item: caret.item,
        }
    }
}

/// "Focus `target` with the caret at `edge`."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    pub target: FocusTarget,
    pub edge: Edge,
}

impl FocusRequest {
    pub fn new(target: FocusTarget, edge: Edge) -> Self {
        Self { target, edge }
    }

    /// Focus at an exact caret position.
    pub fn at(caret: Caret) -> Self {
        Self {
            target: caret.into(),
            edge: Edge::Offset(caret.offset),
        }
    }
}

/// Opaque token the rendering layer maps to its own node handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FocusHandle(u64);

impl FocusHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Id-indexed registry of mounted focus targets plus one pending request.
#[derive(Debug, Default)]
pub struct FocusRegistry {
    handles: HashMap<FocusTarget, FocusHandle>,
    next_handle: u64,
    pending: Option<FocusRequest>,
}

impl FocusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mounted target. Re-registering keeps the existing handle.
    pub fn register(&mut self, target: FocusTarget) -> FocusHandle {
        if let Some(handle) = self.handles.get(&target) {
            return *handle;
        }
        let handle = FocusHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(target, handle);
        handle
    }

    pub fn unregister(&mut self, target: &FocusTarget) -> Option<FocusHandle> {
        self.handles.remove(target)
    }

    /// Forgets every mounted target and the pending request.
    pub fn clear(&mut self) {
        self.handles.clear();
        self.pending = None;
    }

    /// Drops every target for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&FocusTarget) -> bool) {
        self.handles.retain(|target, _| keep(target));
    }

    pub fn handle(&self, target: &FocusTarget) -> Option<FocusHandle> {
        self.handles.get(target).copied()
    }

    pub fn is_mounted(&self, target: &FocusTarget) -> bool {
        self.handles.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Queues a request, replacing any older one.
    pub fn request(&mut self, request: FocusRequest) {
        trace!("focus requested: {:?}", request);
        self.pending = Some(request);
    }

    pub fn pending(&self) -> Option<&FocusRequest> {
        self.pending.as_ref()
    }

    /// Releases the pending request once its target is mounted.
    pub fn take_ready(&mut self) -> Option<(FocusHandle, FocusRequest)> {
        let request = self.pending?;
        let handle = self.handle(&request.target)?;
        self.pending = None;
        Some((handle, request))
    }
}
