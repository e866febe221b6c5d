//! Identifiers and simple allocators for scene nodes and scheduled commands.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct NodeId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CommandId(pub u32);

impl NodeId {
    /// Dense arena index for this node.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl CommandId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cmd#{}", self.0)
    }
}

/// Monotonic allocator for NodeId and CommandId.
/// Dense indices double as arena slots; IDs are opaque externally.
#[derive(Default, Debug, Clone)]
pub struct IdAllocator {
    next_node: u32,
    next_command: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node = self.next_node.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_command(&mut self) -> CommandId {
        let id = CommandId(self.next_command);
        self.next_command = self.next_command.wrapping_add(1);
        id
    }

    /// Peek the id the next `alloc_command` call will hand out.
    #[inline]
    pub fn peek_command(&self) -> CommandId {
        CommandId(self.next_command)
    }
}
