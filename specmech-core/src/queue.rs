//! Bounded command queue
//!
//! A fixed ring of parsed-command slots indexed by a wrapping cursor.
//! The dispatcher parses each accepted line into the current slot and
//! advances the cursor exactly once per processed command, success or
//! failure alike, so the queue can never stall. It is a depth-bounded
//! history of recent commands, not a pipeline: only the current slot is
//! ever live.

use specmech_protocol::ParsedCommand;

/// Number of stacked-up commands kept
pub const QUEUE_DEPTH: usize = 10;

/// Fixed-capacity circular command store
#[derive(Debug, Clone)]
pub struct CommandQueue {
    slots: [ParsedCommand; QUEUE_DEPTH],
    cursor: usize,
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| ParsedCommand::new()),
            cursor: 0,
        }
    }

    /// The slot the next command will be parsed into
    pub fn current(&self) -> &ParsedCommand {
        &self.slots[self.cursor]
    }

    /// Mutable access to the current slot for parsing
    pub fn current_mut(&mut self) -> &mut ParsedCommand {
        &mut self.slots[self.cursor]
    }

    /// Advance the cursor, wrapping modulo the queue depth
    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % QUEUE_DEPTH;
    }

    /// Current cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Look at a previously processed slot (history inspection)
    pub fn slot(&self, index: usize) -> &ParsedCommand {
        &self.slots[index % QUEUE_DEPTH]
    }
}
