//! Command line parsing
//!
//! A command line is `<verb><object>[<value>][;<id>]`. The parser is a
//! tolerant single pass over the raw bytes: anything that is not a letter
//! is skipped while hunting for the verb and object, the value runs to a
//! `;` or the end of the line, and the id follows the `;`. Both string
//! fields are bounded; bytes past the cap are dropped, never an error.
//!
//! A line with no letters at all leaves the sentinel verb/object in
//! place. That is not a parse failure - the dispatcher maps the sentinel
//! to its default branch.

use heapless::String;

/// Sentinel byte for an absent verb or object
pub const SENTINEL: u8 = b'?';

/// Maximum length of a command value string
pub const VALUE_SIZE: usize = 40;

/// Maximum length of a command id string
pub const ID_SIZE: usize = 8;

/// A command line split into its parts
///
/// One instance lives in each slot of the command queue and is fully
/// overwritten on every parse, so stale contents from a previous command
/// can never leak into a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParsedCommand {
    /// Single-character command verb
    pub verb: u8,
    /// Single-character command object
    pub object: u8,
    /// Value string for the object, silently truncated at [`VALUE_SIZE`]
    pub value: String<VALUE_SIZE>,
    /// Caller-chosen tracking id, silently truncated at [`ID_SIZE`]
    pub id: String<ID_SIZE>,
}

impl Default for ParsedCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ParsedCommand {
    /// Create an empty command with sentinel verb and object
    pub fn new() -> Self {
        Self {
            verb: SENTINEL,
            object: SENTINEL,
            value: String::new(),
            id: String::new(),
        }
    }

    /// Reset all fields to their pre-parse state
    pub fn clear(&mut self) {
        self.verb = SENTINEL;
        self.object = SENTINEL;
        self.value.clear();
        self.id.clear();
    }

    /// Parse a raw command line into this slot
    ///
    /// Single pass, O(line length), no allocation. Command lines are
    /// ASCII; bytes with the high bit set are treated as non-letters and
    /// dropped from the string fields.
    pub fn parse(&mut self, line: &[u8]) {
        self.clear();

        let mut bytes = line.iter().copied();

        // Find the verb
        let Some(verb) = bytes.by_ref().find(|&b| b.is_ascii_alphabetic()) else {
            return;
        };
        self.verb = verb;

        // Find the object
        let Some(object) = bytes.by_ref().find(|&b| b.is_ascii_alphabetic()) else {
            return;
        };
        self.object = object;

        // Collect the value up to the `;` delimiter, dropping overflow
        let mut in_id = false;
        for b in bytes {
            if !in_id {
                if b == b';' {
                    in_id = true;
                } else if b.is_ascii() {
                    let _ = self.value.push(b as char);
                }
            } else if b.is_ascii() {
                let _ = self.id.push(b as char);
            }
        }
    }
}
