//! specMech serial command protocol
//!
//! This crate defines the line protocol between the controller board and
//! the observatory host. One command per line in, checksummed NMEA-style
//! sentences out:
//!
//! ```text
//! host:  os\r
//! board: $S1CMD,os*4F\r\n      (unconditional echo)
//! board: >                     (ready prompt)
//! ```
//!
//! Command grammar is `<verb><object>[<value>][;<id>]` with single-letter
//! verbs and objects. Sentences carry a two-digit XOR checksum computed
//! over every byte after the leading `$`.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod sentence;

pub use command::{ParsedCommand, ID_SIZE, SENTINEL, VALUE_SIZE};
pub use sentence::{PromptClass, ReportTag, Sentence, MAX_SENTENCE_SIZE};
