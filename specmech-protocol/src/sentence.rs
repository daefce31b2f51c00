//! NMEA-style response sentence framing
//!
//! Every line the board emits (command echo, reports, errors) uses the
//! same frame:
//!
//! ```text
//! $S<specID><TAG>,<field>,...,<id>*<HH>\r\n
//! ```
//!
//! where `<specID>` is the spectrograph unit number read from strap
//! pins, `<TAG>` is a three-character report type, and `<HH>` is the
//! running XOR of every byte after the leading `$`, rendered as two
//! uppercase hex digits. The format borrows marine-electronics framing
//! purely as a wire convention.

use core::fmt;

use heapless::String;

/// Maximum length of a framed sentence, including checksum and CRLF
///
/// Sized for the longest input line plus header and trailer.
pub const MAX_SENTENCE_SIZE: usize = 96;

/// Bytes reserved for the `*HH\r\n` trailer
const TRAILER_SIZE: usize = 5;

/// Body bytes available before the trailer must start
const BODY_LIMIT: usize = MAX_SENTENCE_SIZE - TRAILER_SIZE;

/// Ready-for-next-command prompt
pub const PROMPT_READY: &[u8] = b">";

/// Awaiting-reboot-acknowledgment prompt
pub const PROMPT_AWAIT: &[u8] = b"!";

/// Three-character report type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportTag {
    /// Command echo
    Cmd,
    /// Boot time
    Btm,
    /// Environment (temperatures and humidity)
    Env,
    /// Controller clock time
    Tim,
    /// Ion pump vacuum
    Vac,
    /// Firmware version
    Ver,
    /// Command error
    Err,
}

impl ReportTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportTag::Cmd => "CMD",
            ReportTag::Btm => "BTM",
            ReportTag::Env => "ENV",
            ReportTag::Tim => "TIM",
            ReportTag::Vac => "VAC",
            ReportTag::Ver => "VER",
            ReportTag::Err => "ERR",
        }
    }
}

/// Outcome class of a processed command
///
/// This is the single channel by which a dispatch outcome reaches the
/// transport: it selects exactly which sentence and prompt go out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PromptClass {
    /// `>` - command completed, ready for the next one
    Normal,
    /// `ERR` sentence followed by `>` - the operator regains control
    /// after any single command's failure
    Error,
    /// `!` - reboot not yet acknowledged
    AwaitingReboot,
}

/// A response sentence under construction
///
/// Fields are appended comma-separated; [`Sentence::finish`] seals the
/// frame with the checksum trailer. Output is bounded: bytes past
/// [`MAX_SENTENCE_SIZE`] (less the trailer) are dropped rather than
/// overflowing, matching the fixed-buffer discipline of the rest of the
/// protocol.
#[derive(Debug, Clone)]
pub struct Sentence {
    buf: String<MAX_SENTENCE_SIZE>,
}

impl Sentence {
    /// Start a sentence header: `$S<spec_id><TAG>`
    pub fn new(spec_id: u8, tag: ReportTag) -> Self {
        let mut sentence = Self { buf: String::new() };
        // Header always fits in an empty buffer
        let _ = write_truncating(&mut sentence, format_args!("$S{}{}", spec_id, tag.as_str()));
        sentence
    }

    /// Append a comma followed by a string field
    pub fn push_field(&mut self, field: &str) -> &mut Self {
        self.push_char(',');
        for c in field.chars() {
            self.push_char(c);
        }
        self
    }

    /// Append a comma followed by a formatted field
    pub fn push_fmt(&mut self, args: fmt::Arguments<'_>) -> &mut Self {
        self.push_char(',');
        let _ = write_truncating(self, args);
        self
    }

    /// Append a comma followed by raw line bytes (used for the echo)
    ///
    /// Non-ASCII bytes are dropped; the transport is an ASCII terminal
    /// line.
    pub fn push_field_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.push_char(',');
        for &b in bytes {
            if b.is_ascii() {
                self.push_char(b as char);
            }
        }
        self
    }

    /// Seal the frame: append `*<HH>\r\n` and return the full sentence
    ///
    /// The checksum is the XOR of every byte after the leading `$`,
    /// which is excluded by design.
    pub fn finish(mut self) -> String<MAX_SENTENCE_SIZE> {
        let sum = checksum(self.buf.as_bytes());
        // The body stops at BODY_LIMIT, so the trailer always fits
        let _ = fmt::write(&mut self.buf, format_args!("*{:02X}\r\n", sum));
        self.buf
    }

    /// Push one body character, dropping it if the body is full
    fn push_char(&mut self, c: char) {
        if self.buf.len() < BODY_LIMIT {
            let _ = self.buf.push(c);
        }
    }
}

/// XOR checksum over a sentence body, skipping the leading `$`
pub fn checksum(body: &[u8]) -> u8 {
    body.iter().skip(1).fold(0, |acc, &b| acc ^ b)
}

/// `core::fmt::Write` adapter that drops body bytes past the limit
/// instead of failing the whole write
struct Truncating<'a>(&'a mut Sentence);

impl fmt::Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            self.0.push_char(c);
        }
        Ok(())
    }
}

fn write_truncating(sentence: &mut Sentence, args: fmt::Arguments<'_>) -> fmt::Result {
    fmt::write(&mut Truncating(sentence), args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_frame() {
        let mut s = Sentence::new(1, ReportTag::Cmd);
        s.push_field_bytes(b"os");
        let out = s.finish();

        // $S1CMD,os then * checksum
        assert!(out.starts_with("$S1CMD,os*"));
        assert!(out.ends_with("\r\n"));
    }

    #[test]
    fn test_checksum_excludes_dollar() {
        // Checksum of "$AB" is 'A' ^ 'B', the '$' does not participate
        assert_eq!(checksum(b"$AB"), b'A' ^ b'B');
        assert_eq!(checksum(b"$"), 0);
    }

    #[test]
    fn test_checksum_round_trip() {
        let mut s = Sentence::new(2, ReportTag::Tim);
        s.push_field("2021-01-24T10:00:00Z").push_field("007");
        let out = s.finish();

        // Recompute over the body between '$'+1 and '*'
        let star = out.rfind('*').unwrap();
        let body = &out.as_bytes()[..star];
        let sum = checksum(body);

        let digits = &out[star + 1..star + 3];
        assert_eq!(digits, std::format!("{:02X}", sum));
    }

    #[test]
    fn test_error_sentence() {
        let out = Sentence::new(3, ReportTag::Err).finish();
        assert!(out.starts_with("$S3ERR*"));
    }

    #[test]
    fn test_formatted_fields() {
        let mut s = Sentence::new(1, ReportTag::Vac);
        s.push_fmt(format_args!("{:5.2}", 6.25_f32));
        s.push_field("rvac");
        let out = s.finish();
        assert!(out.starts_with("$S1VAC, 6.25,rvac*"));
    }

    #[test]
    fn test_overlong_field_truncates_not_panics() {
        let mut s = Sentence::new(1, ReportTag::Cmd);
        let long = [b'x'; 200];
        s.push_field_bytes(&long);
        let out = s.finish();
        assert!(out.len() <= MAX_SENTENCE_SIZE);
        assert!(out.ends_with("\r\n"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// XOR-ing the emitted body bytes always reproduces the two
            /// hex digits of the trailer.
            #[test]
            fn checksum_round_trip(field in "[ -)+-~]{0,40}") {
                let mut s = Sentence::new(1, ReportTag::Cmd);
                s.push_field(&field);
                let out = s.finish();

                let star = out.rfind('*').unwrap();
                let sum = checksum(&out.as_bytes()[..star]);

                let hi = char::from_digit((sum >> 4) as u32, 16).unwrap()
                    .to_ascii_uppercase();
                let lo = char::from_digit((sum & 0xF) as u32, 16).unwrap()
                    .to_ascii_uppercase();
                prop_assert_eq!(&out[star + 1..star + 3],
                    &[hi, lo].iter().collect::<std::string::String>());
            }

            /// The parser half: arbitrary bytes never panic the framer.
            #[test]
            fn arbitrary_echo_never_panics(line in proptest::collection::vec(any::<u8>(), 0..120)) {
                let mut s = Sentence::new(9, ReportTag::Cmd);
                s.push_field_bytes(&line);
                let out = s.finish();
                prop_assert!(out.len() <= MAX_SENTENCE_SIZE);
            }
        }
    }
}
