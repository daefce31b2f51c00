//! Command dispatcher
//!
//! One call to [`Engine::process_line`] takes a complete input line
//! through the whole protocol: reboot gate, unconditional echo, parse
//! into the current queue slot, verb dispatch, prompt. Device I/O runs
//! synchronously inside the call; the next line is not accepted until
//! this one has run to completion or a detected bus error.
//!
//! The verb table is fixed and closed:
//!
//! | verb | action                                             |
//! |------|----------------------------------------------------|
//! | `c`  | close mechanism (object: `s`/`l`/`r`/`b`)          |
//! | `o`  | open mechanism                                     |
//! | `m`  | forward extended motion command                    |
//! | `r`  | report (`B` boot, `e` env, `t` time, `v` vacuum, `V` version) |
//! | `s`  | set (`t` clock, value must be 19 characters)       |
//! | `t`  | self-test routine                                  |
//! | `R`  | reboot the processor                               |

use specmech_hal::SerialTx;
use specmech_protocol::sentence::{PROMPT_AWAIT, PROMPT_READY};
use specmech_protocol::{PromptClass, ReportTag, Sentence};

use crate::gate::{GateDecision, RebootGate};
use crate::instrument::{Instrument, IsoTime, Mechanism, ValveAction};
use crate::queue::CommandQueue;

/// Per-unit configuration captured at startup
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Spectrograph unit number from the ID strap pins
    pub spec_id: u8,
    /// Firmware version string for `rV`
    pub version: &'static str,
    /// Clock time recorded once at power-up, served by `rB`
    pub boot_time: IsoTime,
}

/// What the caller must do after a processed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Disposition {
    /// Keep accepting lines
    Continue,
    /// Let the transport drain briefly, then reset the processor; the
    /// engine state is dead
    Reboot,
}

/// The command engine: queue, gate, and dispatch state
///
/// All state lives here, owned by whoever owns the engine; nothing is
/// process-wide.
pub struct Engine {
    config: EngineConfig,
    queue: CommandQueue,
    gate: RebootGate,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            queue: CommandQueue::new(),
            gate: RebootGate::new(),
        }
    }

    /// Command history and cursor, for inspection
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// True until the host has acknowledged the restart
    pub fn awaiting_ack(&self) -> bool {
        self.gate.is_locked()
    }

    /// Process one complete input line (terminator already stripped)
    pub fn process_line<I: Instrument, T: SerialTx>(
        &mut self,
        line: &[u8],
        instrument: &mut I,
        tx: &mut T,
    ) -> Disposition {
        match self.gate.admit(line) {
            GateDecision::Rejected => {
                self.send_prompt(PromptClass::AwaitingReboot, tx);
                return Disposition::Continue;
            }
            GateDecision::Acknowledged => {
                instrument.arm_status_tick();
                self.send_prompt(PromptClass::Normal, tx);
                return Disposition::Continue;
            }
            GateDecision::ForceReboot => return Disposition::Reboot,
            GateDecision::Pass => {}
        }

        // Unconditional transcript of the accepted line, before dispatch
        self.echo(line, tx);

        // A bare terminator is a neutral no-op, not an error
        if line.is_empty() {
            self.send_prompt(PromptClass::Normal, tx);
            return Disposition::Continue;
        }

        self.queue.current_mut().parse(line);
        let verb = self.queue.current().verb;
        let object = self.queue.current().object;

        let prompt = match verb {
            b'c' => self.actuate(object, ValveAction::Close, instrument),
            b'o' => self.actuate(object, ValveAction::Open, instrument),
            b'm' => {
                let value = self.queue.current().value.clone();
                match instrument.motion_command(&value) {
                    Ok(()) => PromptClass::Normal,
                    Err(_) => PromptClass::Error,
                }
            }
            b'r' => self.report(object, instrument, tx),
            b's' => self.set(object, instrument),
            b't' => {
                instrument.self_test();
                PromptClass::Normal
            }
            b'R' => {
                self.send_prompt(PromptClass::Normal, tx);
                self.queue.advance();
                return Disposition::Reboot;
            }
            // Unknown verbs, including the parser's '?' sentinel
            _ => PromptClass::Error,
        };

        self.queue.advance();
        self.send_prompt(prompt, tx);
        Disposition::Continue
    }

    /// Open or close the mechanism named by the object character
    fn actuate<I: Instrument>(
        &self,
        object: u8,
        action: ValveAction,
        instrument: &mut I,
    ) -> PromptClass {
        let Some(target) = Mechanism::from_object(object) else {
            return PromptClass::Error;
        };
        match instrument.actuate_valves(target, action) {
            Ok(()) => PromptClass::Normal,
            Err(_) => PromptClass::Error,
        }
    }

    /// Dispatch a report command on its object character
    ///
    /// Device read failures are embedded in the sentence content, not
    /// fatal; only an unrecognized object is an error.
    fn report<I: Instrument, T: SerialTx>(
        &self,
        object: u8,
        instrument: &mut I,
        tx: &mut T,
    ) -> PromptClass {
        let id = self.queue.current().id.as_str();

        match object {
            b'B' => {
                let mut s = Sentence::new(self.config.spec_id, ReportTag::Btm);
                s.push_field(&self.config.boot_time).push_field(id);
                self.send(s, tx);
            }
            b'e' => {
                let env = instrument.read_environment();
                let mut s = Sentence::new(self.config.spec_id, ReportTag::Env);
                for i in 0..3 {
                    let t = env.temperatures_c[i].unwrap_or(f32::NAN);
                    let h = env.humidity_pct[i].unwrap_or(f32::NAN);
                    s.push_fmt(format_args!("{:.1}C", t));
                    s.push_fmt(format_args!("{:.0}%", h));
                }
                let t3 = env.temperatures_c[3].unwrap_or(f32::NAN);
                s.push_fmt(format_args!("{:.1}C", t3));
                s.push_field(id);
                self.send(s, tx);
            }
            b't' => {
                let mut s = Sentence::new(self.config.spec_id, ReportTag::Tim);
                match instrument.read_clock() {
                    Ok(time) => s.push_field(&time),
                    Err(_) => s.push_field("clock read error"),
                };
                s.push_field(id);
                self.send(s, tx);
            }
            b'v' => {
                let vac = instrument.read_vacuum();
                let mut s = Sentence::new(self.config.spec_id, ReportTag::Vac);
                s.push_fmt(format_args!("{:5.2}", vac.red_torr.unwrap_or(f32::NAN)));
                s.push_field("rvac");
                s.push_fmt(format_args!("{:5.2}", vac.blue_torr.unwrap_or(f32::NAN)));
                s.push_field("bvac");
                s.push_field(id);
                self.send(s, tx);
            }
            b'V' => {
                let mut s = Sentence::new(self.config.spec_id, ReportTag::Ver);
                s.push_field(self.config.version).push_field(id);
                self.send(s, tx);
            }
            _ => return PromptClass::Error,
        }

        PromptClass::Normal
    }

    /// Dispatch a set command on its object character
    fn set<I: Instrument>(&self, object: u8, instrument: &mut I) -> PromptClass {
        match object {
            b't' => {
                let value = self.queue.current().value.as_str();
                // The clock takes exactly YYYY-MM-DDThh:mm:ss
                if value.len() != 19 {
                    return PromptClass::Error;
                }
                match instrument.set_clock(value) {
                    Ok(()) => PromptClass::Normal,
                    Err(_) => PromptClass::Error,
                }
            }
            _ => PromptClass::Error,
        }
    }

    /// Echo the raw line back, framed as a `CMD` sentence
    fn echo<T: SerialTx>(&self, line: &[u8], tx: &mut T) {
        let mut s = Sentence::new(self.config.spec_id, ReportTag::Cmd);
        s.push_field_bytes(line);
        self.send(s, tx);
    }

    /// Emit the prompt for a dispatch outcome
    fn send_prompt<T: SerialTx>(&self, prompt: PromptClass, tx: &mut T) {
        match prompt {
            PromptClass::Normal => {
                let _ = tx.write_all(PROMPT_READY);
            }
            PromptClass::Error => {
                let err = Sentence::new(self.config.spec_id, ReportTag::Err).finish();
                let _ = tx.write_all(err.as_bytes());
                let _ = tx.write_all(PROMPT_READY);
            }
            PromptClass::AwaitingReboot => {
                let _ = tx.write_all(PROMPT_AWAIT);
            }
        }
        let _ = tx.flush();
    }

    fn send<T: SerialTx>(&self, sentence: Sentence, tx: &mut T) {
        // The response transport has no error back-channel; a failed
        // write is unrecoverable from here
        let _ = tx.write_all(sentence.finish().as_bytes());
    }
}
