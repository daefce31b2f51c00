//! specMech - spectrograph motion/utility controller firmware
//!
//! Main firmware binary for the RP2040-based controller board. One
//! synchronous command loop owns every peripheral: read a line from the
//! console UART, run it through the command engine, emit the response
//! sentences and the prompt. Between lines the loop wakes periodically
//! for the status tick.

#![no_std]
#![no_main]

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Input, Pull};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{
    Config as UartConfig, InterruptHandler as UartInterruptHandler, Uart,
};
use embassy_rp::watchdog::Watchdog;
use embassy_time::{with_timeout, Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use specmech_core::{Disposition, Engine, EngineConfig};
use specmech_hal::SerialTx;
use specmech_protocol::sentence::PROMPT_AWAIT;

use crate::board::{Board, ConsoleTx};
use crate::twi::SoftTwi;

mod board;
mod twi;

/// Firmware version string served by `rV`
const VERSION: &str = "2026-08-25";

/// Longest accepted input line; bytes past this are dropped until the
/// terminator arrives
const LINE_SIZE: usize = 80;

/// Idle period between status ticks while no input is arriving
const TICK_PERIOD: Duration = Duration::from_secs(10);

bind_interrupts!(struct Irqs {
    UART0_IRQ => UartInterruptHandler<UART0>;
});

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("specMech firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Console to the observatory host, 115200 8N1
    let uart = Uart::new(
        p.UART0,
        p.PIN_0,
        p.PIN_1,
        Irqs,
        p.DMA_CH0,
        p.DMA_CH1,
        UartConfig::default(),
    );
    let (console_tx, mut console_rx) = uart.split();

    // Auxiliary link to the motion controller
    let motion_uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, UartConfig::default());
    let (motion_tx, _motion_rx) = motion_uart.split();

    // Spectrograph unit number from the three ID strap pins, active low
    let spec_id = read_spec_id(
        Input::new(p.PIN_10, Pull::Up),
        Input::new(p.PIN_11, Pull::Up),
        Input::new(p.PIN_12, Pull::Up),
    );
    info!("spectrograph unit {}", spec_id);

    // Two-wire sensor/valve bus, bit-banged over two GPIOs
    let bus = SoftTwi::new(Flex::new(p.PIN_16), Flex::new(p.PIN_17));

    let mut instrument = Board::new(bus, motion_tx);
    instrument.init();
    let boot_time = instrument.boot_time();
    info!("booted at {}", boot_time.as_str());

    let mut engine = Engine::new(EngineConfig {
        spec_id,
        version: VERSION,
        boot_time,
    });
    let mut tx = ConsoleTx(console_tx);
    let mut watchdog = Watchdog::new(p.WATCHDOG);

    // Until the host acknowledges the restart with `!`, every command
    // is refused; show the gate immediately
    let _ = tx.write_all(PROMPT_AWAIT);
    let _ = tx.flush();
    info!("command loop running");

    let mut line = heapless::Vec::<u8, LINE_SIZE>::new();
    let mut byte = [0u8; 1];
    loop {
        match with_timeout(TICK_PERIOD, console_rx.read(&mut byte)).await {
            Ok(Ok(())) => match byte[0] {
                b'\r' | b'\n' => {
                    let disposition = engine.process_line(&line, &mut instrument, &mut tx);
                    line.clear();
                    if disposition == Disposition::Reboot {
                        reboot(&mut watchdog).await;
                    }
                }
                b => {
                    // Overlong lines lose their tail; the parser sees a
                    // truncated command
                    let _ = line.push(b);
                }
            },
            Ok(Err(e)) => {
                warn!("console read error: {}", e);
                line.clear();
            }
            Err(_) => instrument.status_tick(),
        }
    }
}

/// Unit number from the strap pins: a grounded pin contributes its bit
fn read_spec_id(bit0: Input<'_>, bit1: Input<'_>, bit2: Input<'_>) -> u8 {
    u8::from(bit0.is_low()) | (u8::from(bit1.is_low()) << 1) | (u8::from(bit2.is_low()) << 2)
}

/// Let the console drain the final prompt, then pull the plug
async fn reboot(watchdog: &mut Watchdog) -> ! {
    info!("rebooting");
    Timer::after_millis(100).await;
    watchdog.trigger_reset();
    loop {
        cortex_m::asm::wfe();
    }
}
