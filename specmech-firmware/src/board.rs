//! Board wiring behind the command engine's hardware seam
//!
//! [`Board`] owns the shared two-wire bus and every driver on it, and
//! implements [`Instrument`] by delegating to them. The engine never
//! sees a chip, only this one object.

use defmt::{info, warn};
use embassy_rp::uart::{Async, Blocking, UartTx};

use specmech_core::{
    DeviceError, EnvReport, Instrument, IsoTime, Mechanism, Operation, Peripheral, VacReport,
    ValveAction, ValveError,
};
use specmech_drivers::ads1115::{Ads1115, Pga};
use specmech_drivers::ds3231::Ds3231;
use specmech_drivers::mcp9808::Mcp9808;
use specmech_drivers::pneu::ValveBank;
use specmech_drivers::sensor;
use specmech_hal::{BusError, SerialTx, TwiBus};

use crate::twi::SoftTwi;

/// ADC carrying the three AD590 temperature channels
const TEMP_ADC_ADDR: u8 = 0x48;
/// ADC carrying the three HiH-4031 humidity channels
const HUMIDITY_ADC_ADDR: u8 = 0x49;
/// ADC carrying the two ion pump telemetry channels
const VACUUM_ADC_ADDR: u8 = 0x4A;

/// Humidity sensor supply rail
const HUMIDITY_SUPPLY_VOLTS: f32 = 5.0;

/// Input divider on the ion pump telemetry lines (10 V full scale
/// halved onto the ADC range)
const ION_DIVIDER: f32 = 2.0;

pub struct Board {
    bus: SoftTwi<'static>,
    valves: ValveBank,
    clock: Ds3231,
    temp_adc: Ads1115,
    humidity_adc: Ads1115,
    vacuum_adc: Ads1115,
    board_temp: Mcp9808,
    motion_tx: UartTx<'static, Blocking>,
    tick_armed: bool,
}

impl Board {
    pub fn new(bus: SoftTwi<'static>, motion_tx: UartTx<'static, Blocking>) -> Self {
        Self {
            bus,
            valves: ValveBank::default(),
            clock: Ds3231::default(),
            temp_adc: Ads1115::new(TEMP_ADC_ADDR),
            humidity_adc: Ads1115::new(HUMIDITY_ADC_ADDR),
            vacuum_adc: Ads1115::new(VACUUM_ADC_ADDR),
            board_temp: Mcp9808::default(),
            motion_tx,
            tick_armed: false,
        }
    }

    /// Bring the expanders to a safe state: all valves off, sensor pins
    /// as inputs
    pub fn init(&mut self) {
        if let Err(e) = self.valves.init(&mut self.bus) {
            warn!("valve bank init failed: {}", e);
        }
    }

    /// Capture the clock once at power-up for the boot-time report
    pub fn boot_time(&mut self) -> IsoTime {
        match self.clock.read_time(&mut self.bus) {
            Ok(time) => time,
            Err(e) => {
                warn!("boot time unavailable: {}", e);
                let mut t = IsoTime::new();
                let _ = t.push_str("unknown");
                t
            }
        }
    }

    /// Periodic status line, once the host has acknowledged the reboot
    pub fn status_tick(&mut self) {
        if !self.tick_armed {
            return;
        }
        match self.valves.read_cylinders(&mut self.bus) {
            Ok(status) => info!(
                "cylinders: shutter={} left={} right={} air_ok={}",
                status.shutter.letter(),
                status.left.letter(),
                status.right.letter(),
                status.air_ok
            ),
            Err(e) => warn!("cylinder sensors unreadable: {}", e),
        }
    }

    fn read_temperature(&mut self, channel: u8) -> Option<f32> {
        self.temp_adc
            .read_single_ended(&mut self.bus, channel, Pga::Fsr4V096)
            .ok()
            .map(sensor::ad590_celsius)
    }

    fn read_humidity(&mut self, channel: u8) -> Option<f32> {
        self.humidity_adc
            .read_single_ended(&mut self.bus, channel, Pga::Fsr6V144)
            .ok()
            .map(|v| sensor::hih4031_humidity(v, HUMIDITY_SUPPLY_VOLTS))
    }

    fn read_ion_pump(&mut self, channel: u8) -> Option<f32> {
        self.vacuum_adc
            .read_single_ended(&mut self.bus, channel, Pga::Fsr6V144)
            .ok()
            .map(|v| sensor::ionpump_torr(v * ION_DIVIDER))
    }
}

impl Instrument for Board {
    fn actuate_valves(
        &mut self,
        target: Mechanism,
        action: ValveAction,
    ) -> Result<(), ValveError> {
        self.valves.actuate(&mut self.bus, target, action)
    }

    fn read_clock(&mut self) -> Result<IsoTime, DeviceError> {
        self.clock
            .read_time(&mut self.bus)
            .map_err(|e| DeviceError::new(Peripheral::Clock, Operation::Read, e))
    }

    fn set_clock(&mut self, iso: &str) -> Result<(), DeviceError> {
        self.clock
            .set_time(&mut self.bus, iso)
            .map_err(|e| DeviceError::new(Peripheral::Clock, Operation::Write, e))
    }

    fn read_environment(&mut self) -> EnvReport {
        let mut report = EnvReport::default();
        for ch in 0..3u8 {
            report.temperatures_c[ch as usize] = self.read_temperature(ch);
            report.humidity_pct[ch as usize] = self.read_humidity(ch);
        }
        report.temperatures_c[3] = self.board_temp.read_celsius(&mut self.bus).ok();
        report
    }

    fn read_vacuum(&mut self) -> VacReport {
        VacReport {
            red_torr: self.read_ion_pump(0),
            blue_torr: self.read_ion_pump(1),
        }
    }

    fn motion_command(&mut self, value: &str) -> Result<(), DeviceError> {
        let failed = |_| DeviceError::new(Peripheral::Motion, Operation::Write, BusError::NotReady);
        self.motion_tx.blocking_write(value.as_bytes()).map_err(failed)?;
        self.motion_tx.blocking_write(b"\r").map_err(failed)?;
        self.motion_tx.blocking_flush().map_err(failed)
    }

    fn self_test(&mut self) {
        // Exercise every bus device read-only and log the results; the
        // valves are left where they are
        match self.clock.read_time(&mut self.bus) {
            Ok(time) => info!("self-test clock: {}", time.as_str()),
            Err(e) => warn!("self-test clock failed: {}", e),
        }
        match self.board_temp.read_celsius(&mut self.bus) {
            Ok(c) => info!("self-test board temperature: {} C", c),
            Err(e) => warn!("self-test board temperature failed: {}", e),
        }
        match self.valves.read_cylinders(&mut self.bus) {
            Ok(status) => info!(
                "self-test cylinders: shutter={} left={} right={} air_ok={}",
                status.shutter.letter(),
                status.left.letter(),
                status.right.letter(),
                status.air_ok
            ),
            Err(e) => warn!("self-test cylinder sensors failed: {}", e),
        }
        for ch in 0..3u8 {
            match self.read_temperature(ch) {
                Some(c) => info!("self-test temperature {}: {} C", ch, c),
                None => warn!("self-test temperature {} unreadable", ch),
            }
        }
    }

    fn arm_status_tick(&mut self) {
        self.tick_armed = true;
    }
}

/// Console transmitter the engine writes responses through
pub struct ConsoleTx(pub UartTx<'static, Async>);

impl SerialTx for ConsoleTx {
    type Error = embassy_rp::uart::Error;

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.blocking_write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.blocking_flush()
    }
}
