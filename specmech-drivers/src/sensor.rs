//! Analog sensor conversion formulas
//!
//! Pure functions from ADC volts to engineering units for the three
//! sensor families on the ADC chain. They are separated from the ADC
//! driver so the math can be tested without a bus.

use libm::powf;

/// AD590 temperature transducer, Celsius
///
/// The current output runs through a 10k sense resistor, giving
/// 1 mV per kelvin times the 100x front-end scaling.
pub fn ad590_celsius(volts: f32) -> f32 {
    volts * 100.0 - 273.15
}

/// HIH-4031 relative humidity, percent
///
/// Datasheet transfer function `Vout = Vsupply * (0.0062 * RH + 0.16)`,
/// inverted and clamped to the physical range.
pub fn hih4031_humidity(volts: f32, supply_volts: f32) -> f32 {
    let rh = ((volts / supply_volts) - 0.16) / 0.0062;
    rh.clamp(0.0, 100.0)
}

/// Ion pump controller telemetry, torr
///
/// The controller emits log pressure: one volt per decade, 10 V at
/// 1 torr.
pub fn ionpump_torr(volts: f32) -> f32 {
    powf(10.0, volts - 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ad590_room_temperature() {
        // 2.9815 V is 298.15 K
        assert!((ad590_celsius(2.9815) - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_ad590_ice_point() {
        assert!(ad590_celsius(2.7315).abs() < 1e-3);
    }

    #[test]
    fn test_hih4031_midscale() {
        // Vout = 5.0 * (0.0062 * 50 + 0.16) = 2.35 V at 50% RH
        assert!((hih4031_humidity(2.35, 5.0) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_hih4031_clamps_to_physical_range() {
        assert_eq!(hih4031_humidity(0.0, 5.0), 0.0);
        assert_eq!(hih4031_humidity(5.0, 5.0), 100.0);
    }

    #[test]
    fn test_ionpump_decades() {
        // 10 V is 1 torr, 3 V is 1e-7 torr
        assert!((ionpump_torr(10.0) - 1.0).abs() < 1e-6);
        let torr = ionpump_torr(3.0);
        assert!((torr / 1e-7 - 1.0).abs() < 1e-3);
    }
}
