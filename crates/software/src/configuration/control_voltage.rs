use crate::Error;
use measurements::Voltage;
use num_traits::float::FloatCore;
use wmidi::Note;

/// Settings for expressing [`Note`]s as control voltage via a <abbr name="digital-to-analog converter">DAC</abbr>.
///
/// Pitch follows the 1 volt per octave convention relative to a reference pair: the reference note sounds at the
/// reference voltage, and every half step away from it adds or removes one twelfth of the voltage per octave.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlVoltage {
    reference_note: Note,
    reference_voltage: Voltage,
    voltage_per_octave: Voltage,
    vdd: Voltage,
    resolution: u8,
}

impl ControlVoltage {
    /// Constructs a [`ControlVoltage`]. The DAC resolution must be between 1 and 16 bits.
    pub fn new(
        reference_note: Note,
        reference_voltage: Voltage,
        voltage_per_octave: Voltage,
        vdd: Voltage,
        resolution: u8,
    ) -> Result<Self, Error> {
        if !(1..=16).contains(&resolution) {
            return Err(Error::InvalidResolution(resolution));
        }
        Ok(Self {
            reference_note,
            reference_voltage,
            voltage_per_octave,
            vdd,
            resolution,
        })
    }

    /// Getter.
    pub fn vdd(&self) -> Voltage {
        self.vdd
    }

    /// Getter.
    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    fn voltage_per_half_step(&self) -> Voltage {
        self.voltage_per_octave / 12.0
    }

    /// Returns the [`Voltage`] at which a given [`Note`] sounds. May be negative for notes below the reference.
    pub fn note_to_volts(&self, note: Note) -> Voltage {
        let half_steps = f64::from(u8::from(note)) - f64::from(u8::from(self.reference_note));
        Voltage::from_volts(
            self.reference_voltage.as_volts() + half_steps * self.voltage_per_half_step().as_volts(),
        )
    }

    /// Returns the DAC value which produces the given [`Voltage`]; see [`volts_to_code`].
    pub fn volts_to_code(&self, voltage: Voltage) -> u16 {
        volts_to_code(voltage, self.vdd, self.resolution)
    }

    /// Returns the DAC value at which a given [`Note`] sounds.
    pub fn note_to_code(&self, note: Note) -> u16 {
        self.volts_to_code(self.note_to_volts(note))
    }
}

impl Default for ControlVoltage {
    /// Middle C at 0 V, 1 V/octave, into a 12-bit DAC running from 3.3 V.
    fn default() -> Self {
        Self {
            reference_note: Note::C4,
            reference_voltage: Voltage::from_volts(0.0),
            voltage_per_octave: Voltage::from_volts(1.0),
            vdd: Voltage::from_volts(3.3),
            resolution: 12,
        }
    }
}

/// Converts a [`Voltage`] to the value a DAC of the given resolution needs to produce it, where the DAC's full scale
/// spans 0 V to `vdd`.
///
/// Voltages outside of the DAC's range are clamped rather than rejected. Resolutions above 16 bits saturate at
/// `u16::MAX`.
pub fn volts_to_code(voltage: Voltage, vdd: Voltage, resolution: u8) -> u16 {
    let vdd = vdd.as_volts();
    // also catches NaN
    if !(vdd > 0.0) {
        return 0;
    }
    let full_scale = ((1_u32 << resolution.min(16)) - 1) as f64;
    let volts = voltage.as_volts().clamp(0.0, vdd);
    FloatCore::round(volts / vdd * full_scale) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(expected: f64, actual: Voltage) -> bool {
        FloatCore::abs(expected - actual.as_volts()) < 1e-9
    }

    mod note_to_volts {
        use super::*;

        #[test]
        fn reference_note() {
            let cv = ControlVoltage::default();
            assert!(approx_eq(0.0, cv.note_to_volts(Note::C4)));
        }

        #[test]
        fn octave_up() {
            let cv = ControlVoltage::default();
            assert!(approx_eq(1.0, cv.note_to_volts(Note::C5)));
        }

        #[test]
        fn half_step() {
            let cv = ControlVoltage::default();
            assert!(approx_eq(1.0 / 12.0, cv.note_to_volts(Note::Db4)));
        }

        #[test]
        fn below_reference_is_negative() {
            let cv = ControlVoltage::default();
            assert!(approx_eq(-1.0, cv.note_to_volts(Note::C3)));
        }

        #[test]
        fn offset_reference() {
            let cv = ControlVoltage::new(
                Note::A4,
                Voltage::from_volts(2.0),
                Voltage::from_volts(1.0),
                Voltage::from_volts(5.0),
                12,
            )
            .unwrap();
            assert!(approx_eq(3.0, cv.note_to_volts(Note::A5)));
        }
    }

    mod volts_to_code {
        use super::*;

        #[test]
        fn zero_volts() {
            let cv = ControlVoltage::default();
            assert_eq!(0, cv.volts_to_code(cv.note_to_volts(Note::C4)));
        }

        #[test]
        fn full_scale() {
            assert_eq!(
                4095,
                volts_to_code(Voltage::from_volts(3.3), Voltage::from_volts(3.3), 12),
                "Expected left but got right"
            );
        }

        #[test]
        fn one_volt_rounds() {
            // 1.0 / 3.3 * 4095 = 1240.909...
            assert_eq!(
                1241,
                ControlVoltage::default().note_to_code(Note::C5),
                "Expected left but got right"
            );
        }

        #[test]
        fn clamps_below_zero() {
            assert_eq!(
                0,
                volts_to_code(Voltage::from_volts(-2.0), Voltage::from_volts(3.3), 12),
                "Expected left but got right"
            );
        }

        #[test]
        fn clamps_above_vdd() {
            assert_eq!(
                255,
                volts_to_code(Voltage::from_volts(9.0), Voltage::from_volts(3.3), 8),
                "Expected left but got right"
            );
        }
    }

    #[test]
    fn new_rejects_resolution() {
        let result = ControlVoltage::new(
            Note::C4,
            Voltage::from_volts(0.0),
            Voltage::from_volts(1.0),
            Voltage::from_volts(3.3),
            17,
        );
        assert_eq!(
            Err(Error::InvalidResolution(17)),
            result,
            "Expected left but got right"
        );
    }
}
