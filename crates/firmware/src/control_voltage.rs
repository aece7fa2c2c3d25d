//! Controls the device's CV outputs, one DAC channel per track.

use embassy_stm32::{
    dac::{DacCh1, DacCh2, Value},
    mode::Async,
    peripherals::DAC1,
};
use mr_reader_lib::{io::CvSink, sequencer::TrackId};

/// A [`CvSink`] writing to both channels of the 12-bit DAC. Track 1 comes out of PA4, track 2 out of PA5.
pub struct DacSink {
    first: DacCh1<'static, DAC1, Async>,
    second: DacCh2<'static, DAC1, Async>,
}

impl DacSink {
    pub fn new(first: DacCh1<'static, DAC1, Async>, second: DacCh2<'static, DAC1, Async>) -> Self {
        Self { first, second }
    }
}

impl CvSink for DacSink {
    fn set(&mut self, track: TrackId, value: u16) {
        let value = Value::Bit12Right(value);
        match track {
            TrackId::First => self.first.set(value),
            TrackId::Second => self.second.set(value),
        }
    }
}
