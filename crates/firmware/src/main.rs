//! MR. READER is [Embassy](https://embassy.dev)-based firmware for a step sequencer which plays barcodes. The
//! firmware runs on the [Nucleo-F767ZI development board](https://www.st.com/en/evaluation-tools/nucleo-f767zi.html),
//! which is powered by an F7-series STM32 microcontroller.
//!
//! Each of its two tracks is loaded from a barcode-style numeric code: the code's check digit sets how many steps the
//! pattern has, and its leading digits, quantized to a major scale, set the pitches. The pattern is played out of a
//! 5-pin DIN MIDI port and a USB-MIDI port at the same time, and as 1 V/octave control voltage from the DAC. Steps
//! either advance on a fixed clock or follow an external gate, depending on the configuration below.
//!
//! Controls:
//! - the blue user button (PC13) moves the first track on to the next preset code;
//! - a pushbutton on PD1 cycles between playing both tracks, the first only, or the second only (green and blue LEDs
//!   show which are enabled);
//! - gate inputs on PF13 (first track, or both when shared) and PF14 (second track);
//! - the red LED lights while a USB host is connected.

#![no_std]
#![no_main]

mod code_selection;
mod control_voltage;
mod display;
mod midi;
mod sequencer;
mod track_selection;

use crate::{
    code_selection::PRESET_CODES, control_voltage::DacSink, display::SNAPSHOT_SYNC,
    sequencer::Gates, track_selection::TRACK_SELECTION_SYNC,
};
use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::{
    Config, bind_interrupts,
    dac::Dac,
    exti::ExtiInput,
    gpio::{Input, Level, Output, Pull, Speed},
    peripherals,
    time::Hertz,
    usart::{self, UartTx},
    usb,
};
use embassy_usb::{Builder, class::midi::MidiClass};
use mr_reader_lib::{
    code::Code,
    configuration,
    sequencer::{Sequencer, TrackId},
};
use static_cell::StaticCell;

#[cfg(feature = "defmt-rtt")]
use defmt_rtt as _;
#[cfg(not(feature = "panic-probe"))]
use panic_halt as _;
#[cfg(feature = "panic-probe")]
use panic_probe as _;

bind_interrupts!(
    #[doc(hidden)]
    struct Irqs {
        OTG_FS => usb::InterruptHandler<peripherals::USB_OTG_FS>;
    }
);

/// Standard MIDI baud rate.
const MIDI_BAUD_RATE: u32 = 31_250;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Initializing MR. READER");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        // hse: high-speed external clock
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Bypass,
        });

        // pll: phase-locked loop, crucial for dividing clock
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL216,
            divp: Some(PllPDiv::DIV2), // 8mhz / 4 * 216 / 2 = 216Mhz
            // per section 5.2 of RM0410: most peripheral clocks are derived from their bus clock, but the 48MHz clock used for USB OTG FS
            // is derived from main PLL VCO (PLLQ clock) or PLLSAI VCO (PLLSAI clock)
            divq: Some(PllQDiv::DIV9), // 8mhz / 4 * 216 / 9 = 48Mhz
            divr: None,
        });
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.mux.clk48sel = mux::Clk48sel::PLL1_Q;
    }
    let p = embassy_stm32::init(config);

    // everything the sequencer needs to know is settled here, once
    let sequencer_config = configuration::Config {
        trigger_mode: configuration::TriggerMode::FreeRunning,
        gate_routing: configuration::GateRouting::Shared,
        ..Default::default()
    };
    let display_period = sequencer_config.display_period;

    // set up the DAC to output control voltage, one channel per track
    // per RM0410 (the reference manual for the chip), DAC channel 1 outputs on port A, pin 4 and channel 2 on pin 5
    let (dac_ch1, dac_ch2) = Dac::new(p.DAC1, p.DMA1_CH5, p.DMA1_CH6, p.PA4, p.PA5).split();
    let mut cv = DacSink::new(dac_ch1, dac_ch2);

    // DIN MIDI goes out of USART6; PC6 is TX
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = MIDI_BAUD_RATE;
    let serial_tx = unwrap!(UartTx::new(p.USART6, p.PC6, p.DMA2_CH6, uart_config));
    unwrap!(spawner.spawn(midi::serial_midi(serial_tx)));

    // Create the driver, from the HAL.
    static ENDPOINT_OUT_BUFFER: StaticCell<[u8; 256]> = StaticCell::new();
    let mut config = embassy_stm32::usb::Config::default();

    // USB devices which are self-powered (i.e., that can stay powered on if unplugged from the host)
    // need to enable vbus_detection to comply with the USB spec. Per section 6.10 of the Nucleo board
    // manual (UM1974), CN13 (the USB port) cannot power the board; external power is necessary.
    config.vbus_detection = true;

    let driver = usb::Driver::new_fs(
        p.USB_OTG_FS,
        Irqs,
        p.PA12,
        p.PA11,
        ENDPOINT_OUT_BUFFER.init([0; 256]),
        config,
    );

    // per https://pid.codes, FOSS projects can apply to be listed under the vendor ID owned by InterBiometrics
    let vendor_id = 0x1209;
    let product_id = 0x3ead;

    let mut config = embassy_usb::Config::new(vendor_id, product_id);
    config.manufacturer = Some("Pawpaw Works");
    config.product = Some("MR. READER");
    config.self_powered = true;
    config.max_power = 0;

    static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
    static CONTROL_BUFFER: StaticCell<[u8; 64]> = StaticCell::new();

    let mut builder = Builder::new(
        driver,
        config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUFFER.init([0; 64]),
    );

    // the device only talks; no input jacks, one output jack
    let class = MidiClass::new(&mut builder, 0, 1, 64);
    let usb = builder.build();

    unwrap!(spawner.spawn(midi::usb_task(usb)));
    let red_led = Output::new(p.PB14, Level::Low, Speed::Low);
    unwrap!(spawner.spawn(midi::usb_midi(class, red_led)));

    let mut sequencer = Sequencer::new(sequencer_config);
    let mut links = midi::links();
    for (track, preset) in TrackId::ALL.into_iter().zip(PRESET_CODES) {
        match Code::parse(preset) {
            Ok(code) => {
                if let Err(e) = sequencer.load(track, code, &mut links, &mut cv) {
                    warn!("{} starts empty: {}", track, e);
                }
            }
            Err(e) => warn!("{} starts empty: {}", track, e),
        }
    }

    let code_button = ExtiInput::new(p.PC13, p.EXTI13, Pull::None);
    unwrap!(spawner.spawn(code_selection::select_code(code_button)));

    let track_button = ExtiInput::new(p.PD1, p.EXTI1, Pull::Up);
    let green_led = Output::new(p.PB0, Level::Low, Speed::Low);
    let blue_led = Output::new(p.PB7, Level::Low, Speed::Low);
    unwrap!(spawner.spawn(track_selection::select_tracks(
        track_button,
        [green_led, blue_led],
        TRACK_SELECTION_SYNC.sender()
    )));

    let snapshot_receiver = SNAPSHOT_SYNC
        .receiver()
        .expect("Snapshot synchronizer should have a receiver available");
    unwrap!(spawner.spawn(display::display(snapshot_receiver, display_period)));

    let gates = Gates::new(
        Input::new(p.PF13, Pull::Down),
        Input::new(p.PF14, Pull::Down),
    );
    let track_selection = TRACK_SELECTION_SYNC
        .receiver()
        .expect("Track selection synchronizer should have a receiver available");
    unwrap!(spawner.spawn(sequencer::sequencer(
        sequencer,
        cv,
        gates,
        track_selection,
        SNAPSHOT_SYNC.sender()
    )));
}
