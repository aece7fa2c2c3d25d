//! Tasks and types carrying outgoing MIDI to the wired DIN port and to the USB host.
//!
//! The sequencer never waits on a transport. It drops each message into one bounded queue per link, and a task per
//! link drains its queue at whatever pace the link allows.

use defmt::{error, info, warn};
use embassy_futures::select::{Either, select};
use embassy_stm32::{gpio::Output, mode::Async, peripherals, usart::UartTx, usb};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_usb::{UsbDevice, class::midi::MidiClass, driver::EndpointError};
use mr_reader_lib::io::{MidiSink, usb_midi_packet};
use wmidi::MidiMessage;

pub type UsbDriver = usb::Driver<'static, peripherals::USB_OTG_FS>;

const MIDI_QUEUE_DEPTH: usize = 32;
pub type MidiQueue = Channel<CriticalSectionRawMutex, MidiMessage<'static>, MIDI_QUEUE_DEPTH>;

/// Messages waiting to go out of the DIN port.
pub static SERIAL_MIDI_QUEUE: MidiQueue = Channel::new();

/// Messages waiting to go out over USB.
pub static USB_MIDI_QUEUE: MidiQueue = Channel::new();

/// A [`MidiSink`] which queues messages for a transport task.
pub struct QueueSink(pub &'static MidiQueue);

impl MidiSink for QueueSink {
    fn send(&mut self, message: MidiMessage<'static>) {
        if self.0.try_send(message).is_err() {
            warn!("MIDI queue is full; dropping message");
        }
    }
}

/// Every MIDI link the device drives; each message reaches both.
pub fn links() -> (QueueSink, QueueSink) {
    (QueueSink(&SERIAL_MIDI_QUEUE), QueueSink(&USB_MIDI_QUEUE))
}

/// Task responsible for the 5-pin DIN MIDI output.
#[embassy_executor::task]
pub async fn serial_midi(mut tx: UartTx<'static, Async>) -> ! {
    let mut buf = [0_u8; 3];
    loop {
        let message = SERIAL_MIDI_QUEUE.receive().await;
        match message.copy_to_slice(&mut buf) {
            Ok(len) => {
                if let Err(e) = tx.write(&buf[..len]).await {
                    error!("Failed to write MIDI to serial port: {}", e);
                }
            }
            Err(_) => warn!("MIDI message does not fit the serial buffer; dropping it"),
        }
    }
}

#[embassy_executor::task]
pub async fn usb_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

/// Task responsible for the USB-MIDI output. The LED lights while a host is connected.
///
/// Messages queued while no host is listening are discarded so that stale notes don't burst out on connection.
#[embassy_executor::task]
pub async fn usb_midi(mut class: MidiClass<'static, UsbDriver>, mut led: Output<'static>) -> ! {
    loop {
        match select(class.wait_connection(), USB_MIDI_QUEUE.receive()).await {
            Either::First(_) => {
                info!("USB connected");
                led.set_high();
                let _ = forward(&mut class).await;
                led.set_low();
                info!("USB disconnected");
            }
            Either::Second(_) => {}
        }
    }
}

#[doc(hidden)]
struct Disconnected {}

impl From<EndpointError> for Disconnected {
    fn from(val: EndpointError) -> Self {
        match val {
            EndpointError::BufferOverflow => defmt::panic!("Buffer overflow"),
            EndpointError::Disabled => Disconnected {},
        }
    }
}

/// Helper function which drains the USB queue into the endpoint until the host goes away.
async fn forward(class: &mut MidiClass<'static, UsbDriver>) -> Result<(), Disconnected> {
    loop {
        let message = USB_MIDI_QUEUE.receive().await;
        match usb_midi_packet(&message) {
            Some(packet) => class.write_packet(&packet).await?,
            None => warn!("MIDI message does not fit a USB-MIDI Event Packet; dropping it"),
        }
    }
}
