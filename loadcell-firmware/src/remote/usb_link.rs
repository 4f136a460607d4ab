// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::built_info;
use crate::config::{USB_MANUFACTURER, USB_PID, USB_PRODUCT, USB_VID};
use crate::remote::cbor_send_receive::{
    FRAME_BUFFER_SIZE, ReceiveError, read_cbor_message, send_cbor_message,
};
use defmt::{debug, info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_rp::peripherals::USB;
use embassy_rp::usb::{Driver, InterruptHandler};
use embassy_rp::{Peri, bind_interrupts};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_usb::class::cdc_acm::{BufferedReceiver, CdcAcmClass, Sender, State};
use loadcell_core::{PendingCommands, remote};
use loadcell_messages::NodeMessages;
use loadcell_messages::builder::NodeMessagesBuilder;
use loadcell_messages::custom_data_types::VersionNumber;
use static_cell::StaticCell;

bind_interrupts!(struct UsbIrqs {
    USBCTRL_IRQ => InterruptHandler<USB>;
});

const MAX_PACKET_SIZE: u8 = 64;

pub type UsbSerial = CdcAcmClass<'static, Driver<'static, USB>>;

/// Bring up the USB device as a CDC-ACM serial port and start running it.
pub fn start_usb(usb_peripheral: Peri<'static, USB>, spawner: Spawner) -> UsbSerial {
    let driver = Driver::new(usb_peripheral, UsbIrqs);

    let config = {
        let mut config = embassy_usb::Config::new(USB_VID, USB_PID);
        config.manufacturer = Some(USB_MANUFACTURER);
        config.product = Some(USB_PRODUCT);
        config.serial_number = Some(built_info::PKG_VERSION);
        config.max_power = 100;
        config.max_packet_size_0 = MAX_PACKET_SIZE;
        config
    };

    let mut builder = {
        static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
        static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
        static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

        embassy_usb::Builder::new(
            driver,
            config,
            CONFIG_DESCRIPTOR.init([0; 256]),
            BOS_DESCRIPTOR.init([0; 256]),
            &mut [], // no msos descriptors
            CONTROL_BUF.init([0; 64]),
        )
    };

    static STATE: StaticCell<State> = StaticCell::new();
    let state = STATE.init(State::new());
    let class = CdcAcmClass::new(&mut builder, state, MAX_PACKET_SIZE as u16);

    let usb = builder.build();
    spawner.spawn(unwrap!(usb_task(usb)));

    class
}

#[embassy_executor::task]
async fn usb_task(mut usb: embassy_usb::UsbDevice<'static, Driver<'static, USB>>) {
    usb.run().await;
}

/// Answer remote function calls arriving over the serial port for as long as the node runs.
#[embassy_executor::task]
pub async fn remote_link_task(
    class: UsbSerial,
    commands: &'static PendingCommands<CriticalSectionRawMutex>,
) {
    let (mut sender, receiver) = class.split();

    static RX_BUF: StaticCell<[u8; FRAME_BUFFER_SIZE]> = StaticCell::new();
    let rx_buf = RX_BUF.init([0u8; FRAME_BUFFER_SIZE]);
    let mut buffered_rx = receiver.into_buffered(rx_buf);

    loop {
        sender.wait_connection().await;
        info!("Remote link connected");
        let _ = serve_remote_calls(&mut sender, &mut buffered_rx, commands).await;
        info!("Remote link disconnected");
    }
}

struct Disconnected {}

async fn serve_remote_calls(
    sender: &mut Sender<'static, Driver<'static, USB>>,
    receiver: &mut BufferedReceiver<'static, Driver<'static, USB>>,
    commands: &PendingCommands<CriticalSectionRawMutex>,
) -> Result<(), Disconnected> {
    let mut buffer = [0u8; FRAME_BUFFER_SIZE];

    loop {
        let reply = match read_cbor_message::<_, NodeMessages>(receiver, &mut buffer).await {
            Ok(NodeMessages::Hello(_)) => {
                debug!("Hello received");
                NodeMessagesBuilder::new()
                    .hello_resp()
                    .version(firmware_version())
                    .build()
            }
            Ok(NodeMessages::FunctionCall(call)) => {
                info!("Remote call {}({})", call.name, call.argument);
                let status = remote::invoke(commands, call.name, call.argument);
                NodeMessagesBuilder::new().function_result(status)
            }
            Ok(_) => {
                warn!("Ignoring message the node does not handle");
                continue;
            }
            Err(ReceiveError::ReadError) => return Err(Disconnected {}),
            Err(e) => {
                warn!("Failed to read message: {:?}", e);
                continue;
            }
        };

        send_cbor_message(sender, &reply).await.map_err(|e| {
            warn!("Failed to send reply: {:?}", e);
            Disconnected {}
        })?;
    }
}

fn firmware_version() -> VersionNumber {
    VersionNumber::new(
        built_info::PKG_VERSION_MAJOR.parse().unwrap_or(0),
        built_info::PKG_VERSION_MINOR.parse().unwrap_or(0),
        built_info::PKG_VERSION_PATCH.parse().unwrap_or(0),
    )
}
