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

#![no_std]
#![no_main]

mod acquisition;
mod config;
mod remote;
mod sensor;
mod storage;

use crate::config::LOAD_CELL_I2C_FREQUENCY;
use crate::remote::usb_link::{remote_link_task, start_usb};
use crate::sensor::initialise_sensor;
use crate::storage::initialise_storage;
use assign_resources::assign_resources;
use defmt::{info, unwrap};
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, Config};
use embassy_rp::peripherals::I2C0;
use embassy_rp::{Peri, bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use loadcell_core::{PendingCommands, ScaleNode, StartupError};
use {defmt_rtt as _, panic_probe as _};

static PENDING_COMMANDS: PendingCommands<CriticalSectionRawMutex> = PendingCommands::new();

assign_resources! {
    load_cell_i2c: LoadCellI2cPins {
        sda_pin: PIN_4,
        scl_pin: PIN_5,
        i2c_peripheral: I2C0,
    },
    usb_link: UsbLinkResources {
        usb: USB,
    },
    nvm: NvmResources {
        flash: FLASH,
    },
}

bind_interrupts!(struct I2cIrqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

pub(crate) mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    let resources = split_resources!(p);

    let dirty_indicator = if built_info::GIT_DIRTY.unwrap_or(true) {
        "+"
    } else {
        ""
    };
    info!(
        "{} {} ({}{}) starting",
        built_info::PKG_NAME,
        built_info::PKG_VERSION,
        built_info::GIT_COMMIT_HASH_SHORT.unwrap_or("unknown"),
        dirty_indicator
    );

    let serial = start_usb(resources.usb_link.usb, spawner);
    spawner.spawn(unwrap!(remote_link_task(serial, &PENDING_COMMANDS)));
    spawner.spawn(unwrap!(acquisition_task(resources.load_cell_i2c, resources.nvm)));
}

#[embassy_executor::task]
async fn acquisition_task(i2c_pins: LoadCellI2cPins, nvm: NvmResources) {
    let store = match initialise_storage(nvm.flash).await {
        Ok(store) => store,
        Err(e) => acquisition::park(StartupError::Store(e)).await,
    };

    let mut i2c_config = Config::default();
    i2c_config.frequency = LOAD_CELL_I2C_FREQUENCY;
    let i2c = i2c::I2c::new_async(
        i2c_pins.i2c_peripheral,
        i2c_pins.scl_pin,
        i2c_pins.sda_pin,
        I2cIrqs,
        i2c_config,
    );

    let sensor = match initialise_sensor(i2c).await {
        Ok(sensor) => sensor,
        Err(e) => acquisition::park(StartupError::SensorUnavailable(e)).await,
    };

    let node = match ScaleNode::start(sensor, store).await {
        Ok(node) => node,
        Err(e) => acquisition::park(e).await,
    };

    acquisition::run(node, &PENDING_COMMANDS).await
}
