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

use crate::config::{FLASH_SIZE, NVM_PARTITION, SETTINGS_RANGE};
use core::cell::RefCell;
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_embedded_hal::flash::partition::BlockingPartition;
use embassy_rp::Peri;
use embassy_rp::flash::{self, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use loadcell_core::{FlashEeprom, StoreError};
use static_cell::StaticCell;

pub type BlockingFlash = Flash<'static, FLASH, flash::Blocking, FLASH_SIZE>;

pub type BlockingAsyncPartition =
    BlockingAsync<BlockingPartition<'static, CriticalSectionRawMutex, BlockingFlash>>;

pub type SettingsStore = FlashEeprom<BlockingAsyncPartition>;

static FLASH_MUTEX: StaticCell<Mutex<CriticalSectionRawMutex, RefCell<BlockingFlash>>> =
    StaticCell::new();

/// Take the flash peripheral and open the settings store in its reserved partition.
pub async fn initialise_storage(flash: Peri<'static, FLASH>) -> Result<SettingsStore, StoreError> {
    let flash = Flash::<_, flash::Blocking, FLASH_SIZE>::new_blocking(flash);
    let flash_mutex = FLASH_MUTEX.init(Mutex::new(RefCell::new(flash)));

    let nvm_partition = BlockingPartition::new(
        flash_mutex,
        NVM_PARTITION.start,
        NVM_PARTITION.len() as u32,
    );

    FlashEeprom::initialise(BlockingAsync::new(nvm_partition), SETTINGS_RANGE).await
}
