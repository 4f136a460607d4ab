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

use crate::config::STORE_SIZE;
use crate::store::{EepromImage, NvStore, StoreError};
use core::ops::Range;
use embedded_storage_async::nor_flash::NorFlash;
use log::{debug, trace, warn};
use sequential_storage::cache::NoCache;
use sequential_storage::map::{self, SerializationError, Value};

const EEPROM_IMAGE_KEY: u16 = 0;

// must hold the serialised key and image
const DATA_BUFFER_SIZE: usize = 128;

/// Byte addressed store emulated on NOR flash.
///
/// The whole image lives in RAM and is written to flash as a single map item every time a
/// field changes. Flash with no image yet reads as erased.
pub struct FlashEeprom<F>
where
    F: NorFlash,
{
    flash: F,
    range: Range<u32>,
    flash_cache: NoCache,
    image: EepromImage<STORE_SIZE>,
}

impl<F> FlashEeprom<F>
where
    F: NorFlash,
{
    /// Load the image from `range` of `flash`. Unreadable contents are erased and the
    /// store starts out blank.
    pub async fn initialise(mut flash: F, range: Range<u32>) -> Result<Self, StoreError> {
        debug!(
            "Settings store initialising. Flash address range: 0x{:x} to 0x{:x}, flash size: {}",
            range.start,
            range.end,
            flash.capacity(),
        );

        let mut flash_cache = NoCache::new();
        let mut data_buffer = [0u8; DATA_BUFFER_SIZE];

        let fetched: Result<Option<StoredImage>, _> = map::fetch_item(
            &mut flash,
            range.clone(),
            &mut flash_cache,
            &mut data_buffer,
            &EEPROM_IMAGE_KEY,
        )
        .await;

        let image = match fetched {
            Ok(Some(StoredImage(image))) => image,
            Ok(None) => {
                debug!("No stored settings image, starting erased");
                EepromImage::erased()
            }
            Err(e) => {
                warn!("Unable to read settings image: {:?}. Erasing", e);
                sequential_storage::erase_all(&mut flash, range.clone())
                    .await
                    .map_err(|_| {
                        warn!("Unable to erase storage.");
                        StoreError::EraseError
                    })?;
                flash_cache = NoCache::new();
                EepromImage::erased()
            }
        };

        Ok(Self {
            flash,
            range,
            flash_cache,
            image,
        })
    }

    /// Hand the flash back, dropping the RAM image.
    pub fn release(self) -> F {
        self.flash
    }

    async fn commit(&mut self, image: &StoredImage) -> Result<(), StoreError> {
        let mut data_buffer = [0u8; DATA_BUFFER_SIZE];
        map::store_item(
            &mut self.flash,
            self.range.clone(),
            &mut self.flash_cache,
            &mut data_buffer,
            &EEPROM_IMAGE_KEY,
            image,
        )
        .await
        .map_err(|e| {
            warn!("Unable to save settings image: {:?}", e);
            StoreError::SaveError
        })
    }
}

impl<F> NvStore for FlashEeprom<F>
where
    F: NorFlash,
{
    fn capacity(&self) -> usize {
        STORE_SIZE
    }

    async fn read_field(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StoreError> {
        self.image.read(offset, buffer)
    }

    async fn write_field(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError> {
        let mut updated = StoredImage(self.image.clone());
        updated.0.write(offset, bytes)?;
        if updated.0 == self.image {
            trace!("Field at {} unchanged, skipping flash write", offset);
            return Ok(());
        }

        self.commit(&updated).await?;
        self.image = updated.0;
        Ok(())
    }
}

struct StoredImage(EepromImage<STORE_SIZE>);

impl Value<'_> for StoredImage {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let bytes = self.0.as_bytes();
        if buffer.len() < bytes.len() {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }

    fn deserialize_from(buffer: &[u8]) -> Result<Self, SerializationError>
    where
        Self: Sized,
    {
        let bytes: [u8; STORE_SIZE] = buffer
            .try_into()
            .map_err(|_| SerializationError::InvalidFormat)?;
        Ok(StoredImage(EepromImage::from_bytes(bytes)))
    }
}
