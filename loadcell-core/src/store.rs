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

use core::ops::Range;

/// Value every byte of the store holds before it is written for the first time.
pub const ERASED_BYTE: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    OutOfRange { offset: usize, len: usize },
    SaveError,
    EraseError,
}

/// Byte addressed non-volatile storage.
pub trait NvStore {
    /// Number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Fill `buffer` with the bytes starting at `offset`. Bytes that were never written read
    /// back as [`ERASED_BYTE`].
    async fn read_field(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StoreError>;

    /// Write `bytes` starting at `offset`. The data is committed before this returns.
    async fn write_field(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError>;
}

pub(crate) fn checked_range(
    capacity: usize,
    offset: usize,
    len: usize,
) -> Result<Range<usize>, StoreError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(offset..end),
        _ => Err(StoreError::OutOfRange { offset, len }),
    }
}

/// In-memory image of an EEPROM region.
///
/// Used directly as a volatile store and as the RAM copy behind flash backed stores, which
/// commit the whole image on every write.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EepromImage<const SIZE: usize> {
    bytes: [u8; SIZE],
}

impl<const SIZE: usize> EepromImage<SIZE> {
    pub const fn erased() -> Self {
        Self {
            bytes: [ERASED_BYTE; SIZE],
        }
    }

    pub const fn from_bytes(bytes: [u8; SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; SIZE] {
        &self.bytes
    }

    pub fn read(&self, offset: usize, buffer: &mut [u8]) -> Result<(), StoreError> {
        let range = checked_range(SIZE, offset, buffer.len())?;
        buffer.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    pub fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError> {
        let range = checked_range(SIZE, offset, bytes.len())?;
        self.bytes[range].copy_from_slice(bytes);
        Ok(())
    }
}

impl<const SIZE: usize> Default for EepromImage<SIZE> {
    fn default() -> Self {
        Self::erased()
    }
}

impl<const SIZE: usize> NvStore for EepromImage<SIZE> {
    fn capacity(&self) -> usize {
        SIZE
    }

    async fn read_field(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StoreError> {
        self.read(offset, buffer)
    }

    async fn write_field(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError> {
        self.write(offset, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    #[test]
    fn fresh_image_reads_erased() {
        let mut image = EepromImage::<16>::erased();
        let mut buffer = [0u8; 4];
        block_on(image.read_field(3, &mut buffer)).unwrap();
        assert_eq!(buffer, [ERASED_BYTE; 4]);
    }

    #[test]
    fn write_only_touches_its_own_bytes() {
        let mut image = EepromImage::<16>::erased();
        block_on(image.write_field(4, &[1, 2, 3, 4])).unwrap();

        assert_eq!(image.as_bytes()[3], ERASED_BYTE);
        assert_eq!(&image.as_bytes()[4..8], &[1, 2, 3, 4]);
        assert_eq!(image.as_bytes()[8], ERASED_BYTE);
    }

    #[test]
    fn access_past_the_end_is_rejected() {
        let mut image = EepromImage::<16>::erased();
        let before = image.clone();

        let result = block_on(image.write_field(14, &[0, 0, 0, 0]));
        assert_eq!(result, Err(StoreError::OutOfRange { offset: 14, len: 4 }));
        assert_eq!(image, before);

        let mut buffer = [0u8; 2];
        assert!(block_on(image.read_field(15, &mut buffer)).is_err());
        assert!(block_on(image.read_field(usize::MAX, &mut buffer)).is_err());
    }

    #[test]
    fn access_ending_on_the_last_byte_is_allowed() {
        let mut image = EepromImage::<16>::erased();
        assert!(block_on(image.write_field(12, &[9, 9, 9, 9])).is_ok());
    }
}
