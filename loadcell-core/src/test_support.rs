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

use crate::sensor::{LoadCellSensor, SensorError};
use crate::config::STORE_SIZE;
use crate::store::{EepromImage, NvStore, StoreError};
use embedded_storage_async::nor_flash::{ErrorType, NorFlash, NorFlashErrorKind, ReadNorFlash};
use std::collections::VecDeque;

/// Sensor handing out scripted readings. Runs out of readings as a timeout.
#[derive(Default)]
pub struct FakeSensor {
    pub ready: VecDeque<bool>,
    pub raw: VecDeque<Result<i32, SensorError>>,
    pub averaged: VecDeque<Result<i32, SensorError>>,
    pub averaged_sample_counts: Vec<usize>,
}

impl FakeSensor {
    pub fn with_averaged(readings: &[i32]) -> Self {
        Self {
            averaged: readings.iter().copied().map(Ok).collect(),
            ..Self::default()
        }
    }

    pub fn with_raw(readings: &[i32]) -> Self {
        Self {
            raw: readings.iter().copied().map(Ok).collect(),
            ..Self::default()
        }
    }

    pub fn timing_out() -> Self {
        Self::default()
    }

    pub fn and_raw(mut self, readings: &[i32]) -> Self {
        self.raw.extend(readings.iter().copied().map(Ok));
        self
    }

    pub fn and_averaged(mut self, readings: &[i32]) -> Self {
        self.averaged.extend(readings.iter().copied().map(Ok));
        self
    }
}

impl LoadCellSensor for FakeSensor {
    async fn is_ready(&mut self) -> Result<bool, SensorError> {
        Ok(self.ready.pop_front().unwrap_or(true))
    }

    async fn read_raw(&mut self) -> Result<i32, SensorError> {
        self.raw.pop_front().unwrap_or(Err(SensorError::Timeout))
    }

    async fn read_raw_averaged(&mut self, sample_count: usize) -> Result<i32, SensorError> {
        self.averaged_sample_counts.push(sample_count);
        self.averaged.pop_front().unwrap_or(Err(SensorError::Timeout))
    }
}

/// Store that reads as erased and refuses every write.
pub struct FailingStore;

impl NvStore for FailingStore {
    fn capacity(&self) -> usize {
        STORE_SIZE
    }

    async fn read_field(&mut self, _offset: usize, buffer: &mut [u8]) -> Result<(), StoreError> {
        buffer.fill(crate::store::ERASED_BYTE);
        Ok(())
    }

    async fn write_field(&mut self, _offset: usize, _bytes: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::SaveError)
    }
}

/// Store that accepts a fixed number of writes and refuses every one after that.
pub struct FlakyStore {
    pub image: EepromImage<STORE_SIZE>,
    pub writes_left: usize,
}

impl FlakyStore {
    pub fn failing_after(writes: usize) -> Self {
        Self {
            image: EepromImage::erased(),
            writes_left: writes,
        }
    }
}

impl NvStore for FlakyStore {
    fn capacity(&self) -> usize {
        STORE_SIZE
    }

    async fn read_field(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StoreError> {
        self.image.read(offset, buffer)
    }

    async fn write_field(&mut self, offset: usize, bytes: &[u8]) -> Result<(), StoreError> {
        if self.writes_left == 0 {
            return Err(StoreError::SaveError);
        }
        self.writes_left -= 1;
        self.image.write(offset, bytes)
    }
}

/// NOR flash held in RAM. Writes can only clear bits, like the real part.
pub struct RamFlash {
    pub bytes: Vec<u8>,
    pub write_count: usize,
    pub erase_count: usize,
}

impl RamFlash {
    pub const PAGE_SIZE: usize = 4096;
    pub const SIZE: usize = 4 * Self::PAGE_SIZE;

    pub fn new() -> Self {
        Self {
            bytes: vec![crate::store::ERASED_BYTE; Self::SIZE],
            write_count: 0,
            erase_count: 0,
        }
    }

    pub fn fill(&mut self, value: u8) {
        self.bytes.fill(value);
    }

    fn checked(&self, offset: u32, len: usize, align: usize) -> Result<usize, NorFlashErrorKind> {
        let start = offset as usize;
        if start % align != 0 || len % align != 0 {
            return Err(NorFlashErrorKind::NotAligned);
        }
        if start + len > self.bytes.len() {
            return Err(NorFlashErrorKind::OutOfBounds);
        }
        Ok(start)
    }
}

impl ErrorType for RamFlash {
    type Error = NorFlashErrorKind;
}

impl ReadNorFlash for RamFlash {
    const READ_SIZE: usize = 1;

    async fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = self.checked(offset, bytes.len(), Self::READ_SIZE)?;
        bytes.copy_from_slice(&self.bytes[start..start + bytes.len()]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

impl NorFlash for RamFlash {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = Self::PAGE_SIZE;

    async fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
        let len = to.checked_sub(from).ok_or(NorFlashErrorKind::OutOfBounds)? as usize;
        let start = self.checked(from, len, Self::ERASE_SIZE)?;
        self.bytes[start..start + len].fill(crate::store::ERASED_BYTE);
        self.erase_count += 1;
        Ok(())
    }

    async fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = self.checked(offset, bytes.len(), Self::WRITE_SIZE)?;
        for (cell, byte) in self.bytes[start..start + bytes.len()].iter_mut().zip(bytes) {
            *cell &= *byte;
        }
        self.write_count += 1;
        Ok(())
    }
}
