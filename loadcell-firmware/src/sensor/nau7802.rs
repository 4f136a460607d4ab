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

use crate::config::ACQUISITION_TIMEOUT;
use defmt::{debug, trace};
use embassy_time::{with_timeout, Duration, Timer};
use embedded_hal::i2c::{Error as _, ErrorKind};
use embedded_hal_async::i2c::I2c;
use loadcell_core::{LoadCellSensor, SensorError};

const DEVICE_ADDRESS: u8 = 0x2A;

#[derive(Clone, Copy)]
#[repr(u8)]
enum Register {
    PuCtrl = 0x00,
    Ctrl1 = 0x01,
    Ctrl2 = 0x02,
    AdcoB2 = 0x12,
    Adc = 0x15,
    PgaPwr = 0x1C,
    DeviceRevision = 0x1F,
}

// PU_CTRL bits
const PU_CTRL_RR: u8 = 1 << 0;
const PU_CTRL_PUD: u8 = 1 << 1;
const PU_CTRL_PUA: u8 = 1 << 2;
const PU_CTRL_PUR: u8 = 1 << 3;
const PU_CTRL_CR: u8 = 1 << 5;
const PU_CTRL_AVDDS: u8 = 1 << 7;

// CTRL1 fields
const CTRL1_GAIN_MASK: u8 = 0b0000_0111;
const CTRL1_GAIN_128: u8 = 0b111;
const CTRL1_VLDO_MASK: u8 = 0b0011_1000;
const CTRL1_VLDO_3V3: u8 = 0b100 << 3;

// CTRL2 fields
const CTRL2_CALS: u8 = 1 << 2;
const CTRL2_CAL_ERR: u8 = 1 << 3;
const CTRL2_CRS_MASK: u8 = 0b0111_0000;
const CTRL2_CRS_80SPS: u8 = 0b011 << 4;

const ADC_CLK_CHP_DISABLE: u8 = 0b11 << 4;
const PGA_PWR_CAP_EN: u8 = 1 << 7;

const RESET_DELAY: Duration = Duration::from_millis(1);
const POLL_INTERVAL: Duration = Duration::from_millis(1);
const POWER_UP_POLLS: usize = 200;
const CALIBRATION_POLLS: usize = 1000;

/// NAU7802 24-bit load-cell ADC on I2C.
pub struct Nau7802<I2C> {
    i2c: I2C,
}

impl<I2C> Nau7802<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Reset and configure the device: internal 3.3 V LDO, gain 128, 80 samples per second,
    /// clock chopper off, then run the analog front end calibration.
    pub async fn begin(&mut self) -> Result<(), SensorError> {
        let revision = self.read_register(Register::DeviceRevision).await?;
        debug!("NAU7802 revision 0x{:x}", revision & 0x0F);

        self.reset().await?;
        self.power_up().await?;

        self.update_register(Register::Ctrl1, CTRL1_VLDO_MASK, CTRL1_VLDO_3V3)
            .await?;
        self.update_register(Register::Ctrl1, CTRL1_GAIN_MASK, CTRL1_GAIN_128)
            .await?;
        self.update_register(Register::Ctrl2, CTRL2_CRS_MASK, CTRL2_CRS_80SPS)
            .await?;
        self.update_register(Register::Adc, ADC_CLK_CHP_DISABLE, ADC_CLK_CHP_DISABLE)
            .await?;
        self.update_register(Register::PgaPwr, PGA_PWR_CAP_EN, PGA_PWR_CAP_EN)
            .await?;
        self.update_register(Register::PuCtrl, PU_CTRL_AVDDS, PU_CTRL_AVDDS)
            .await?;

        self.calibrate_afe().await
    }

    async fn reset(&mut self) -> Result<(), SensorError> {
        self.update_register(Register::PuCtrl, PU_CTRL_RR, PU_CTRL_RR)
            .await?;
        Timer::after(RESET_DELAY).await;
        self.update_register(Register::PuCtrl, PU_CTRL_RR, 0).await
    }

    async fn power_up(&mut self) -> Result<(), SensorError> {
        self.update_register(
            Register::PuCtrl,
            PU_CTRL_PUD | PU_CTRL_PUA,
            PU_CTRL_PUD | PU_CTRL_PUA,
        )
        .await?;

        for _ in 0..POWER_UP_POLLS {
            if self.read_register(Register::PuCtrl).await? & PU_CTRL_PUR != 0 {
                return Ok(());
            }
            Timer::after(POLL_INTERVAL).await;
        }
        Err(SensorError::InitialisationFailed)
    }

    async fn calibrate_afe(&mut self) -> Result<(), SensorError> {
        self.update_register(Register::Ctrl2, CTRL2_CALS, CTRL2_CALS)
            .await?;

        for _ in 0..CALIBRATION_POLLS {
            let ctrl2 = self.read_register(Register::Ctrl2).await?;
            if ctrl2 & CTRL2_CALS == 0 {
                if ctrl2 & CTRL2_CAL_ERR != 0 {
                    return Err(SensorError::InitialisationFailed);
                }
                trace!("AFE calibration complete");
                return Ok(());
            }
            Timer::after(POLL_INTERVAL).await;
        }
        Err(SensorError::InitialisationFailed)
    }

    async fn read_register(&mut self, register: Register) -> Result<u8, SensorError> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[register as u8], &mut value)
            .await
            .map_err(bus_error)?;
        Ok(value[0])
    }

    async fn write_register(&mut self, register: Register, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(DEVICE_ADDRESS, &[register as u8, value])
            .await
            .map_err(bus_error)
    }

    async fn update_register(
        &mut self,
        register: Register,
        mask: u8,
        bits: u8,
    ) -> Result<(), SensorError> {
        let current = self.read_register(register).await?;
        self.write_register(register, (current & !mask) | (bits & mask))
            .await
    }

    async fn collect_average(&mut self, sample_count: usize) -> Result<i32, SensorError> {
        let mut total: i64 = 0;
        let mut collected = 0;
        while collected < sample_count {
            if self.is_ready().await? {
                total += self.read_raw().await? as i64;
                collected += 1;
            } else {
                Timer::after(POLL_INTERVAL).await;
            }
        }
        Ok((total / sample_count as i64) as i32)
    }
}

impl<I2C> LoadCellSensor for Nau7802<I2C>
where
    I2C: I2c,
{
    async fn is_ready(&mut self) -> Result<bool, SensorError> {
        Ok(self.read_register(Register::PuCtrl).await? & PU_CTRL_CR != 0)
    }

    async fn read_raw(&mut self) -> Result<i32, SensorError> {
        let mut bytes = [0u8; 3];
        self.i2c
            .write_read(DEVICE_ADDRESS, &[Register::AdcoB2 as u8], &mut bytes)
            .await
            .map_err(bus_error)?;
        Ok(sign_extend_24(bytes))
    }

    async fn read_raw_averaged(&mut self, sample_count: usize) -> Result<i32, SensorError> {
        let sample_count = sample_count.max(1);
        with_timeout(ACQUISITION_TIMEOUT, self.collect_average(sample_count))
            .await
            .map_err(|_| SensorError::Timeout)?
    }
}

fn sign_extend_24(bytes: [u8; 3]) -> i32 {
    i32::from_be_bytes([bytes[0], bytes[1], bytes[2], 0]) >> 8
}

fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> SensorError {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => SensorError::NotDetected,
        _ => SensorError::BusError,
    }
}
