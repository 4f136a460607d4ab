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

use crate::config::{SENSOR_INIT_BACKOFF, SENSOR_INIT_RETRIES};
use defmt::{info, warn};
use embassy_time::Timer;
use embedded_hal_async::i2c::I2c;
use loadcell_core::SensorError;
use self::nau7802::Nau7802;

pub mod nau7802;

/// Bring the NAU7802 up, retrying with a doubling delay between attempts.
pub async fn initialise_sensor<I2C>(i2c: I2C) -> Result<Nau7802<I2C>, SensorError>
where
    I2C: I2c,
{
    let mut sensor = Nau7802::new(i2c);
    let mut backoff = SENSOR_INIT_BACKOFF;
    let mut attempt = 1;

    loop {
        match sensor.begin().await {
            Ok(()) => {
                info!("Sensor ready after {} attempt(s)", attempt);
                return Ok(sensor);
            }
            Err(e) if attempt < SENSOR_INIT_RETRIES => {
                warn!(
                    "Sensor start attempt {} failed: {:?}, retrying in {} ms",
                    attempt,
                    e,
                    backoff.as_millis()
                );
                Timer::after(backoff).await;
                backoff = backoff * 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
