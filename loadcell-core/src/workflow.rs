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

use crate::calibration::{CalibrationError, CalibrationState};
use crate::sensor::{LoadCellSensor, SensorError};
use crate::store::{NvStore, StoreError};
use log::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkflowState {
    Idle,
    Calibrating,
    Taring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WorkflowError {
    InvalidInput(CalibrationError),
    SensorTimeout,
    Sensor(SensorError),
}

impl From<SensorError> for WorkflowError {
    fn from(err: SensorError) -> Self {
        match err {
            SensorError::Timeout => WorkflowError::SensorTimeout,
            other => WorkflowError::Sensor(other),
        }
    }
}

impl From<CalibrationError> for WorkflowError {
    fn from(err: CalibrationError) -> Self {
        WorkflowError::InvalidInput(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationOutcome {
    pub calibration_factor: f32,
    /// Weight read back straight after calibrating, if the sensor gave one.
    pub scale_reading: Option<f32>,
    /// Set when the new factor is in use but could not be committed to the store.
    pub persist_error: Option<StoreError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TareOutcome {
    pub zero_offset: i32,
    /// Set when the new zero offset is in use but could not be committed to the store.
    pub persist_error: Option<StoreError>,
}

/// Runs tare and calibration requests against the sensor, updating and committing the
/// calibration. Both always leave the workflow back in [`WorkflowState::Idle`].
pub struct CalibrationWorkflow {
    state: WorkflowState,
    sample_count: usize,
}

impl CalibrationWorkflow {
    pub fn new(sample_count: usize) -> Self {
        Self {
            state: WorkflowState::Idle,
            sample_count,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub async fn calibrate<S, St>(
        &mut self,
        calibration: &mut CalibrationState,
        sensor: &mut S,
        store: &mut St,
        reference_weight: f32,
    ) -> Result<CalibrationOutcome, WorkflowError>
    where
        S: LoadCellSensor,
        St: NvStore,
    {
        self.state = WorkflowState::Calibrating;
        let result = self
            .run_calibration(calibration, sensor, store, reference_weight)
            .await;
        self.state = WorkflowState::Idle;
        result
    }

    pub async fn tare<S, St>(
        &mut self,
        calibration: &mut CalibrationState,
        sensor: &mut S,
        store: &mut St,
    ) -> Result<TareOutcome, WorkflowError>
    where
        S: LoadCellSensor,
        St: NvStore,
    {
        self.state = WorkflowState::Taring;
        let result = self.run_tare(calibration, sensor, store).await;
        self.state = WorkflowState::Idle;
        result
    }

    async fn run_calibration<S, St>(
        &mut self,
        calibration: &mut CalibrationState,
        sensor: &mut S,
        store: &mut St,
        reference_weight: f32,
    ) -> Result<CalibrationOutcome, WorkflowError>
    where
        S: LoadCellSensor,
        St: NvStore,
    {
        // no point blocking on the sensor for a request that can only be rejected
        if reference_weight == 0.0 {
            return Err(CalibrationError::ZeroReferenceWeight.into());
        }

        debug!("Calibrating against reference weight {}", reference_weight);
        let raw_reading = sensor.read_raw_averaged(self.sample_count).await?;
        trace!("Averaged reading under reference = {}", raw_reading);

        let calibration_factor =
            calibration.apply_calibration_factor(reference_weight, raw_reading)?;
        let persist_error = persist_applied(calibration, store).await;

        let scale_reading = match sensor.read_raw().await {
            Ok(raw) => calibration.to_physical_units(raw).ok(),
            Err(_) => None,
        };

        Ok(CalibrationOutcome {
            calibration_factor,
            scale_reading,
            persist_error,
        })
    }

    async fn run_tare<S, St>(
        &mut self,
        calibration: &mut CalibrationState,
        sensor: &mut S,
        store: &mut St,
    ) -> Result<TareOutcome, WorkflowError>
    where
        S: LoadCellSensor,
        St: NvStore,
    {
        let raw_reading = sensor.read_raw_averaged(self.sample_count).await?;
        calibration.apply_zero(raw_reading);
        Ok(TareOutcome {
            zero_offset: raw_reading,
            persist_error: persist_applied(calibration, store).await,
        })
    }
}

async fn persist_applied<St: NvStore>(
    calibration: &CalibrationState,
    store: &mut St,
) -> Option<StoreError> {
    match calibration.persist(store).await {
        Ok(()) => None,
        Err(e) => {
            warn!("Calibration applied but not saved: {:?}", e);
            Some(e)
        }
    }
}
