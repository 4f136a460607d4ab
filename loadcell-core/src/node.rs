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

use crate::average::AverageWindow;
use crate::calibration::{CalibrationError, CalibrationState};
use crate::commands::PendingCommands;
use crate::config::{AVERAGE_WINDOW_SIZE, CALIBRATION_SAMPLE_COUNT};
use crate::sensor::{LoadCellSensor, SensorError};
use crate::store::{NvStore, StoreError};
use crate::workflow::{CalibrationOutcome, CalibrationWorkflow, TareOutcome, WorkflowError};
use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    SensorUnavailable(SensorError),
    Store(StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Measurement {
    Sample { raw: i32, weight: f32, average: f32 },
    /// Reading could not be converted with the current calibration.
    Rejected { raw: i32, error: CalibrationError },
    SensorFailed(SensorError),
}

/// What happened during one acquisition cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub measurement: Measurement,
    pub calibrated: bool,
    pub calibration: Option<Result<CalibrationOutcome, WorkflowError>>,
    pub tare: Option<Result<TareOutcome, WorkflowError>>,
}

/// Everything the acquisition loop owns: the sensor, the settings store, the calibration
/// and the smoothing window.
pub struct ScaleNode<S, St> {
    sensor: S,
    store: St,
    calibration: CalibrationState,
    window: AverageWindow<AVERAGE_WINDOW_SIZE>,
    workflow: CalibrationWorkflow,
}

impl<S, St> ScaleNode<S, St>
where
    S: LoadCellSensor,
    St: NvStore,
{
    /// Bring the node up with the calibration held in `store`.
    pub async fn start(sensor: S, mut store: St) -> Result<Self, StartupError> {
        let calibration = CalibrationState::load(&mut store)
            .await
            .map_err(StartupError::Store)?;

        Ok(Self {
            sensor,
            store,
            calibration,
            window: AverageWindow::new(),
            workflow: CalibrationWorkflow::new(CALIBRATION_SAMPLE_COUNT),
        })
    }

    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    pub fn average(&self) -> f32 {
        self.window.average()
    }

    /// Run one acquisition cycle. Returns `None` without touching anything when the sensor
    /// has no new conversion; pending commands then wait for the next cycle.
    ///
    /// A requested calibration always runs before a requested tare.
    pub async fn run_cycle<M: RawMutex>(
        &mut self,
        commands: &PendingCommands<M>,
    ) -> Option<CycleReport> {
        match self.sensor.is_ready().await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!("Unable to check sensor readiness: {:?}", e);
                return None;
            }
        }

        let measurement = self.measure().await;
        let calibrated = self.calibration.is_calibrated();

        let pending = commands.take();
        let calibration = match pending.calibrate {
            Some(reference_weight) => Some(
                self.workflow
                    .calibrate(
                        &mut self.calibration,
                        &mut self.sensor,
                        &mut self.store,
                        reference_weight as f32,
                    )
                    .await,
            ),
            None => None,
        };
        let tare = if pending.tare {
            Some(
                self.workflow
                    .tare(&mut self.calibration, &mut self.sensor, &mut self.store)
                    .await,
            )
        } else {
            None
        };

        Some(CycleReport {
            measurement,
            calibrated,
            calibration,
            tare,
        })
    }

    async fn measure(&mut self) -> Measurement {
        let raw = match self.sensor.read_raw().await {
            Ok(raw) => raw,
            Err(e) => return Measurement::SensorFailed(e),
        };

        match self.calibration.to_physical_units(raw) {
            Ok(weight) => {
                self.window.push(weight);
                let average = self.window.average();
                trace!("Reading = {}, weight = {}, average = {}", raw, weight, average);
                Measurement::Sample {
                    raw,
                    weight,
                    average,
                }
            }
            Err(error) => Measurement::Rejected { raw, error },
        }
    }
}
