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

use crate::config::{CYCLE_DELAY, PARKED_REPORT_INTERVAL};
use defmt::{Format, error, info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Timer;
use loadcell_core::{
    CycleReport, LoadCellSensor, Measurement, NvStore, PendingCommands, ScaleNode,
};

/// Run acquisition cycles forever, logging each one.
pub async fn run<S, St>(
    mut node: ScaleNode<S, St>,
    commands: &PendingCommands<CriticalSectionRawMutex>,
) -> !
where
    S: LoadCellSensor,
    St: NvStore,
{
    loop {
        if let Some(report) = node.run_cycle(commands).await {
            log_cycle(&report);
        }
        Timer::after(CYCLE_DELAY).await;
    }
}

fn log_cycle(report: &CycleReport) {
    match report.measurement {
        Measurement::Sample {
            raw,
            weight,
            average,
        } => info!("Reading: {} Weight: {=f32} Avg Weight: {=f32}", raw, weight, average),
        Measurement::Rejected { raw, error } => {
            warn!("Reading: {} could not be converted: {:?}", raw, error)
        }
        Measurement::SensorFailed(e) => warn!("Unable to read sensor: {:?}", e),
    }

    if !report.calibrated {
        info!("Scale not calibrated...");
    }

    if report.calibration.is_some() {
        info!("Scale calibration");
    }
    match report.calibration {
        Some(Ok(outcome)) => {
            info!("New cal factor: {=f32}", outcome.calibration_factor);
            match outcome.scale_reading {
                Some(reading) => info!("New Scale Reading: {=f32}", reading),
                None => warn!("No scale reading available after calibration"),
            }
            if let Some(e) = outcome.persist_error {
                warn!("New cal factor is in use but was not saved: {:?}", e);
            }
        }
        Some(Err(e)) => warn!("Scale calibration failed: {:?}", e),
        None => {}
    }

    match report.tare {
        Some(Ok(outcome)) => {
            info!("New zero offset: {}", outcome.zero_offset);
            if let Some(e) = outcome.persist_error {
                warn!("New zero offset is in use but was not saved: {:?}", e);
            }
        }
        Some(Err(e)) => warn!("Tare failed: {:?}", e),
        None => {}
    }
}

/// Park a node that could not start, repeating why so it is seen whenever a probe attaches.
pub async fn park<E: Format>(reason: E) -> ! {
    loop {
        error!("Scale node stopped: {:?}", reason);
        Timer::after(PARKED_REPORT_INTERVAL).await;
    }
}
