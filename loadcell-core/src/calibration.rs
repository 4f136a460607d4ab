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

use crate::config::{DEFAULT_CALIBRATION_FACTOR, DEFAULT_ZERO_OFFSET};
use crate::settings::{read_word, write_word, SettingsField};
use crate::store::{NvStore, StoreError};
use log::{debug, trace, warn};

/// Inputs rejected by the calibration maths. The calibration is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    ZeroReferenceWeight,
    ZeroCalibrationFactor,
    /// The reference reading gave a factor that could never convert a reading back
    /// (zero or not finite), usually because nothing was on the scale.
    DegenerateCalibrationFactor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationSettings {
    /// Raw counts per physical unit.
    pub calibration_factor: f32,
    /// Raw reading with nothing on the scale.
    pub zero_offset: i32,
}

impl CalibrationSettings {
    /// False while either value is still at its factory default.
    pub fn is_calibrated(&self) -> bool {
        self.calibration_factor != DEFAULT_CALIBRATION_FACTOR
            && self.zero_offset != DEFAULT_ZERO_OFFSET
    }
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            calibration_factor: DEFAULT_CALIBRATION_FACTOR,
            zero_offset: DEFAULT_ZERO_OFFSET,
        }
    }
}

pub struct CalibrationState {
    settings: CalibrationSettings,
}

impl CalibrationState {
    pub fn new(settings: CalibrationSettings) -> Self {
        Self { settings }
    }

    /// Load the stored calibration. Any field that was never written is replaced with its
    /// default, which is written straight back so the store is never left erased.
    pub async fn load<S: NvStore>(store: &mut S) -> Result<Self, StoreError> {
        let calibration_factor = match read_word(store, SettingsField::CalibrationFactor).await? {
            Some(bits) => f32::from_bits(bits),
            None => {
                warn!("No stored calibration factor, using default");
                write_word(
                    store,
                    SettingsField::CalibrationFactor,
                    DEFAULT_CALIBRATION_FACTOR.to_bits(),
                )
                .await?;
                DEFAULT_CALIBRATION_FACTOR
            }
        };

        let zero_offset = match read_word(store, SettingsField::ZeroOffset).await? {
            Some(bits) => bits as i32,
            None => {
                warn!("No stored zero offset, using default");
                write_word(store, SettingsField::ZeroOffset, DEFAULT_ZERO_OFFSET as u32).await?;
                DEFAULT_ZERO_OFFSET
            }
        };

        let settings = CalibrationSettings {
            calibration_factor,
            zero_offset,
        };
        debug!(
            "Loaded calibration: factor = {}, zero offset = {}",
            settings.calibration_factor, settings.zero_offset
        );
        Ok(Self::new(settings))
    }

    pub fn settings(&self) -> CalibrationSettings {
        self.settings
    }

    pub fn is_calibrated(&self) -> bool {
        self.settings.is_calibrated()
    }

    pub fn apply_zero(&mut self, raw_zero_reading: i32) {
        self.settings.zero_offset = raw_zero_reading;
        trace!("Zero offset = {}", raw_zero_reading);
    }

    /// Derive the calibration factor from a reading taken with `reference_weight` on the
    /// scale. Returns the new factor.
    pub fn apply_calibration_factor(
        &mut self,
        reference_weight: f32,
        raw_reading_under_reference: i32,
    ) -> Result<f32, CalibrationError> {
        if reference_weight == 0.0 {
            return Err(CalibrationError::ZeroReferenceWeight);
        }

        let calibration_factor =
            self.counts_above_zero(raw_reading_under_reference) / reference_weight;
        if calibration_factor == 0.0 || !calibration_factor.is_finite() {
            return Err(CalibrationError::DegenerateCalibrationFactor);
        }

        self.settings.calibration_factor = calibration_factor;
        trace!("Calibration factor = {}", calibration_factor);
        Ok(calibration_factor)
    }

    pub fn to_physical_units(&self, raw_reading: i32) -> Result<f32, CalibrationError> {
        if self.settings.calibration_factor == 0.0 {
            return Err(CalibrationError::ZeroCalibrationFactor);
        }
        Ok(self.counts_above_zero(raw_reading) / self.settings.calibration_factor)
    }

    /// Write both values to the store, whether or not they changed.
    pub async fn persist<S: NvStore>(&self, store: &mut S) -> Result<(), StoreError> {
        write_word(
            store,
            SettingsField::CalibrationFactor,
            self.settings.calibration_factor.to_bits(),
        )
        .await?;
        write_word(store, SettingsField::ZeroOffset, self.settings.zero_offset as u32).await
    }

    fn counts_above_zero(&self, raw_reading: i32) -> f32 {
        (raw_reading as i64 - self.settings.zero_offset as i64) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STORE_SIZE;
    use crate::settings::ERASED_WORD;
    use crate::store::EepromImage;
    use embassy_futures::block_on;

    fn stored_word(store: &EepromImage<STORE_SIZE>, field: SettingsField) -> u32 {
        let bytes = &store.as_bytes()[field.range()];
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn state(calibration_factor: f32, zero_offset: i32) -> CalibrationState {
        CalibrationState::new(CalibrationSettings {
            calibration_factor,
            zero_offset,
        })
    }

    #[test]
    fn erased_store_loads_defaults_and_writes_them_back() {
        let mut store = EepromImage::<STORE_SIZE>::erased();

        let calibration = block_on(CalibrationState::load(&mut store)).unwrap();

        assert_eq!(calibration.settings(), CalibrationSettings::default());
        assert!(!calibration.is_calibrated());
        assert_eq!(
            stored_word(&store, SettingsField::CalibrationFactor),
            1.0f32.to_bits()
        );
        assert_eq!(stored_word(&store, SettingsField::ZeroOffset), 0);
    }

    #[test]
    fn only_the_erased_field_is_defaulted() {
        let mut store = EepromImage::<STORE_SIZE>::erased();
        block_on(write_word(
            &mut store,
            SettingsField::CalibrationFactor,
            40.0f32.to_bits(),
        ))
        .unwrap();

        let calibration = block_on(CalibrationState::load(&mut store)).unwrap();

        assert_eq!(calibration.settings().calibration_factor, 40.0);
        assert_eq!(calibration.settings().zero_offset, 0);
        assert_ne!(stored_word(&store, SettingsField::ZeroOffset), ERASED_WORD);
    }

    #[test]
    fn persisted_values_load_unchanged() {
        let mut store = EepromImage::<STORE_SIZE>::erased();
        let original = state(-12.5, -84_000);
        block_on(original.persist(&mut store)).unwrap();

        let loaded = block_on(CalibrationState::load(&mut store)).unwrap();

        assert_eq!(loaded.settings(), original.settings());
        assert!(loaded.is_calibrated());
    }

    #[test]
    fn fresh_defaults_pass_readings_straight_through() {
        let calibration = CalibrationState::new(CalibrationSettings::default());
        assert_eq!(calibration.to_physical_units(500), Ok(500.0));
    }

    #[test]
    fn conversion_subtracts_zero_and_divides_by_factor() {
        let calibration = state(40.0, 1000);
        for raw in [-5000, 0, 1000, 3000, 8_388_607] {
            let expected = (raw as f32 - 1000.0) / 40.0;
            let weight = calibration.to_physical_units(raw).unwrap();
            assert!((weight - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn tare_moves_the_zero_point() {
        let mut calibration = CalibrationState::new(CalibrationSettings::default());
        calibration.apply_zero(1000);

        assert_eq!(calibration.settings().zero_offset, 1000);
        assert_eq!(calibration.settings().calibration_factor, 1.0);
        assert_eq!(calibration.to_physical_units(1000), Ok(0.0));
    }

    #[test]
    fn calibration_factor_from_reference_weight() {
        let mut calibration = state(1.0, 1000);
        let factor = calibration.apply_calibration_factor(50.0, 3000).unwrap();

        assert_eq!(factor, 40.0);
        assert_eq!(calibration.settings().calibration_factor, 40.0);
        assert!((calibration.to_physical_units(3000).unwrap() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn zero_reference_weight_is_rejected() {
        let mut calibration = state(2.0, 1000);
        let result = calibration.apply_calibration_factor(0.0, 3000);

        assert_eq!(result, Err(CalibrationError::ZeroReferenceWeight));
        assert_eq!(calibration.settings().calibration_factor, 2.0);
        assert_eq!(calibration.settings().zero_offset, 1000);
    }

    #[test]
    fn empty_scale_during_calibration_is_rejected() {
        let mut calibration = state(2.0, 1000);
        let result = calibration.apply_calibration_factor(50.0, 1000);

        assert_eq!(result, Err(CalibrationError::DegenerateCalibrationFactor));
        assert_eq!(calibration.settings().calibration_factor, 2.0);
    }

    #[test]
    fn zero_factor_cannot_convert() {
        let calibration = state(0.0, 0);
        assert_eq!(
            calibration.to_physical_units(10),
            Err(CalibrationError::ZeroCalibrationFactor)
        );
    }

    #[test]
    fn calibrated_needs_both_values_changed() {
        assert!(!state(1.0, 1000).is_calibrated());
        assert!(!state(40.0, 0).is_calibrated());
        assert!(state(40.0, 1000).is_calibrated());
    }
}
