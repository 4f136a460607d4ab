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

use crate::store::{checked_range, NvStore, StoreError};
use core::ops::Range;
use log::trace;
use strum::{EnumCount, EnumIter};

/// Bit pattern of a 32-bit field that has never been written.
pub const ERASED_WORD: u32 = 0xFFFF_FFFF;

const FIELD_SIZE: usize = 4;

/// Settings persisted in the store and their fixed location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumCount, EnumIter)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsField {
    CalibrationFactor,
    ZeroOffset,
}

impl SettingsField {
    pub const fn offset(&self) -> usize {
        match self {
            SettingsField::CalibrationFactor => 0,
            // leaves a margin after the factor so the two fields can never overlap
            SettingsField::ZeroOffset => 10,
        }
    }

    pub const fn size(&self) -> usize {
        FIELD_SIZE
    }

    pub const fn range(&self) -> Range<usize> {
        self.offset()..self.offset() + self.size()
    }
}

/// Read a 32-bit field. `None` means the field still holds the erased pattern.
pub async fn read_word<S: NvStore>(
    store: &mut S,
    field: SettingsField,
) -> Result<Option<u32>, StoreError> {
    checked_range(store.capacity(), field.offset(), field.size())?;
    let mut bytes = [0u8; FIELD_SIZE];
    store.read_field(field.offset(), &mut bytes).await?;
    let word = u32::from_le_bytes(bytes);
    trace!("Read {:?} = 0x{:08x}", field, word);

    if word == ERASED_WORD {
        Ok(None)
    } else {
        Ok(Some(word))
    }
}

pub async fn write_word<S: NvStore>(
    store: &mut S,
    field: SettingsField,
    word: u32,
) -> Result<(), StoreError> {
    checked_range(store.capacity(), field.offset(), field.size())?;
    trace!("Writing {:?} = 0x{:08x}", field, word);
    store.write_field(field.offset(), &word.to_le_bytes()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STORE_SIZE;
    use crate::store::EepromImage;
    use embassy_futures::block_on;
    use strum::IntoEnumIterator;

    #[test]
    fn fields_do_not_overlap_and_fit_in_the_store() {
        let fields: Vec<SettingsField> = SettingsField::iter().collect();
        assert_eq!(fields.len(), SettingsField::COUNT);

        for (i, a) in fields.iter().enumerate() {
            assert!(a.range().end <= STORE_SIZE);
            for b in fields.iter().skip(i + 1) {
                let disjoint = a.range().end <= b.range().start || b.range().end <= a.range().start;
                assert!(disjoint, "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn erased_field_reads_as_none() {
        let mut store = EepromImage::<STORE_SIZE>::erased();
        let word = block_on(read_word(&mut store, SettingsField::ZeroOffset)).unwrap();
        assert_eq!(word, None);
    }

    #[test]
    fn written_field_reads_back() {
        let mut store = EepromImage::<STORE_SIZE>::erased();
        block_on(write_word(&mut store, SettingsField::ZeroOffset, 1234)).unwrap();

        let word = block_on(read_word(&mut store, SettingsField::ZeroOffset)).unwrap();
        assert_eq!(word, Some(1234));
        let other = block_on(read_word(&mut store, SettingsField::CalibrationFactor)).unwrap();
        assert_eq!(other, None);
    }

    #[test]
    fn field_outside_a_small_store_is_rejected() {
        let mut store = EepromImage::<12>::erased();

        assert_eq!(
            block_on(read_word(&mut store, SettingsField::ZeroOffset)),
            Err(StoreError::OutOfRange { offset: 10, len: 4 })
        );
        assert_eq!(
            block_on(write_word(&mut store, SettingsField::ZeroOffset, 7)),
            Err(StoreError::OutOfRange { offset: 10, len: 4 })
        );
        assert_eq!(store, EepromImage::<12>::erased());
        assert_eq!(
            block_on(read_word(&mut store, SettingsField::CalibrationFactor)),
            Ok(None)
        );
    }
}
