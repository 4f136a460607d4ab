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

use core::cell::Cell;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Work requested by a remote caller and not yet carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingCommand {
    /// Reference weight currently on the scale, when a calibration was requested.
    pub calibrate: Option<i32>,
    pub tare: bool,
}

impl PendingCommand {
    pub const NONE: Self = Self {
        calibrate: None,
        tare: false,
    };

    pub fn is_empty(&self) -> bool {
        self.calibrate.is_none() && !self.tare
    }
}

/// Command flags shared between the remote invocation handlers and the acquisition loop.
///
/// Handlers only ever set flags. The loop takes and clears them in one step under the same
/// lock, so a request arriving while a previous one is being processed waits for the next
/// cycle instead of being lost.
pub struct PendingCommands<M: RawMutex> {
    inner: Mutex<M, Cell<PendingCommand>>,
}

impl<M: RawMutex> PendingCommands<M> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(PendingCommand::NONE)),
        }
    }

    /// A later request replaces the reference weight of an earlier one not yet processed.
    pub fn request_calibration(&self, reference_weight: i32) {
        self.inner.lock(|pending| {
            let mut command = pending.get();
            command.calibrate = Some(reference_weight);
            pending.set(command);
        });
    }

    pub fn request_tare(&self) {
        self.inner.lock(|pending| {
            let mut command = pending.get();
            command.tare = true;
            pending.set(command);
        });
    }

    pub fn take(&self) -> PendingCommand {
        self.inner.lock(|pending| pending.replace(PendingCommand::NONE))
    }

    pub fn peek(&self) -> PendingCommand {
        self.inner.lock(|pending| pending.get())
    }
}

impl<M: RawMutex> Default for PendingCommands<M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn starts_empty() {
        let commands = PendingCommands::<NoopRawMutex>::new();
        assert!(commands.peek().is_empty());
        assert!(commands.take().is_empty());
    }

    #[test]
    fn take_clears_both_flags() {
        let commands = PendingCommands::<NoopRawMutex>::new();
        commands.request_calibration(500);
        commands.request_tare();

        let taken = commands.take();
        assert_eq!(
            taken,
            PendingCommand {
                calibrate: Some(500),
                tare: true
            }
        );
        assert!(commands.peek().is_empty());
    }

    #[test]
    fn latest_reference_weight_wins() {
        let commands = PendingCommands::<NoopRawMutex>::new();
        commands.request_calibration(100);
        commands.request_calibration(250);
        assert_eq!(commands.take().calibrate, Some(250));
    }

    #[test]
    fn request_after_take_is_kept_for_next_cycle() {
        let commands = PendingCommands::<NoopRawMutex>::new();
        commands.request_tare();
        let first = commands.take();
        commands.request_tare();

        assert!(first.tare);
        assert!(commands.peek().tare);
        assert_eq!(commands.peek().calibrate, None);
    }
}
