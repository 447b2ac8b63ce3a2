// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//! Operation phases and their logging

use crate::error::PublishError;
use tracing::debug;

/// Step an operation is in.
///
/// `Validating -> Parsing -> (ReadExisting -> Diffing) -> Committing ->
/// CleaningUp -> Done`, or `Failed` from any step. Add skips the update-only
/// steps; delete reads the existing document but never parses a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Checking required fields and dates
    Validating,
    /// Fetching the stored document (update, delete)
    ReadExisting,
    /// Extracting blocks and naming assets
    Parsing,
    /// Working out which images became stale (update)
    Diffing,
    /// Writing to the store; all-or-nothing
    Committing,
    /// Deleting stale images; failures are logged only
    CleaningUp,
    /// Finished successfully
    Done,
    /// Aborted with an error
    Failed,
}

impl Phase {
    /// Log-friendly name
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Validating => "validating",
            Phase::ReadExisting => "read_existing",
            Phase::Parsing => "parsing",
            Phase::Diffing => "diffing",
            Phase::Committing => "committing",
            Phase::CleaningUp => "cleaning_up",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }

    /// Whether a failure in this phase happened before anything was written
    pub fn before_write(&self) -> bool {
        matches!(
            self,
            Phase::Validating | Phase::ReadExisting | Phase::Parsing | Phase::Diffing
        )
    }
}

/// Tracks and logs the phase of one operation
#[derive(Debug)]
pub(crate) struct Progress {
    operation: &'static str,
    phase: Phase,
}

impl Progress {
    pub(crate) fn start(operation: &'static str) -> Self {
        debug!(operation, phase = Phase::Validating.as_str(), "start");
        Self {
            operation,
            phase: Phase::Validating,
        }
    }

    pub(crate) fn enter(&mut self, next: Phase) {
        debug!(
            operation = self.operation,
            from = self.phase.as_str(),
            to = next.as_str(),
            "phase"
        );
        self.phase = next;
    }

    pub(crate) fn finish<T>(&mut self, result: &Result<T, PublishError>) {
        match result {
            Ok(_) => self.enter(Phase::Done),
            Err(err) => {
                debug!(
                    operation = self.operation,
                    from = self.phase.as_str(),
                    to = Phase::Failed.as_str(),
                    kind = err.kind().as_str(),
                    wrote = !self.phase.before_write(),
                    "phase"
                );
                self.phase = Phase::Failed;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }
}
