// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>

//! Helpers to create a report for faillible processes.
//!
//! Items that can be skipped without stopping the generation (a relation
//! with a missing stop, a trip with an unknown stop, ...) are accumulated in
//! a [Report] which is logged and written at the end of the run.
use serde::Serialize;
use tracing::{info, warn};

/// Each report record will be categorized with a type implementing this
/// `ReportCategory` trait.
pub trait ReportCategory: Serialize + PartialEq {}

/// Type of the report
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum ReportType {
    /// A relation stop member is not a known stop node
    MissingStopNode,
    /// The `route` tag of a relation or the `route_type` of a GTFS route is
    /// not supported
    UnknownRouteType,
    /// A relation has been skipped
    FailedRelation,
    /// A way member is missing from the extract or misses some of its nodes
    IncompleteWay,
    /// A stop time references a `stop_id` which is not the `gtfs_id` of any
    /// mapped stop
    UnresolvedStop,
    /// A trip references an unknown route
    UnknownRoute,
    /// A trip has no stop times
    TripWithoutStopTimes,
    /// A stop time references an unknown trip
    UnknownTrip,
    /// Two stops of the same mode with the same `ref` are close to each other
    DuplicateStopRef,
    /// A stop position has no transport mode and is ignored
    UnclassifiedStopPosition,
}

impl ReportCategory for ReportType {}

/// A report record.
#[derive(Debug, Serialize, PartialEq)]
pub struct ReportRow<R: ReportCategory> {
    category: R,
    message: String,
}

impl<R: ReportCategory> ReportRow<R> {
    /// Category of the record
    pub fn category(&self) -> &R {
        &self.category
    }
    /// Human readable description of the record
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An report is a list of report records with 2 levels of recording: warnings
/// and errors.
#[derive(Debug, Serialize)]
pub struct Report<R: ReportCategory = ReportType> {
    errors: Vec<ReportRow<R>>,
    warnings: Vec<ReportRow<R>>,
}

impl<R: ReportCategory> Default for Report<R> {
    fn default() -> Self {
        Report {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl<R: ReportCategory> Report<R> {
    /// Add a warning report record.
    pub fn add_warning(&mut self, warning: String, warning_type: R) {
        let report_row = ReportRow {
            category: warning_type,
            message: warning,
        };
        if !self.warnings.contains(&report_row) {
            self.warnings.push(report_row);
        }
    }
    /// Add an error report record.
    pub fn add_error(&mut self, error: String, error_type: R) {
        let report_row = ReportRow {
            category: error_type,
            message: error,
        };
        if !self.errors.contains(&report_row) {
            self.errors.push(report_row);
        }
    }
    /// Error records, in insertion order
    pub fn errors(&self) -> &[ReportRow<R>] {
        &self.errors
    }
    /// Warning records, in insertion order
    pub fn warnings(&self) -> &[ReportRow<R>] {
        &self.warnings
    }
    /// Messages of the errors of a category
    pub fn error_messages<'a>(&'a self, category: &'a R) -> impl Iterator<Item = &'a str> {
        self.errors
            .iter()
            .filter(move |row| row.category == *category)
            .map(|row| row.message.as_str())
    }
    /// At least one error has been recorded
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
    /// Log every record, errors first.
    pub fn log_summary(&self) {
        if self.errors.is_empty() && self.warnings.is_empty() {
            info!("Generation completed without any error");
            return;
        }
        warn!(
            "Generation completed with {} error(s) and {} warning(s)",
            self.errors.len(),
            self.warnings.len()
        );
        for row in &self.errors {
            warn!("error: {}", row.message);
        }
        for row in &self.warnings {
            info!("warning: {}", row.message);
        }
    }
}
