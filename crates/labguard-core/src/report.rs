//! Progress reporting.
//!
//! Workflows emit typed events into a sink instead of printing; the binaries
//! render them to stdout and tests collect them into a `Vec`.

use std::fmt::Display;

use labguard_types::{ScanEvent, SetupEvent};

/// Receiver of progress events.
pub trait EventSink<E> {
    fn emit(&mut self, event: E);
}

impl<E> EventSink<E> for Vec<E> {
    fn emit(&mut self, event: E) {
        self.push(event);
    }
}

/// An event that can be rendered as a progress line.
pub trait Reportable: Display {
    /// Quiet events are logged at debug level instead of printed.
    fn is_quiet(&self) -> bool {
        false
    }
}

impl Reportable for ScanEvent {
    fn is_quiet(&self) -> bool {
        ScanEvent::is_quiet(self)
    }
}

impl Reportable for SetupEvent {}
