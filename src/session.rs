//! UI session ownership
//!
//! The underlying driver protocol does not tolerate interleaved commands, so
//! a [`Session`] owns its driver exclusively for the lifetime of a run.
//! Independent runs need independent sessions; there is no pooling.

use crate::driver::UiDriver;

/// Exclusively-owned browsing context for one workflow run
pub struct Session {
    driver: Box<dyn UiDriver>,
}

impl Session {
    /// Acquire a session around a driver
    pub fn new(driver: Box<dyn UiDriver>) -> Self {
        Self { driver }
    }

    /// Borrow the driver for a command
    pub fn driver(&self) -> &dyn UiDriver {
        self.driver.as_ref()
    }

    /// Release the session, handing the driver back to the caller
    pub fn release(self) -> Box<dyn UiDriver> {
        self.driver
    }
}
