#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

//! An embedded async driver for the Qualcomm PMI8994 switch-mode battery charger (SMBCHG).
//!
//! The driver derives charging status, charge type, battery health and USB input presence from the
//! charger's status registers, and controls the OTG VBUS output including recovery from spurious
//! over-current faults.
//!
//! A [`Charger`] is shared by reference between three kinds of users:
//!
//! - the interrupt dispatcher, which calls [`Charger::handle_event`] for each [`Event`] that
//!   [`Event::is_handled`],
//! - one task running [`Charger::run_otg_reset`],
//! - the power-supply layer, which calls [`Charger::properties`] or [`Charger::property`] and
//!   controls the OTG output with [`Charger::enable_otg`] and [`Charger::disable_otg`].
//!
//! Property queries never fail: bus errors are logged and reported as the most conservative
//! value. Enabling and disabling the OTG output report bus errors to the caller.

#[macro_use]
mod fmt;

mod charger;
mod config;
mod error;
mod events;
mod otg;
mod port;
mod presence;
mod registers;
mod status;
#[cfg(test)]
mod testutil;

pub use charger::Charger;
pub use config::Config;
pub use error::Error;
pub use events::{Event, EventOutcome, Handler};
pub use otg::{OtgEvent, OtgState};
pub use port::{I2cPort, RegisterPort};
pub use registers::*;
pub use status::{
    ChargeType, Health, Property, PropertyValue, Status, SupplyState, SUPPLY_NAME,
};
