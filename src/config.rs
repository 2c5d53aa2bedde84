//! Per-instance charger configuration

use crate::registers::OTG_RESET_RETRIES;

/// Static configuration of one charger instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Config {
    /// Base offset of the charger peripheral in the PMIC register space
    pub base: u16,
    /// Over-current faults absorbed by resetting the OTG output before one is reported
    pub otg_reset_retries: u8,
}

impl Config {
    /// The SMBCHG block of a PMI8994
    pub const PMI8994: Config = Config::new(0x1000);

    /// Configuration for a charger at `base` with the default retry budget
    pub const fn new(base: u16) -> Self {
        Config {
            base,
            otg_reset_retries: OTG_RESET_RETRIES,
        }
    }

    /// Override the OTG over-current retry budget
    pub const fn with_otg_reset_retries(self, retries: u8) -> Self {
        Config {
            otg_reset_retries: retries,
            ..self
        }
    }
}
