//! Error types for charger operations

use crate::registers::Reg;

/// Errors returned by fallible charger operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// The register port failed to complete a read or write
    Transport(E),
    /// A bit-field decoded to a value the register format does not define
    InvalidValue {
        /// Register the value was read from
        reg: Reg,
        /// Raw register contents
        value: u8,
    },
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Error::Transport(error)
    }
}
