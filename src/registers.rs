//! SMBCHG register offsets and bit-field layouts.
//!
//! Offsets are relative to the peripheral base given in [`Config`](crate::Config). Only the
//! registers the driver reads or writes are modelled.

use modular_bitfield::{
    bitfield,
    specifiers::{B2, B3, B4, B5, B7},
    BitfieldSpecifier,
};

/// OTG regulator enable bit in [`Reg::BAT_IF_CMD_CHG`]
pub const OTG_EN_BIT: u8 = 0x01;

/// Highest USBID ADC reading that still counts as a grounded ID pin
pub const USBID_GND_THRESHOLD: u16 = 0x495;

/// Automatic OTG resets attempted before an over-current is reported
pub const OTG_RESET_RETRIES: u8 = 5;

/// Time the OTG output is held off during a reset before re-checking the load
pub const OTG_RESET_SETTLE_MS: u32 = 20;

/// Worst-case USB RID conversion time after a USBID edge, rounded up
pub const USBID_SETTLE_MS: u32 = 20;

/// A register offset relative to the charger base
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Reg(pub u16);

#[allow(missing_docs)]
impl Reg {
    // CHGR
    pub const CHGR_STS: Reg = Reg(0x00e);
    pub const CHGR_RT_STS: Reg = Reg(0x010);

    // BAT-IF
    pub const BAT_IF_RT_STS: Reg = Reg(0x210);
    pub const BAT_IF_CMD_CHG: Reg = Reg(0x242);

    // USB-CHGPTH
    pub const USB_CHGPTH_RID_STS: Reg = Reg(0x30b);
    pub const USB_CHGPTH_INPUT_STS: Reg = Reg(0x30d);
    pub const USB_CHGPTH_USBID_MSB: Reg = Reg(0x30e);
    pub const USB_CHGPTH_RT_STS: Reg = Reg(0x310);

    // MISC
    pub const MISC_IDEV_STS: Reg = Reg(0x608);

    /// Create a register from a raw offset
    pub const fn new(val: u16) -> Self {
        Reg(val)
    }

    /// The raw offset relative to the charger base
    pub const fn to_u16(self) -> u16 {
        self.0
    }
}

#[bitfield(bits = 8)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// `USB_CHGPTH_RT_STS`: real-time USB input status
///
/// Bit 0 is input under-voltage, bit 1 input over-voltage and bit 2 input source detected.
pub struct UsbinRtSts {
    pub usbin_uv: bool,
    pub usbin_ov: bool,
    pub usbin_src_det: bool,
    #[skip]
    __: B5,
}

#[bitfield(bits = 8)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// `USB_CHGPTH_INPUT_STS`: which class of USB input the charger is running from
///
/// Bits 3, 4 and 5 flag a low-voltage (5V), unregulated and 9V regulated input respectively.
pub struct UsbinInputSts {
    #[skip]
    __: B3,
    pub usbin_lv: bool,
    pub usbin_unreg: bool,
    pub usbin_9v: bool,
    #[skip]
    __: B2,
}

impl UsbinInputSts {
    /// Is any usable input class reported?
    pub fn any_input(self) -> bool {
        self.usbin_lv() || self.usbin_unreg() || self.usbin_9v()
    }
}

#[bitfield(bits = 8)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// `MISC_IDEV_STS`: ID pin floating/ground classification
///
/// The low nibble (`fmb_sts`) is zero when the ID pin is grounded.
pub struct IdevSts {
    pub fmb_sts: B4,
    #[skip]
    __: B4,
}

#[bitfield(bits = 8)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// `USB_CHGPTH_RID_STS`: resistance-ID classification of the ID pin
///
/// The low nibble (`rid`) is zero for a grounded ID pin.
pub struct RidSts {
    pub rid: B4,
    #[skip]
    __: B4,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BitfieldSpecifier)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[bits = 2]
/// Charging stage reported in `CHGR_STS`
pub enum ChargeStage {
    /// Not charging
    #[default]
    NotCharging,
    /// Low-current pre-charge
    PreCharge,
    /// Constant current fast charge
    FastCharge,
    /// Constant voltage (taper) fast charge
    TaperCharge,
}

#[bitfield(bits = 8)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// `CHGR_STS`: charger state machine status
///
/// Bits 2:1 hold the [`ChargeStage`], bit 3 is set while charging is held off.
pub struct ChgrSts {
    #[skip]
    __: bool,
    #[bits = 2]
    pub charge_stage: ChargeStage,
    pub hold_off: bool,
    #[skip]
    __: B4,
}

#[bitfield(bits = 8)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// `CHGR_RT_STS`: real-time charger status
///
/// Bit 1 is set while charging is inhibited (battery above the inhibit threshold), bit 7 once
/// the termination current has been reached.
pub struct ChgrRtSts {
    #[skip]
    __: bool,
    pub chg_inhibit: bool,
    #[skip]
    __: B5,
    pub tcc_reached: bool,
}

#[bitfield(bits = 8)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// `BAT_IF_RT_STS`: real-time battery interface status
///
/// From bit 0 up: hot hard limit, hot soft limit, cold hard limit, cold soft limit, battery
/// over-voltage, battery low, battery missing and thermistor missing.
pub struct BatIfRtSts {
    pub hot_hard: bool,
    pub hot_soft: bool,
    pub cold_hard: bool,
    pub cold_soft: bool,
    pub bat_ov: bool,
    pub bat_low: bool,
    pub bat_missing: bool,
    pub bat_term_missing: bool,
}

#[bitfield(bits = 8)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// `BAT_IF_CMD_CHG`: charger command register
///
/// Bit 0 turns the OTG (reverse boost) output on.
pub struct CmdChg {
    pub otg_en: bool,
    #[skip]
    __: B7,
}
