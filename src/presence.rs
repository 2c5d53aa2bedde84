//! Input power and OTG load detection.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::port::RegisterPort;
use crate::registers::{IdevSts, Reg, RidSts, UsbinInputSts, UsbinRtSts, USBID_GND_THRESHOLD};
use crate::Charger;

impl<M: RawMutex, P: RegisterPort> Charger<M, P> {
    /// Is USB input power attached and usable?
    ///
    /// An over-voltage input is treated as absent. Bus errors are logged and reported as `false`.
    pub async fn is_input_present(&self) -> bool {
        let rt_sts = match self.read_reg(Reg::USB_CHGPTH_RT_STS).await {
            Ok(val) => UsbinRtSts::from_bytes([val]),
            Err(_) => {
                error!("failed to read USB_CHGPTH_RT_STS");
                return false;
            }
        };

        if !rt_sts.usbin_src_det() || rt_sts.usbin_ov() {
            return false;
        }

        match self.read_reg(Reg::USB_CHGPTH_INPUT_STS).await {
            Ok(val) => UsbinInputSts::from_bytes([val]).any_input(),
            Err(_) => {
                error!("failed to read USB_CHGPTH_INPUT_STS");
                false
            }
        }
    }

    /// Is an OTG (reverse power) load attached?
    ///
    /// The ID pin must be classified as grounded, its ADC reading must be at or below
    /// [`USBID_GND_THRESHOLD`] and the RID status must agree. Each check is only made once the
    /// previous one has passed. Bus errors are logged and reported as `false`.
    pub async fn is_reverse_power_present(&self) -> bool {
        let idev_sts = match self.read_reg(Reg::MISC_IDEV_STS).await {
            Ok(val) => IdevSts::from_bytes([val]),
            Err(_) => {
                error!("failed to read MISC_IDEV_STS");
                return false;
            }
        };

        if idev_sts.fmb_sts() != 0 {
            debug!("IDEV_STS = {:#x}, not ground", idev_sts.into_bytes()[0]);
            return false;
        }

        let usbid = match self.read_reg_u16(Reg::USB_CHGPTH_USBID_MSB).await {
            Ok(val) => val,
            Err(_) => {
                error!("failed to read USB_CHGPTH_USBID");
                return false;
            }
        };

        if usbid > USBID_GND_THRESHOLD {
            debug!("USBID = {:#x}, too high to be ground", usbid);
            return false;
        }

        let rid_sts = match self.read_reg(Reg::USB_CHGPTH_RID_STS).await {
            Ok(val) => RidSts::from_bytes([val]),
            Err(_) => {
                error!("failed to read USB_CHGPTH_RID_STS");
                return false;
            }
        };

        debug!("RID_STS = {:#x}", rid_sts.into_bytes()[0]);

        rid_sts.rid() == 0
    }
}
