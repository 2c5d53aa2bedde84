//! Charger interrupts and their handlers.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::otg::OtgEvent;
use crate::port::RegisterPort;
use crate::registers::USBID_SETTLE_MS;
use crate::Charger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[allow(missing_docs)]
/// A named SMBCHG interrupt
pub enum Event {
    ChgError,
    ChgInhibit,
    ChgPrechgSft,
    ChgCompleteChgSft,
    ChgP2fThr,
    ChgRechgThr,
    ChgTaperThr,
    ChgTccThr,
    BattHot,
    BattWarm,
    BattCold,
    BattCool,
    BattOv,
    BattLow,
    BattMissing,
    BattTermMissing,
    UsbinUv,
    UsbinOv,
    UsbinSrcDet,
    UsbidChange,
    OtgFail,
    OtgOc,
    AiclDone,
    DcinUv,
    DcinOv,
    PowerOk,
    TempShutdown,
    WdogTimeout,
    FlashFail,
    Otst2,
    Otst3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// What the driver does when an [`Event`] fires
pub enum Handler {
    /// Log the error and republish the supply state
    ChargerError,
    /// Republish the supply state
    BatteryTemperature,
    /// Re-check USB input presence and republish the supply state
    UsbSourceDetect,
    /// Wait for the RID conversion, then re-check for an OTG load
    UsbIdChange,
    /// Forward an OTG failure to OTG consumers
    OtgFailure,
    /// Run the over-current retry logic
    OtgOverCurrent,
    /// Nothing; the interrupt need not be requested
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// Result of [`Charger::handle_event`]
pub enum EventOutcome {
    /// The event was acted on
    Handled,
    /// The event has no handler
    Ignored,
}

impl Event {
    /// Every interrupt, in hardware order
    pub const ALL: [Event; 31] = [
        Event::ChgError,
        Event::ChgInhibit,
        Event::ChgPrechgSft,
        Event::ChgCompleteChgSft,
        Event::ChgP2fThr,
        Event::ChgRechgThr,
        Event::ChgTaperThr,
        Event::ChgTccThr,
        Event::BattHot,
        Event::BattWarm,
        Event::BattCold,
        Event::BattCool,
        Event::BattOv,
        Event::BattLow,
        Event::BattMissing,
        Event::BattTermMissing,
        Event::UsbinUv,
        Event::UsbinOv,
        Event::UsbinSrcDet,
        Event::UsbidChange,
        Event::OtgFail,
        Event::OtgOc,
        Event::AiclDone,
        Event::DcinUv,
        Event::DcinOv,
        Event::PowerOk,
        Event::TempShutdown,
        Event::WdogTimeout,
        Event::FlashFail,
        Event::Otst2,
        Event::Otst3,
    ];

    /// The interrupt name used in the device tree
    pub const fn name(self) -> &'static str {
        match self {
            Event::ChgError => "chg-error",
            Event::ChgInhibit => "chg-inhibit",
            Event::ChgPrechgSft => "chg-prechg-sft",
            Event::ChgCompleteChgSft => "chg-complete-chg-sft",
            Event::ChgP2fThr => "chg-p2f-thr",
            Event::ChgRechgThr => "chg-rechg-thr",
            Event::ChgTaperThr => "chg-taper-thr",
            Event::ChgTccThr => "chg-tcc-thr",
            Event::BattHot => "batt-hot",
            Event::BattWarm => "batt-warm",
            Event::BattCold => "batt-cold",
            Event::BattCool => "batt-cool",
            Event::BattOv => "batt-ov",
            Event::BattLow => "batt-low",
            Event::BattMissing => "batt-missing",
            Event::BattTermMissing => "batt-term-missing",
            Event::UsbinUv => "usbin-uv",
            Event::UsbinOv => "usbin-ov",
            Event::UsbinSrcDet => "usbin-src-det",
            Event::UsbidChange => "usbid-change",
            Event::OtgFail => "otg-fail",
            Event::OtgOc => "otg-oc",
            Event::AiclDone => "aicl-done",
            Event::DcinUv => "dcin-uv",
            Event::DcinOv => "dcin-ov",
            Event::PowerOk => "power-ok",
            Event::TempShutdown => "temp-shutdown",
            Event::WdogTimeout => "wdog-timeout",
            Event::FlashFail => "flash-fail",
            Event::Otst2 => "otst2",
            Event::Otst3 => "otst3",
        }
    }

    /// Look an interrupt up by its device tree name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }

    /// The handler for this interrupt
    pub const fn handler(self) -> Handler {
        match self {
            Event::ChgError => Handler::ChargerError,
            Event::BattHot | Event::BattWarm | Event::BattCold | Event::BattCool => {
                Handler::BatteryTemperature
            }
            Event::UsbinSrcDet => Handler::UsbSourceDetect,
            Event::UsbidChange => Handler::UsbIdChange,
            Event::OtgFail => Handler::OtgFailure,
            Event::OtgOc => Handler::OtgOverCurrent,
            _ => Handler::Ignored,
        }
    }

    /// Does this interrupt need to be requested?
    pub const fn is_handled(self) -> bool {
        !matches!(self.handler(), Handler::Ignored)
    }
}

impl<M: RawMutex, P: RegisterPort> Charger<M, P> {
    /// Handle one interrupt
    ///
    /// Returns without waiting for an over-current reset to finish; that is left to
    /// [`Charger::run_otg_reset`]. A USBID change waits `delay` for the RID conversion first.
    pub async fn handle_event<D: DelayNs>(&self, event: Event, delay: &mut D) -> EventOutcome {
        match event.handler() {
            Handler::ChargerError => {
                // TODO: classify charger errors once the fault registers are decoded
                error!("charger error");
                self.publish_supply_state().await;
            }
            Handler::BatteryTemperature => {
                self.publish_supply_state().await;
            }
            Handler::UsbSourceDetect => {
                let state = self.publish_supply_state().await;
                debug!("USB {}present", if state.present { "" } else { "not " });
            }
            Handler::UsbIdChange => {
                delay.delay_ms(USBID_SETTLE_MS).await;
                let otg_present = self.is_reverse_power_present().await;
                debug!("OTG {}present", if otg_present { "" } else { "not " });
            }
            Handler::OtgFailure => {
                error!("OTG failure");
                self.notify_otg(OtgEvent::Failure);
            }
            Handler::OtgOverCurrent => self.otg_over_current(),
            Handler::Ignored => {
                trace!("ignoring {}", event.name());
                return EventOutcome::Ignored;
            }
        }

        EventOutcome::Handled
    }
}
