//! OTG VBUS output control and over-current recovery.
//!
//! Inrush current of many legitimate OTG loads trips the PMI8994 over-current protection. An
//! over-current interrupt therefore first schedules a reset of the output (off, settle, back on if
//! the load is still attached) and only reports [`OtgEvent::OverCurrent`] once the retry budget
//! from [`Config`](crate::Config) is spent. Resets are run by a single worker per charger, see
//! [`Charger::run_otg_reset`].

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal_async::delay::DelayNs;

use crate::charger::OtgRetry;
use crate::error::Error;
use crate::port::RegisterPort;
use crate::registers::{CmdChg, Reg, OTG_EN_BIT, OTG_RESET_SETTLE_MS};
use crate::Charger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// Notifications for consumers of the OTG output
pub enum OtgEvent {
    /// Over-current persisted through every automatic reset
    OverCurrent,
    /// The charger reported an OTG failure
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// State of the OTG output
pub enum OtgState {
    /// Output off
    Disabled,
    /// Output on
    Enabled,
    /// Recovering from the given number of consecutive over-current faults
    FaultRetrying(u8),
}

impl<M: RawMutex, P: RegisterPort> Charger<M, P> {
    /// Turn the OTG VBUS output on
    pub async fn enable_otg(&self) -> Result<(), Error<P::Error>> {
        debug!("enabling OTG VBUS regulator");
        self.update_reg(Reg::BAT_IF_CMD_CHG, OTG_EN_BIT, OTG_EN_BIT)
            .await
            .map_err(|e| {
                error!("failed to enable OTG regulator");
                Error::Transport(e)
            })
    }

    /// Turn the OTG VBUS output off
    pub async fn disable_otg(&self) -> Result<(), Error<P::Error>> {
        debug!("disabling OTG VBUS regulator");
        self.update_reg(Reg::BAT_IF_CMD_CHG, OTG_EN_BIT, 0)
            .await
            .map_err(|e| {
                error!("failed to disable OTG regulator");
                Error::Transport(e)
            })
    }

    /// Is the OTG VBUS output on?
    ///
    /// A failed read reports `false`; callers should treat that as "unknown, assume off".
    pub async fn is_otg_enabled(&self) -> bool {
        match self.read_reg(Reg::BAT_IF_CMD_CHG).await {
            Ok(val) => CmdChg::from_bytes([val]).otg_en(),
            Err(_) => {
                error!("failed to read CMD_CHG");
                false
            }
        }
    }

    /// Consecutive over-current faults absorbed since the last report
    pub fn otg_resets(&self) -> u8 {
        self.otg_retry.lock(|retry| retry.get().resets)
    }

    /// Get the state of the OTG output
    ///
    /// `FaultRetrying` is reported while a reset is scheduled or running. Otherwise the state is
    /// read back from the enable bit.
    pub async fn otg_state(&self) -> OtgState {
        let retry = self.otg_retry.lock(Cell::get);
        if (retry.pending || retry.in_flight) && retry.resets > 0 {
            return OtgState::FaultRetrying(retry.resets);
        }

        if self.is_otg_enabled().await {
            OtgState::Enabled
        } else {
            OtgState::Disabled
        }
    }

    fn update_otg_retry<R>(&self, f: impl FnOnce(&mut OtgRetry) -> R) -> R {
        self.otg_retry.lock(|cell| {
            let mut retry = cell.get();
            let r = f(&mut retry);
            cell.set(retry);
            r
        })
    }

    /// Wait for the next notification for OTG consumers
    pub async fn wait_otg_event(&self) -> OtgEvent {
        self.otg_events.receive().await
    }

    /// Take a pending notification for OTG consumers, if any
    pub fn try_otg_event(&self) -> Option<OtgEvent> {
        self.otg_events.try_receive().ok()
    }

    /// Run the OTG reset worker
    ///
    /// Must be polled for over-current recovery to work. Run exactly one worker per charger; a
    /// fault that arrives while a reset is in progress is handled after it completes.
    pub async fn run_otg_reset<D: DelayNs>(&self, mut delay: D) -> ! {
        loop {
            self.otg_reset_once(&mut delay).await;
        }
    }

    /// Wait for one scheduled OTG reset and carry it out
    ///
    /// If the load is gone once the output has settled, the output stays off and the fault count
    /// is cleared. That includes faults counted while this reset was sleeping, which came from the
    /// same load. A reset they scheduled still runs and finds the load gone as well.
    pub async fn otg_reset_once<D: DelayNs>(&self, delay: &mut D) {
        self.otg_reset.wait().await;
        self.update_otg_retry(|retry| {
            retry.pending = false;
            retry.in_flight = true;
        });

        self.reset_otg(delay).await;

        self.update_otg_retry(|retry| retry.in_flight = false);
    }

    async fn reset_otg<D: DelayNs>(&self, delay: &mut D) {
        debug!("resetting OTG VBUS regulator");

        if self
            .update_reg(Reg::BAT_IF_CMD_CHG, OTG_EN_BIT, 0)
            .await
            .is_err()
        {
            error!("failed to disable OTG regulator");
            return;
        }

        delay.delay_ms(OTG_RESET_SETTLE_MS).await;

        // Only turn the output back on if the load is still there
        if !self.is_reverse_power_present().await {
            debug!("OTG load removed during reset");
            self.update_otg_retry(|retry| retry.resets = 0);
            return;
        }

        if self
            .update_reg(Reg::BAT_IF_CMD_CHG, OTG_EN_BIT, OTG_EN_BIT)
            .await
            .is_err()
        {
            error!("failed to enable OTG regulator");
        }
    }

    /// Over-current interrupt: schedule a reset while the budget lasts, then report
    pub(crate) fn otg_over_current(&self) {
        let budget = self.config.otg_reset_retries;
        let schedule = self.update_otg_retry(|retry| {
            if retry.resets < budget {
                retry.resets += 1;
                retry.pending = true;
                true
            } else {
                retry.resets = 0;
                false
            }
        });

        if schedule {
            self.otg_reset.signal(());
            return;
        }

        warn!("OTG over-current");
        self.notify_otg(OtgEvent::OverCurrent);
    }

    pub(crate) fn notify_otg(&self, event: OtgEvent) {
        if self.otg_events.try_send(event).is_err() {
            warn!("OTG event queue full, dropping {}", event);
        }
    }
}
