use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::config::Config;
use crate::otg::OtgEvent;
use crate::port::RegisterPort;
use crate::registers::Reg;
use crate::status::SupplyState;

/// Regulator notifications buffered before new ones are dropped
pub(crate) const OTG_EVENT_DEPTH: usize = 4;

/// Over-current recovery bookkeeping, only touched inside one critical section at a time
#[derive(Debug, Clone, Copy)]
pub(crate) struct OtgRetry {
    /// Consecutive faults absorbed since the last report
    pub resets: u8,
    /// A reset has been scheduled but the worker has not picked it up yet
    pub pending: bool,
    /// The worker is between disabling and re-enabling the output
    pub in_flight: bool,
}

/// A PMI8994 switch-mode battery charger
///
/// All operations take `&self` so one instance can be shared between the interrupt handlers, the
/// OTG reset worker and the power-supply property queries. Pick `M` to match how those run:
/// `CriticalSectionRawMutex` for a `static` shared across executors, `NoopRawMutex` when
/// everything runs on one executor.
pub struct Charger<M: RawMutex, P> {
    port: Mutex<M, P>,
    pub(crate) config: Config,
    pub(crate) otg_retry: BlockingMutex<M, Cell<OtgRetry>>,
    pub(crate) otg_reset: Signal<M, ()>,
    pub(crate) otg_events: Channel<M, OtgEvent, OTG_EVENT_DEPTH>,
    pub(crate) supply_changed: Signal<M, SupplyState>,
}

impl<M: RawMutex, P> Charger<M, P> {
    /// Create a new `Charger`
    pub const fn new(port: P, config: Config) -> Self {
        Charger {
            port: Mutex::new(port),
            config,
            otg_retry: BlockingMutex::new(Cell::new(OtgRetry {
                resets: 0,
                pending: false,
                in_flight: false,
            })),
            otg_reset: Signal::new(),
            otg_events: Channel::new(),
            supply_changed: Signal::new(),
        }
    }

    /// The configuration this charger was created with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the charger and return the register port
    pub fn release(self) -> P {
        self.port.into_inner()
    }

    fn offset(&self, reg: Reg) -> u16 {
        self.config.base.wrapping_add(reg.to_u16())
    }
}

impl<M: RawMutex, P: RegisterPort> Charger<M, P> {
    pub(crate) async fn read_reg(&self, reg: Reg) -> Result<u8, P::Error> {
        let offset = self.offset(reg);
        self.port.lock().await.read(offset).await
    }

    /// Read a 16-bit value spread over two consecutive registers, low byte first
    pub(crate) async fn read_reg_u16(&self, reg: Reg) -> Result<u16, P::Error> {
        let offset = self.offset(reg);
        let mut buf = [0u8; 2];
        self.port.lock().await.read_bulk(offset, &mut buf).await?;
        Ok(u16::from_le_bytes(buf))
    }

    pub(crate) async fn update_reg(&self, reg: Reg, mask: u8, value: u8) -> Result<(), P::Error> {
        let offset = self.offset(reg);
        self.port.lock().await.write_masked(offset, mask, value).await
    }
}

#[cfg(test)]
mod tests {
    use crate::registers::Reg;
    use crate::testutil::{charger, BASE};

    #[tokio::test]
    async fn registers_are_addressed_from_base() {
        let (chg, port) = charger();
        port.set(Reg::CHGR_STS, 0x5a);

        assert_eq!(chg.read_reg(Reg::CHGR_STS).await.unwrap(), 0x5a);
        assert_eq!(chg.offset(Reg::CHGR_STS), BASE + 0x00e);
    }

    #[tokio::test]
    async fn u16_reads_are_little_endian() {
        let (chg, port) = charger();
        port.set_u16(Reg::USB_CHGPTH_USBID_MSB, 0x0495);

        assert_eq!(chg.read_reg_u16(Reg::USB_CHGPTH_USBID_MSB).await.unwrap(), 0x0495);
    }

    #[tokio::test]
    async fn update_reg_only_touches_masked_bits() {
        let (chg, port) = charger();
        port.set(Reg::BAT_IF_CMD_CHG, 0xf0);

        chg.update_reg(Reg::BAT_IF_CMD_CHG, 0x01, 0x01).await.unwrap();
        assert_eq!(port.get(Reg::BAT_IF_CMD_CHG), 0xf1);
    }

    #[tokio::test]
    async fn release_returns_port() {
        let (chg, port) = charger();
        port.set(Reg::CHGR_STS, 0x12);

        let released = chg.release();
        assert_eq!(released.get(Reg::CHGR_STS), 0x12);
    }
}
