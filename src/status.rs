//! Charging status, charge type and battery health as seen by a power-supply consumer.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::error::Error;
use crate::port::RegisterPort;
use crate::registers::{BatIfRtSts, ChargeStage, ChgrRtSts, ChgrSts, Reg};
use crate::Charger;

/// Name under which the USB charge path is published
pub const SUPPLY_NAME: &str = "qcom-smbcharger-usb";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// Overall charging status
pub enum Status {
    /// No input power, or input present but the charger is idle
    Discharging,
    /// Charging in either the trickle or fast stage
    Charging,
    /// Termination reached or charging inhibited
    Full,
    /// Input present but charging is held off
    NotCharging,
    /// The charger could not be read
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// Charge stage, collapsed to the classes a power-supply consumer cares about
pub enum ChargeType {
    /// Not charging
    None,
    /// Low-current pre-charge
    Trickle,
    /// Constant current or constant voltage charging
    Fast,
    /// The charger could not be read
    Unknown,
}

impl From<ChargeStage> for ChargeType {
    fn from(stage: ChargeStage) -> Self {
        match stage {
            ChargeStage::NotCharging => ChargeType::None,
            ChargeStage::PreCharge => ChargeType::Trickle,
            ChargeStage::FastCharge | ChargeStage::TaperCharge => ChargeType::Fast,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// Battery temperature health
pub enum Health {
    /// Within all temperature limits
    Good,
    /// Above the hard hot limit
    Overheat,
    /// Above the soft hot limit
    Warm,
    /// Below the hard cold limit
    Cold,
    /// Below the soft cold limit
    Cool,
    /// The battery interface could not be read
    Unknown,
}

impl From<BatIfRtSts> for Health {
    fn from(sts: BatIfRtSts) -> Self {
        if sts.hot_hard() {
            Health::Overheat
        } else if sts.hot_soft() {
            Health::Warm
        } else if sts.cold_hard() {
            Health::Cold
        } else if sts.cold_soft() {
            Health::Cool
        } else {
            Health::Good
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// Properties exposed to the power-supply layer
pub enum Property {
    /// [`Status`]
    Status,
    /// [`ChargeType`]
    ChargeType,
    /// [`Health`]
    Health,
    /// Is the supply attached?
    Present,
    /// Is the supply providing power?
    Online,
}

impl Property {
    /// Every supported property
    pub const ALL: [Property; 5] = [
        Property::Status,
        Property::ChargeType,
        Property::Health,
        Property::Present,
        Property::Online,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[allow(missing_docs)]
/// The value of one [`Property`]
pub enum PropertyValue {
    Status(Status),
    ChargeType(ChargeType),
    Health(Health),
    Present(bool),
    Online(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
/// Every property, sampled by one call to [`Charger::properties`]
pub struct SupplyState {
    /// Overall charging status
    pub status: Status,
    /// Charge stage
    pub charge_type: ChargeType,
    /// Battery temperature health
    pub health: Health,
    /// USB input attached
    pub present: bool,
    /// USB input providing power
    pub online: bool,
}

impl<M: RawMutex, P: RegisterPort> Charger<M, P> {
    /// Get the current charge stage
    pub async fn charge_type(&self) -> ChargeType {
        match self.read_charge_type().await {
            Ok(charge_type) => charge_type,
            Err(Error::Transport(_)) => {
                error!("failed to read CHGR_STS");
                ChargeType::Unknown
            }
            Err(Error::InvalidValue { value, .. }) => {
                error!("invalid charge type in CHGR_STS {:#x}", value);
                ChargeType::Unknown
            }
        }
    }

    async fn read_charge_type(&self) -> Result<ChargeType, Error<P::Error>> {
        let value = self.read_reg(Reg::CHGR_STS).await?;
        let stage = ChgrSts::from_bytes([value])
            .charge_stage_or_err()
            .map_err(|_| Error::InvalidValue {
                reg: Reg::CHGR_STS,
                value,
            })?;
        Ok(stage.into())
    }

    /// Get the overall charging status
    ///
    /// Without input power this is always [`Status::Discharging`] and nothing else is read. Any
    /// failed read after that yields [`Status::Unknown`].
    pub async fn status(&self) -> Status {
        if !self.is_input_present().await {
            return Status::Discharging;
        }

        match self.read_status().await {
            Ok(status) => status,
            Err(_) => Status::Unknown,
        }
    }

    async fn read_status(&self) -> Result<Status, P::Error> {
        let rt_sts = self.read_reg(Reg::CHGR_RT_STS).await.map_err(|e| {
            error!("failed to read CHGR_RT_STS");
            e
        })?;
        let rt_sts = ChgrRtSts::from_bytes([rt_sts]);

        if rt_sts.tcc_reached() || rt_sts.chg_inhibit() {
            return Ok(Status::Full);
        }

        let sts = self.read_reg(Reg::CHGR_STS).await.map_err(|e| {
            error!("failed to read CHGR_STS");
            e
        })?;

        if ChgrSts::from_bytes([sts]).hold_off() {
            return Ok(Status::NotCharging);
        }

        Ok(match self.charge_type().await {
            ChargeType::Unknown => Status::Unknown,
            ChargeType::None => Status::Discharging,
            ChargeType::Trickle | ChargeType::Fast => Status::Charging,
        })
    }

    /// Get the battery temperature health
    pub async fn health(&self) -> Health {
        match self.read_reg(Reg::BAT_IF_RT_STS).await {
            Ok(val) => BatIfRtSts::from_bytes([val]).into(),
            Err(_) => {
                error!("failed to read battery status");
                Health::Unknown
            }
        }
    }

    /// Read one power-supply property
    pub async fn property(&self, property: Property) -> PropertyValue {
        trace!("getting property {}", property);
        match property {
            Property::Status => PropertyValue::Status(self.status().await),
            Property::ChargeType => PropertyValue::ChargeType(self.charge_type().await),
            Property::Health => PropertyValue::Health(self.health().await),
            Property::Present => PropertyValue::Present(self.is_input_present().await),
            Property::Online => PropertyValue::Online(self.is_input_present().await),
        }
    }

    /// Read every power-supply property
    ///
    /// Each property is read independently, so the result is not an atomic snapshot of the
    /// hardware.
    pub async fn properties(&self) -> SupplyState {
        let present = self.is_input_present().await;
        SupplyState {
            status: self.status().await,
            charge_type: self.charge_type().await,
            health: self.health().await,
            present,
            online: present,
        }
    }

    /// Wait for the next supply state published by an interrupt handler
    ///
    /// Only the latest state is kept; states published while nobody is waiting overwrite each
    /// other.
    pub async fn wait_supply_changed(&self) -> SupplyState {
        self.supply_changed.wait().await
    }

    pub(crate) async fn publish_supply_state(&self) -> SupplyState {
        let state = self.properties().await;
        self.supply_changed.signal(state);
        state
    }
}
