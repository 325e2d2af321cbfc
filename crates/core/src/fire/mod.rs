//! Fire-bearing objects and their coordination
//!
//! - [`FireUnit`]: energy/damage model and state machine of one object
//! - [`FireGroup`]: siblings forming one logical object on fire
//! - [`EnergyBalancer`]: energy redistribution inside a group
//! - [`FireReceiver`]: either of the above as an energy target

pub mod balancer;
pub mod cooling;
pub mod group;
pub mod receiver;
pub mod unit;

pub use balancer::{BalancePlan, BalanceSlot, EnergyBalancer};
pub use cooling::{CoolingEnergy, CoolingSources};
pub use group::{FireGroup, GroupStateCheck, UnitArena};
pub use receiver::FireReceiver;
pub use unit::{FireUnit, PresentationDelta};
