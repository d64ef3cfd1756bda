//! Business logic services

pub mod circulation;
pub mod clock;
pub mod policy;
pub mod seed;
pub mod stats;
pub mod workflow;

use std::sync::Arc;

use crate::{config::CirculationConfig, error::AppResult};

use self::{
    circulation::{CirculationDesk, CirculationService},
    clock::{Clock, SystemClock},
    policy::LoanPolicy,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub circulation: CirculationService,
}

impl Services {
    /// Create all services from configuration, on the wall clock
    pub fn new(config: &CirculationConfig) -> AppResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Fails with `Validation` when the circulation settings are out of range
    pub fn with_clock(config: &CirculationConfig, clock: Arc<dyn Clock>) -> AppResult<Self> {
        let mut desk = CirculationDesk::new(LoanPolicy::try_from(config)?, clock);
        if config.seed_demo_data {
            seed::seed_demo_catalog(&mut desk)?;
        }
        Ok(Self::from_desk(desk))
    }

    pub fn from_desk(desk: CirculationDesk) -> Self {
        Self {
            circulation: CirculationService::new(desk),
        }
    }
}
