use serde::{Deserialize, Serialize};

use crate::day_count::DayCountConvention;
use crate::decimal::{DecimalMath, MAX_SCALE, MONEY_SCALE};
use crate::errors::{Result, ScheduleError};

/// scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// scale bound into the arithmetic component for unscaled operations
    pub default_scale: u32,
    /// scale of money amounts (month accruals, allocated amounts, balances)
    pub amount_scale: u32,
    /// scale of allocation proportions
    pub proportion_scale: u32,
    /// day count used when accruing interest per month
    pub interest_convention: DayCountConvention,
    /// day count used when weighting allocation intervals
    pub allocation_convention: DayCountConvention,
    /// days per year when turning an annual rate into a daily one
    pub year_basis: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_scale: 6,
            amount_scale: MONEY_SCALE,
            proportion_scale: 6,
            interest_convention: DayCountConvention::Thirty360,
            allocation_convention: DayCountConvention::Thirty360,
            year_basis: 360,
        }
    }
}

impl SchedulerConfig {
    /// parse from json, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SchedulerConfig = serde_json::from_str(json)
            .map_err(|e| ScheduleError::parse("scheduler config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ScheduleError::invalid_input(format!("cannot serialize config: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        for (name, scale) in [
            ("default_scale", self.default_scale),
            ("amount_scale", self.amount_scale),
            ("proportion_scale", self.proportion_scale),
        ] {
            if scale > MAX_SCALE {
                return Err(ScheduleError::invalid_input(format!(
                    "{} must be at most {}, got {}",
                    name, MAX_SCALE, scale
                )));
            }
        }
        if self.year_basis == 0 {
            return Err(ScheduleError::invalid_input("year_basis must be positive"));
        }
        Ok(())
    }

    pub fn with_allocation_convention(mut self, convention: DayCountConvention) -> Self {
        self.allocation_convention = convention;
        self
    }

    pub fn with_interest_convention(mut self, convention: DayCountConvention) -> Self {
        self.interest_convention = convention;
        self
    }

    pub fn math(&self) -> DecimalMath {
        DecimalMath::new(self.default_scale)
    }
}
