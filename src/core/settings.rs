use super::error::EngineError;
use super::money::{Money, Percentage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-user rates, passed into every computation that needs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    /// Social contribution rate applied to cash collected
    pub urssaf_rate: Percentage,
    /// Flat rate used for the monthly income tax estimate
    pub estimated_tax_rate: Percentage,
    /// Flat allowance deducted from revenue before income tax
    pub revenue_deduction_rate: Percentage,
    pub monthly_salary: Money,
}

impl Settings {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.monthly_salary.is_negative() {
            return Err(EngineError::NegativeSalary {
                salary: self.monthly_salary,
            });
        }
        Ok(())
    }
}
