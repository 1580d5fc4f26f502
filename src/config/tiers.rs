//! Subscription tier table.
//!
//! Every tier pairs a fixed monthly fee with a commission rate. The built-in
//! table must stay identical across deployments for fee parity with already
//! recorded sales; a TOML override exists for test environments and future
//! price changes, loaded the same way the rest of the configuration is.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// A named subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Entry plan: $29/month, 8% commission
    Starter,
    /// Mid plan: $79/month, 6% commission
    Professional,
    /// Top plan: $199/month, 4% commission
    Enterprise,
    /// Early-adopter plan: no monthly fee, 5% commission
    Founders,
}

impl Tier {
    /// All tiers, in pricing order.
    pub const ALL: [Self; 4] = [
        Self::Starter,
        Self::Professional,
        Self::Enterprise,
        Self::Founders,
    ];

    /// The canonical lowercase name stored in client rows.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Professional => "professional",
            Self::Enterprise => "enterprise",
            Self::Founders => "founders",
        }
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "starter" => Ok(Self::Starter),
            "professional" => Ok(Self::Professional),
            "enterprise" => Ok(Self::Enterprise),
            "founders" => Ok(Self::Founders),
            other => Err(Error::InvalidTier {
                tier: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pricing for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TierPricing {
    /// Monthly subscription fee in dollars
    pub monthly_fee: f64,
    /// Commission percentage applied to reported sales
    pub commission_rate: f64,
}

/// The full tier table: pricing for each of the four tiers.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TierTable {
    /// Pricing for the starter tier
    pub starter: TierPricing,
    /// Pricing for the professional tier
    pub professional: TierPricing,
    /// Pricing for the enterprise tier
    pub enterprise: TierPricing,
    /// Pricing for the founders tier
    pub founders: TierPricing,
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            starter: TierPricing {
                monthly_fee: 29.0,
                commission_rate: 8.0,
            },
            professional: TierPricing {
                monthly_fee: 79.0,
                commission_rate: 6.0,
            },
            enterprise: TierPricing {
                monthly_fee: 199.0,
                commission_rate: 4.0,
            },
            founders: TierPricing {
                monthly_fee: 0.0,
                commission_rate: 5.0,
            },
        }
    }
}

impl TierTable {
    /// Looks up pricing for a tier.
    #[must_use]
    pub const fn pricing(&self, tier: Tier) -> TierPricing {
        match tier {
            Tier::Starter => self.starter,
            Tier::Professional => self.professional,
            Tier::Enterprise => self.enterprise,
            Tier::Founders => self.founders,
        }
    }

    /// Loads a tier table override from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the TOML is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
            message: format!("Failed to read tier table: {e}"),
        })?;

        toml::from_str(&contents).map_err(|e| Error::Config {
            message: format!("Failed to parse tier table: {e}"),
        })
    }
}

/// Returns the built-in tier table.
#[must_use]
pub fn default_table() -> TierTable {
    TierTable::default()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_builtin_table_values() {
        let table = default_table();
        assert_eq!(table.pricing(Tier::Starter).monthly_fee, 29.0);
        assert_eq!(table.pricing(Tier::Starter).commission_rate, 8.0);
        assert_eq!(table.pricing(Tier::Professional).monthly_fee, 79.0);
        assert_eq!(table.pricing(Tier::Professional).commission_rate, 6.0);
        assert_eq!(table.pricing(Tier::Enterprise).monthly_fee, 199.0);
        assert_eq!(table.pricing(Tier::Enterprise).commission_rate, 4.0);
        assert_eq!(table.pricing(Tier::Founders).monthly_fee, 0.0);
        assert_eq!(table.pricing(Tier::Founders).commission_rate, 5.0);
    }

    #[test]
    fn test_tier_round_trip() {
        for tier in Tier::ALL {
            assert_eq!(tier.as_str().parse::<Tier>().unwrap(), tier);
        }
    }

    #[test]
    fn test_unknown_tier_rejected() {
        let err = "platinum".parse::<Tier>().unwrap_err();
        assert!(matches!(err, Error::InvalidTier { tier } if tier == "platinum"));
    }

    #[test]
    fn test_parse_override_table() {
        let toml_str = r#"
            [starter]
            monthly_fee = 19.0
            commission_rate = 9.0

            [professional]
            monthly_fee = 79.0
            commission_rate = 6.0

            [enterprise]
            monthly_fee = 199.0
            commission_rate = 4.0

            [founders]
            monthly_fee = 0.0
            commission_rate = 5.0
        "#;
        let table: TierTable = toml::from_str(toml_str).unwrap();
        assert_eq!(table.pricing(Tier::Starter).monthly_fee, 19.0);
        assert_eq!(table.pricing(Tier::Starter).commission_rate, 9.0);
    }
}
