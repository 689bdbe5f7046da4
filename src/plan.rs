use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;
use serde::{Serialize, Deserialize};

use crate::error::AppError;

/// Weekly training frequency sold by the CT. The wire value is the literal
/// string the API stores ("1x", "2x", "3x").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanId {
    #[serde(rename = "1x")]
    Weekly1,
    #[serde(rename = "2x")]
    Weekly2,
    #[serde(rename = "3x")]
    Weekly3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalogEntry {
    pub id: PlanId,
    pub weekly_sessions: usize,
    pub base_price: BigDecimal,
}

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentGroupType {
    Individual=0,
    Family=1,
}

impl PlanId {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanId::Weekly1 => "1x",
            PlanId::Weekly2 => "2x",
            PlanId::Weekly3 => "3x",
        }
    }

    pub fn weekly_sessions(&self) -> usize {
        match self {
            PlanId::Weekly1 => 1,
            PlanId::Weekly2 => 2,
            PlanId::Weekly3 => 3,
        }
    }

    /// Plans below 3x expose the explicit day picker; 3x accepts any of the
    /// CT's operating days implicitly.
    pub fn requires_day_selection(&self) -> bool {
        !matches!(self, PlanId::Weekly3)
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1x" => Ok(PlanId::Weekly1),
            "2x" => Ok(PlanId::Weekly2),
            "3x" => Ok(PlanId::Weekly3),
            other => Err(AppError::UnknownPlan(other.to_string())),
        }
    }
}

fn brl(cents: i64) -> BigDecimal {
    BigDecimal::new(cents.into(), 2)
}

static CATALOG: Lazy<[PlanCatalogEntry; 3]> = Lazy::new(|| {
    [
        PlanCatalogEntry { id: PlanId::Weekly1, weekly_sessions: 1, base_price: brl(11000) },
        PlanCatalogEntry { id: PlanId::Weekly2, weekly_sessions: 2, base_price: brl(13000) },
        PlanCatalogEntry { id: PlanId::Weekly3, weekly_sessions: 3, base_price: brl(15000) },
    ]
});

pub fn lookup(plan: PlanId) -> &'static PlanCatalogEntry {
    match plan {
        PlanId::Weekly1 => &CATALOG[0],
        PlanId::Weekly2 => &CATALOG[1],
        PlanId::Weekly3 => &CATALOG[2],
    }
}

/// String entry point for values coming off the wire or a text field.
pub fn lookup_str(plan: &str) -> crate::error::Result<&'static PlanCatalogEntry> {
    Ok(lookup(plan.parse::<PlanId>()?))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_sessions_match_numeric_prefix() {
        for entry in CATALOG.iter() {
            let prefix: usize = entry.id.as_str()[..1].parse().unwrap();
            assert_eq!(entry.weekly_sessions, prefix);
            assert_eq!(lookup(entry.id).weekly_sessions, prefix);
        }
    }

    #[test]
    fn base_prices() {
        assert_eq!(lookup(PlanId::Weekly1).base_price, brl(11000));
        assert_eq!(lookup(PlanId::Weekly2).base_price, brl(13000));
        assert_eq!(lookup(PlanId::Weekly3).base_price, brl(15000));
    }

    #[test]
    fn unknown_plan_is_rejected() {
        for bad in ["4x", "0x", "", "2X", "semanal"] {
            assert!(lookup_str(bad).is_err(), "{bad:?} should not resolve");
        }
    }

    #[test]
    fn wire_rename_round_trip() {
        let json = serde_json::to_string(&PlanId::Weekly2).unwrap();
        assert_eq!(json, "\"2x\"");
        let back: PlanId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PlanId::Weekly2);
    }
}
