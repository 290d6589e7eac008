//! Resource Sufficiency Checker
//!
//! Pure comparison of a freshly read balance against the required input
//! amount. Strictly greater-than: an exact-equal balance counts as
//! insufficient.
//!
//! Author: AI-Generated
//! Created: 2026-07-23

use alloy::primitives::U256;

/// Outcome of the balance check. `shortfall` is the remediation delta to
/// top up (zero at exact equality, where the boolean still says no).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SufficiencyReport {
    pub sufficient: bool,
    pub shortfall: U256,
}

pub fn check_sufficiency(balance: U256, required: U256) -> SufficiencyReport {
    SufficiencyReport {
        sufficient: balance > required,
        shortfall: required.saturating_sub(balance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_greater_is_sufficient() {
        let report = check_sufficiency(U256::from(101u64), U256::from(100u64));
        assert!(report.sufficient);
        assert_eq!(report.shortfall, U256::ZERO);
    }

    #[test]
    fn test_equal_balance_is_insufficient() {
        let report = check_sufficiency(U256::from(100u64), U256::from(100u64));
        assert!(!report.sufficient);
        assert_eq!(report.shortfall, U256::ZERO);
    }

    #[test]
    fn test_shortfall_reports_the_delta() {
        let report = check_sufficiency(U256::from(30u64), U256::from(100u64));
        assert!(!report.sufficient);
        assert_eq!(report.shortfall, U256::from(70u64));
    }
}
