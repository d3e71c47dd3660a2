use std::collections::BTreeMap;
use std::env;

use strum::IntoEnumIterator;

use crate::model::leave_request::LeaveType;

/// Annual day allowance per leave type.
///
/// Defaults follow company policy; each type can be overridden through a
/// `LEAVE_ENTITLEMENT_<TYPE>` environment variable (whole days).
#[derive(Debug, Clone, PartialEq)]
pub struct Entitlements {
    days: BTreeMap<LeaveType, i64>,
}

impl Default for Entitlements {
    fn default() -> Self {
        let days = BTreeMap::from([
            (LeaveType::Annual, 21),
            (LeaveType::Sick, 10),
            (LeaveType::Personal, 5),
            (LeaveType::Maternity, 90),
            (LeaveType::Paternity, 14),
            (LeaveType::Emergency, 3),
        ]);
        Self { days }
    }
}

impl Entitlements {
    pub fn from_env() -> Self {
        let mut entitlements = Self::default();
        for leave_type in LeaveType::iter() {
            let var = format!("LEAVE_ENTITLEMENT_{}", leave_type);
            if let Ok(value) = env::var(&var) {
                let days = value
                    .parse()
                    .unwrap_or_else(|_| panic!("{} must be a whole number of days", var));
                entitlements.days.insert(leave_type, days);
            }
        }
        entitlements
    }

    pub fn days(&self, leave_type: LeaveType) -> i64 {
        // Every variant is present; the map is total by construction.
        self.days.get(&leave_type).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LeaveType, i64)> + '_ {
        self.days.iter().map(|(t, d)| (*t, *d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let e = Entitlements::default();
        assert_eq!(e.days(LeaveType::Annual), 21);
        assert_eq!(e.days(LeaveType::Sick), 10);
        assert_eq!(e.days(LeaveType::Personal), 5);
        assert_eq!(e.days(LeaveType::Maternity), 90);
        assert_eq!(e.days(LeaveType::Paternity), 14);
        assert_eq!(e.days(LeaveType::Emergency), 3);
    }

    #[test]
    fn every_leave_type_has_an_entitlement() {
        let e = Entitlements::default();
        assert_eq!(e.iter().count(), LeaveType::iter().count());
    }
}
