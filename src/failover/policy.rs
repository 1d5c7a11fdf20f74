//! Next-hop selection policy.

use std::net::IpAddr;

use crate::health::state::{ApplianceHealth, ApplianceRole, HealthError};

/// Ordered list of valid next-hop addresses, primary first.
///
/// Non-empty by construction: reconciliation never runs without at least one
/// valid hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextHopList {
    hops: Vec<IpAddr>,
}

impl NextHopList {
    /// The address routes should converge on: the highest-priority valid hop.
    pub fn preferred(&self) -> IpAddr {
        self.hops[0]
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        self.hops.contains(&addr)
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IpAddr> {
        self.hops.iter()
    }
}

impl std::fmt::Display for NextHopList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, hop) in self.hops.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", hop)?;
        }
        Ok(())
    }
}

/// Derive the ordered next-hop list from the probed pair.
///
/// Exactly two appliances must be present; fewer or more signals a
/// topology/configuration mismatch and fails the cycle. The result carries
/// every running appliance's address in fixed priority order, and must not
/// be empty.
pub fn select_next_hops(appliances: &[ApplianceHealth]) -> Result<NextHopList, HealthError> {
    if appliances.len() != 2 {
        return Err(HealthError::WrongApplianceCount(appliances.len()));
    }

    let mut hops = Vec::with_capacity(2);
    for role in [ApplianceRole::Primary, ApplianceRole::Secondary] {
        if let Some(appliance) = appliances.iter().find(|a| a.role == role && a.is_running()) {
            hops.push(appliance.private_ip);
        }
    }

    if hops.is_empty() {
        return Err(HealthError::NoHealthyAppliance);
    }

    Ok(NextHopList { hops })
}
