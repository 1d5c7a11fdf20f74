//! A discovered route under management.

use std::net::IpAddr;

use crate::cloud::api::RouteTarget;
use crate::cloud::types::Route;

/// One tagged route, read fresh this cycle. Identity is the target triple
/// (subscription, route table, route name); nothing is cached across cycles.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub target: RouteTarget,
    pub route: Route,
}

impl RouteRecord {
    /// `subscription/table/route`, the form every log line uses.
    pub fn qualified_name(&self) -> String {
        self.target.to_string()
    }

    /// The route's current next hop, when it parses as an address.
    ///
    /// A missing or malformed address compares as valid-nowhere, so the
    /// reconciler will rewrite it.
    pub fn current_next_hop(&self) -> Option<IpAddr> {
        self.route
            .properties
            .next_hop_ip_address
            .as_deref()
            .and_then(|addr| addr.parse().ok())
    }
}
