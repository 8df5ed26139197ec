//! Auxiliary payload generators
//!
//! Each generator is an independent function of (clock reading, random
//! source, profile). Nothing links one call's records to another's.

pub mod blocks;
pub mod health;
pub mod status;
pub mod transactions;
pub mod validators;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clock::Reading;

pub use blocks::{generate_blocks, BlockList, BlockRecord};
pub use health::{generate_health, HealthReport};
pub use status::{generate_status, NetworkStatus};
pub use transactions::{
    generate_transactions, submit_transaction, SubmitTransaction, TransactionList,
    TransactionReceipt, TransactionRecord,
};
pub use validators::{generate_validators, ValidatorRecord, ValidatorSet};

/// Identity this process reports in status payloads and metadata.
#[derive(Debug, Clone, Serialize)]
pub struct NodeIdentity {
    pub node_id: String,
    pub region: String,
    pub started_at: DateTime<Utc>,
}

impl NodeIdentity {
    pub fn new(region: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            node_id: format!("triunity-node-{}", uuid::Uuid::new_v4().simple()),
            region: region.into(),
            started_at,
        }
    }

    pub fn uptime_secs(&self, reading: &Reading) -> u64 {
        let started = self.started_at.timestamp_millis();
        (reading.now_ms.saturating_sub(started)).max(0) as u64 / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn uptime_never_negative() {
        let start = Utc.timestamp_millis_opt(1_700_000_010_000).unwrap();
        let node = NodeIdentity::new("local", start);
        let before = Reading::new(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        let after = Reading::new(Utc.timestamp_millis_opt(1_700_000_070_500).unwrap());
        assert_eq!(node.uptime_secs(&before), 0);
        assert_eq!(node.uptime_secs(&after), 60);
        assert!(node.node_id.starts_with("triunity-node-"));
    }
}
