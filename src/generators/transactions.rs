use serde::{Deserialize, Serialize};

use crate::clock::Reading;
use crate::entropy::RandomSource;
use crate::telemetry::metrics::block_height;
use crate::telemetry::profile::{round_to, SynthProfile};
use crate::telemetry::{SynthError, Variation};

pub const TRANSACTION_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Pending,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub fee: f64,
    pub status: TransactionStatus,
    pub block_height: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionList {
    pub total_transactions: u64,
    pub pending_transactions: u64,
    pub transactions: Vec<TransactionRecord>,
}

pub fn generate_transactions<R: RandomSource + ?Sized>(
    reading: &Reading,
    rng: &mut R,
    profile: &SynthProfile,
) -> Result<TransactionList, SynthError> {
    let variation = Variation::sample(reading, rng, profile)?;
    let height = block_height(profile, reading.now_ms);
    let now_ms = reading.now_ms.max(0) as u64;

    let transactions = (0..TRANSACTION_PAGE_SIZE)
        .map(|_| {
            let roll = rng.uniform();
            let status = if roll < 0.90 {
                TransactionStatus::Success
            } else if roll < 0.97 {
                TransactionStatus::Pending
            } else {
                TransactionStatus::Failed
            };
            // pending transactions are not in a block yet
            let depth = rng.between(0.0, 50.0) as u64;
            let block_height = match status {
                TransactionStatus::Pending => height + 1,
                _ => height.saturating_sub(depth),
            };
            TransactionRecord {
                hash: rng.hash(),
                from: rng.address(),
                to: rng.address(),
                amount: round_to(rng.between(0.0, 1_000.0), 4),
                fee: round_to(rng.between(0.0001, 0.01), 6),
                status,
                block_height,
                timestamp: now_ms.saturating_sub(rng.between(0.0, 300_000.0) as u64),
            }
        })
        .collect();

    Ok(TransactionList {
        total_transactions: profile.fields.total_transactions.integer(variation.value),
        pending_transactions: profile.fields.mempool_size.integer(variation.value),
        transactions,
    })
}

/// Body of `POST /api/transactions`. Every field is optional; missing
/// addresses are generated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitTransaction {
    pub from: Option<String>,
    pub to: Option<String>,
    pub amount: Option<f64>,
}

impl SubmitTransaction {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(amount) = self.amount {
            if !amount.is_finite() || amount <= 0.0 {
                return Err("amount must be a positive number".to_string());
            }
        }
        for (name, addr) in [("from", &self.from), ("to", &self.to)] {
            if let Some(addr) = addr {
                let hex = addr.strip_prefix("0x").unwrap_or(addr);
                if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(format!("{name} must be a hex address"));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionReceipt {
    pub hash: String,
    pub status: TransactionStatus,
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub submitted_at: u64,
    pub estimated_confirmation_ms: u64,
}

/// Fabricates a pending receipt; nothing is queued anywhere.
pub fn submit_transaction<R: RandomSource + ?Sized>(
    request: SubmitTransaction,
    reading: &Reading,
    rng: &mut R,
    profile: &SynthProfile,
) -> Result<TransactionReceipt, SynthError> {
    let variation = Variation::sample(reading, rng, profile)?;
    let finality = profile.fields.finality_time_ms.integer(variation.value);
    let amount = match request.amount {
        Some(amount) => round_to(amount, 4),
        None => round_to(rng.between(0.0, 1_000.0), 4),
    };
    Ok(TransactionReceipt {
        hash: rng.hash(),
        status: TransactionStatus::Pending,
        from: request.from.unwrap_or_else(|| rng.address()),
        to: request.to.unwrap_or_else(|| rng.address()),
        amount,
        submitted_at: reading.now_ms.max(0) as u64,
        estimated_confirmation_ms: finality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::profile::EXTENDED;
    use chrono::{TimeZone, Utc};
    use rand::{rngs::StdRng, SeedableRng};

    fn reading() -> Reading {
        Reading::new(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
    }

    #[test]
    fn twenty_transactions() {
        let list = generate_transactions(&reading(), &mut StdRng::seed_from_u64(1), &EXTENDED).unwrap();
        assert_eq!(list.transactions.len(), 20);
        let head = block_height(&EXTENDED, reading().now_ms);
        for tx in &list.transactions {
            assert_eq!(tx.hash.len(), 66);
            assert_ne!(tx.from, tx.to);
            assert!(tx.amount >= 0.0 && tx.amount <= 1_000.0);
            match tx.status {
                TransactionStatus::Pending => assert_eq!(tx.block_height, head + 1),
                _ => assert!(tx.block_height <= head),
            }
        }
    }

    #[test]
    fn submission_keeps_caller_fields() {
        let req = SubmitTransaction {
            from: Some("0xabc123".into()),
            to: None,
            amount: Some(12.345678),
        };
        req.validate().unwrap();
        let receipt = submit_transaction(req, &reading(), &mut StdRng::seed_from_u64(2), &EXTENDED).unwrap();
        assert_eq!(receipt.from, "0xabc123");
        assert_eq!(receipt.to.len(), 42);
        assert_eq!(receipt.amount, 12.3457);
        assert_eq!(receipt.status, TransactionStatus::Pending);
        assert!(EXTENDED.fields.finality_time_ms.contains(receipt.estimated_confirmation_ms as f64));
    }

    #[test]
    fn invalid_submissions_are_rejected() {
        let bad_amount = SubmitTransaction { amount: Some(-1.0), ..Default::default() };
        assert!(bad_amount.validate().is_err());
        let bad_addr = SubmitTransaction { to: Some("0xnothex".into()), ..Default::default() };
        assert!(bad_addr.validate().is_err());
        assert!(SubmitTransaction::default().validate().is_ok());
    }

    #[test]
    fn unknown_fields_fail_to_parse() {
        let parsed = serde_json::from_str::<SubmitTransaction>(r#"{"value": 1}"#);
        assert!(parsed.is_err());
    }
}
