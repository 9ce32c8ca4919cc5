//! Local payment receipts.
//!
//! All receipts share one JSON array under [`RECEIPTS_KEY`]. Every operation reads
//! the whole array, changes it, and writes it back; there is no per-record key and
//! no protection against a torn write. Receipts are a convenience cache for the
//! history view, the backend's order list stays authoritative.

use crate::{Clock, KvStore, SystemClock};
use rz_api_types::PaymentReceipt;
use serde_json::Value;
use tracing::{debug, warn};

pub const RECEIPTS_KEY: &str = "payment_receipts";
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

const DAY_MS: u128 = 24 * 60 * 60 * 1000;

pub struct ReceiptStore<S, C = SystemClock> {
    storage: S,
    clock: C,
}

fn order_id_of(record: &Value) -> Option<&str> {
    record.get("order_id").and_then(Value::as_str)
}

fn decode(record: &Value) -> Option<PaymentReceipt> {
    match serde_json::from_value(record.clone()) {
        Ok(receipt) => Some(receipt),
        Err(err) => {
            debug!("skipping unreadable receipt {:?}: {}", order_id_of(record), err);
            None
        }
    }
}

impl<S: KvStore> ReceiptStore<S, SystemClock> {
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: KvStore, C: Clock> ReceiptStore<S, C> {
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self { storage, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Insert or replace the receipt for `order_id`.
    ///
    /// The stored record always carries `order_id`, whatever id `receipt` came with.
    /// Nothing is written when the stored array cannot be read.
    pub fn save(&self, order_id: &str, receipt: PaymentReceipt) {
        let Some(mut records) = self.read_records() else {
            warn!("receipt {} not saved: stored receipts are unreadable", order_id);
            return;
        };
        let record = PaymentReceipt {
            order_id: order_id.to_owned(),
            ..receipt
        };
        let record = match serde_json::to_value(record) {
            Ok(record) => record,
            Err(err) => {
                warn!("failed to encode receipt {}: {}", order_id, err);
                return;
            }
        };

        match records.iter_mut().find(|r| order_id_of(r) == Some(order_id)) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.write_records(&records);
    }

    pub fn get(&self, order_id: &str) -> Option<PaymentReceipt> {
        self.read_all().into_iter().find(|r| r.order_id == order_id)
    }

    /// Delete the receipt for `order_id`. Returns whether one was removed.
    pub fn remove(&self, order_id: &str) -> bool {
        let Some(mut records) = self.read_records() else {
            return false;
        };
        let before = records.len();
        records.retain(|r| order_id_of(r) != Some(order_id));
        if records.len() == before {
            return false;
        }
        self.write_records(&records);
        true
    }

    pub fn list_ids(&self) -> Vec<String> {
        self.read_all().into_iter().map(|r| r.order_id).collect()
    }

    /// All receipts, newest first.
    pub fn list(&self) -> Vec<PaymentReceipt> {
        let mut receipts = self.read_all();
        receipts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        receipts
    }

    /// Drop receipts older than `max_age_days`. Returns how many were removed.
    ///
    /// Records that no longer decode are left in place.
    pub fn cleanup(&self, max_age_days: u32) -> usize {
        let cutoff = self
            .clock
            .now_epoch_ms()
            .saturating_sub(u128::from(max_age_days) * DAY_MS);

        let Some(mut records) = self.read_records() else {
            return 0;
        };
        let before = records.len();
        records.retain(|r| decode(r).is_none_or(|receipt| receipt.timestamp >= cutoff));
        let removed = before - records.len();

        if removed > 0 {
            debug!("removing {} receipts older than {} days", removed, max_age_days);
            self.write_records(&records);
        }
        removed
    }

    fn read_all(&self) -> Vec<PaymentReceipt> {
        self.read_records()
            .unwrap_or_default()
            .iter()
            .filter_map(decode)
            .collect()
    }

    /// The stored array as raw records; `None` when storage or the document is
    /// unreadable, in which case callers must not write.
    fn read_records(&self) -> Option<Vec<Value>> {
        match self.storage.get_raw(RECEIPTS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(records) => Some(records),
                Err(err) => {
                    warn!("stored receipts are not an array: {}", err);
                    None
                }
            },
            Ok(None) => Some(Vec::new()),
            Err(err) => {
                warn!("failed to read receipts: {}", err);
                None
            }
        }
    }

    fn write_records(&self, records: &[Value]) {
        let json = match serde_json::to_string(records) {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to encode receipts: {}", err);
                return;
            }
        };
        if let Err(err) = self.storage.set_raw(RECEIPTS_KEY, &json) {
            warn!("failed to persist receipts: {}", err);
        }
    }
}
