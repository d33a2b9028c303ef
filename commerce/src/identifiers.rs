//! Human-readable order identifiers assigned at first persistence.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::error::CommerceResult;
use crate::model::OrderIdentifiers;
use crate::storage::SequenceStorage;

pub const INVOICE_PREFIX: &str = "INV";
pub const ORDER_CODE_PREFIX: &str = "ORD";
const SUFFIX_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

lazy_static! {
    static ref INVOICE_PATTERN: Regex = Regex::new(r"^INV\d{6,}$").unwrap();
    static ref ORDER_CODE_PATTERN: Regex = Regex::new(r"^ORD-\d{8}-[A-Z0-9]{6}$").unwrap();
}

/// `INV` followed by the sequence value zero-padded to six digits.
pub fn format_invoice_number(sequence: i64) -> String {
    format!("{}{:06}", INVOICE_PREFIX, sequence)
}

pub fn format_order_code(created_at: DateTime<Utc>, suffix: &str) -> String {
    format!("{}-{}-{}", ORDER_CODE_PREFIX, created_at.format("%Y%m%d"), suffix)
}

/// Six uppercase base-36 characters drawn from a random v4 UUID.
pub fn random_suffix() -> String {
    let mut bits = uuid::Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        suffix.push(BASE36[(bits % 36) as usize] as char);
        bits /= 36;
    }
    suffix
}

pub fn generate_order_code(created_at: DateTime<Utc>) -> String {
    format_order_code(created_at, &random_suffix())
}

pub fn is_valid_invoice_number(value: &str) -> bool {
    INVOICE_PATTERN.is_match(value)
}

pub fn is_valid_order_code(value: &str) -> bool {
    ORDER_CODE_PATTERN.is_match(value)
}

/// Draws invoice numbers from an atomically incremented storage sequence.
#[derive(Clone)]
pub struct IdentifierAllocator {
    sequences: Arc<dyn SequenceStorage>,
    sequence_name: String,
}

impl IdentifierAllocator {
    pub fn new(sequences: Arc<dyn SequenceStorage>, sequence_name: impl Into<String>) -> Self {
        Self {
            sequences,
            sequence_name: sequence_name.into(),
        }
    }

    pub async fn allocate(&self, created_at: DateTime<Utc>) -> CommerceResult<OrderIdentifiers> {
        let sequence = self.sequences.next_value(&self.sequence_name).await?;
        let identifiers = OrderIdentifiers {
            invoice_number: format_invoice_number(sequence),
            order_code: generate_order_code(created_at),
        };
        debug!(
            invoice_number = %identifiers.invoice_number,
            order_code = %identifiers.order_code,
            "Allocated order identifiers"
        );
        Ok(identifiers)
    }
}
