//! Carteiras dos médicos e transações financeiras

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_text, decode_uuid, PaymentMethod};

text_enum! {
    /// Situação de uma transação
    TransactionStatus {
        Pending => "Pending",
        Completed => "Completed",
        Failed => "Failed",
        Refunded => "Refunded",
    }
}

/// Moeda usada quando a transação não informa outra; igual ao padrão da
/// coluna `doctor_wallets.currency`
pub const DEFAULT_CURRENCY: &str = "USD";

/// Carteira de um médico
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: Uuid,
    #[serde(rename = "doctor")]
    pub doctor_id: Uuid,
    pub balance: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Wallet {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: decode_uuid(row, "id")?,
            doctor_id: decode_uuid(row, "doctor_id")?,
            balance: row.try_get("balance")?,
            currency: row.try_get("currency")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Pagamento de uma consulta
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    #[serde(rename = "patient")]
    pub patient_id: Uuid,
    #[serde(rename = "doctor")]
    pub doctor_id: Uuid,
    #[serde(rename = "appointment")]
    pub appointment_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub payment_method: PaymentMethod,
    /// Identificador externo (único)
    pub transaction_id: String,
    pub status: TransactionStatus,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for Transaction {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: decode_uuid(row, "id")?,
            patient_id: decode_uuid(row, "patient_id")?,
            doctor_id: decode_uuid(row, "doctor_id")?,
            appointment_id: decode_uuid(row, "appointment_id")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            payment_method: decode_text(row, "payment_method")?,
            transaction_id: row.try_get("transaction_id")?,
            status: decode_text(row, "status")?,
            payment_date: row.try_get("payment_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
