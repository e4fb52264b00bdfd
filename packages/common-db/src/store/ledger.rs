//! Persistência de carteiras e transações

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::{Transaction, Wallet};

pub async fn insert_transaction(
    conn: &mut SqliteConnection,
    transaction: &Transaction,
) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO transactions
            (id, created_at, updated_at, patient_id, doctor_id, appointment_id, amount, currency,
             payment_method, transaction_id, status, payment_date)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(transaction.id.to_string())
    .bind(transaction.created_at)
    .bind(transaction.updated_at)
    .bind(transaction.patient_id.to_string())
    .bind(transaction.doctor_id.to_string())
    .bind(transaction.appointment_id.to_string())
    .bind(transaction.amount)
    .bind(&transaction.currency)
    .bind(transaction.payment_method.as_str())
    .bind(&transaction.transaction_id)
    .bind(transaction.status.as_str())
    .bind(transaction.payment_date)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find_transaction(
    conn: &mut SqliteConnection,
    id: Uuid,
) -> DbResult<Option<Transaction>> {
    let transaction = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(transaction)
}

/// Transações de um médico, da mais recente para a mais antiga
pub async fn list_transactions_for_doctor(
    conn: &mut SqliteConnection,
    doctor_id: Uuid,
) -> DbResult<Vec<Transaction>> {
    let transactions = sqlx::query_as::<_, Transaction>(
        "SELECT * FROM transactions WHERE doctor_id = ? ORDER BY payment_date DESC, id",
    )
    .bind(doctor_id.to_string())
    .fetch_all(&mut *conn)
    .await?;
    Ok(transactions)
}

pub async fn insert_wallet(conn: &mut SqliteConnection, wallet: &Wallet) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO doctor_wallets (id, created_at, updated_at, doctor_id, balance, currency)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(wallet.id.to_string())
    .bind(wallet.created_at)
    .bind(wallet.updated_at)
    .bind(wallet.doctor_id.to_string())
    .bind(wallet.balance)
    .bind(&wallet.currency)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find_wallet_by_doctor(
    conn: &mut SqliteConnection,
    doctor_id: Uuid,
) -> DbResult<Option<Wallet>> {
    let wallet = sqlx::query_as::<_, Wallet>("SELECT * FROM doctor_wallets WHERE doctor_id = ?")
        .bind(doctor_id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(wallet)
}

/// Soma `amount` ao saldo da carteira
pub async fn credit_wallet(
    conn: &mut SqliteConnection,
    wallet_id: Uuid,
    amount: f64,
    at: DateTime<Utc>,
) -> DbResult<bool> {
    let result =
        sqlx::query("UPDATE doctor_wallets SET balance = balance + ?, updated_at = ? WHERE id = ?")
            .bind(amount)
            .bind(at)
            .bind(wallet_id.to_string())
            .execute(&mut *conn)
            .await?;
    Ok(result.rows_affected() > 0)
}
