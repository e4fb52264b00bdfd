//! Registro de pagamentos e crédito na carteira do médico

use chrono::{DateTime, Utc};
use common_db::models::{
    PaymentMethod, Transaction, TransactionStatus, Wallet, DEFAULT_CURRENCY,
};
use common_db::store::{appointments, ledger, profiles};
use common_db::WriteTransaction;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Corpo de `POST /transactions`
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecordTransactionRequest {
    pub patient: Uuid,
    pub doctor: Uuid,
    pub appointment: Uuid,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    #[validate(length(min = 3, max = 3))]
    pub currency: Option<String>,
    pub payment_method: PaymentMethod,
    #[validate(length(min = 1))]
    pub transaction_id: String,
    pub status: Option<TransactionStatus>,
    pub payment_date: Option<DateTime<Utc>>,
}

/// Carteira e suas transações
#[derive(Debug, Serialize)]
pub struct WalletStatement {
    pub wallet: Wallet,
    pub transactions: Vec<Transaction>,
}

/// Registra a transação; se concluída, credita a carteira do médico na mesma
/// transação do banco, criando-a no primeiro crédito.
pub async fn record_transaction(
    state: &AppState,
    request: RecordTransactionRequest,
) -> ApiResult<Transaction> {
    let now = Utc::now();
    let transaction = Transaction {
        id: Uuid::new_v4(),
        patient_id: request.patient,
        doctor_id: request.doctor,
        appointment_id: request.appointment,
        amount: request.amount,
        currency: request
            .currency
            .map(|currency| currency.trim().to_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        payment_method: request.payment_method,
        transaction_id: request.transaction_id.trim().to_string(),
        status: request.status.unwrap_or(TransactionStatus::Pending),
        payment_date: request.payment_date.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };

    let mut tx = WriteTransaction::begin(&state.pool).await?;

    let appointment = appointments::find(&mut tx, transaction.appointment_id)
        .await?
        .ok_or_else(|| ApiError::validation("Consulta da transação não existe"))?;
    if appointment.doctor_id != transaction.doctor_id
        || appointment.patient_id != transaction.patient_id
    {
        return Err(ApiError::validation(
            "Médico e paciente devem ser os mesmos da consulta",
        ));
    }

    ledger::insert_transaction(&mut tx, &transaction).await?;

    if transaction.status == TransactionStatus::Completed {
        match ledger::find_wallet_by_doctor(&mut tx, transaction.doctor_id).await? {
            Some(wallet) if wallet.currency != transaction.currency => {
                return Err(ApiError::validation(format!(
                    "Moeda {} difere da carteira ({})",
                    transaction.currency, wallet.currency
                )));
            }
            Some(wallet) => {
                ledger::credit_wallet(&mut tx, wallet.id, transaction.amount, now).await?;
            }
            None => {
                let wallet = Wallet {
                    id: Uuid::new_v4(),
                    doctor_id: transaction.doctor_id,
                    balance: transaction.amount,
                    currency: transaction.currency.clone(),
                    created_at: now,
                    updated_at: now,
                };
                ledger::insert_wallet(&mut tx, &wallet).await?;
                profiles::set_doctor_wallet(&mut tx, wallet.doctor_id, wallet.id, now).await?;
                info!("Carteira {} criada para o médico {}", wallet.id, wallet.doctor_id);
            }
        }
    }

    tx.commit().await?;
    info!(
        "Transação {} registrada ({} {} {})",
        transaction.id, transaction.status, transaction.amount, transaction.currency
    );

    Ok(transaction)
}

pub async fn get_transaction(state: &AppState, id: Uuid) -> ApiResult<Transaction> {
    let mut conn = state.pool.acquire().await?;
    ledger::find_transaction(&mut conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Transação {} não encontrada", id)))
}

pub async fn wallet_statement(state: &AppState, doctor_id: Uuid) -> ApiResult<WalletStatement> {
    let mut conn = state.pool.acquire().await?;
    let wallet = ledger::find_wallet_by_doctor(&mut conn, doctor_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Médico {} não possui carteira", doctor_id)))?;
    let transactions = ledger::list_transactions_for_doctor(&mut conn, doctor_id).await?;

    Ok(WalletStatement {
        wallet,
        transactions,
    })
}
