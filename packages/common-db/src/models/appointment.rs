//! Agendamentos entre médico e paciente

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::{decode_optional_text, decode_text, decode_uuid};

text_enum! {
    /// Status possíveis de um agendamento
    AppointmentStatus {
        /// Agendado, ainda não iniciado
        Scheduled => "Scheduled",
        /// Consulta em andamento
        Started => "Started",
        /// Consulta concluída
        Completed => "Completed",
        /// Paciente não compareceu ou consulta não realizada
        Skipped => "Skipped",
    }
}

text_enum! {
    /// Situação do pagamento
    PaymentStatus {
        Pending => "Pending",
        Paid => "Paid",
        Failed => "Failed",
        Refunded => "Refunded",
    }
}

text_enum! {
    /// Forma de pagamento
    PaymentMethod {
        Cash => "Cash",
        CreditCard => "Credit Card",
        Insurance => "Insurance",
        MobilePayment => "Mobile Payment",
    }
}

text_enum! {
    /// Resposta do médico à solicitação
    AppointmentResponse {
        Pending => "Pending",
        Accepted => "Accepted",
        Rejected => "Rejected",
    }
}

/// Representa uma consulta/agendamento
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    /// Perfil do médico
    #[serde(rename = "doctor")]
    pub doctor_id: Uuid,
    /// Perfil do paciente
    #[serde(rename = "patient")]
    pub patient_id: Uuid,
    pub date: NaiveDate,
    /// Horário no formato HH:MM
    pub time: String,
    /// Duração prevista em minutos
    pub duration: i64,
    pub status: AppointmentStatus,
    pub reason: String,
    pub notes: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub amount: f64,
    /// Identificador externo do pagamento (único quando presente)
    pub transaction_id: Option<String>,
    pub minutes_taken: Option<i64>,
    pub response: AppointmentResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Um agendamento pago precisa informar a forma de pagamento
    pub fn payment_is_consistent(&self) -> bool {
        self.payment_status != PaymentStatus::Paid || self.payment_method.is_some()
    }
}

impl FromRow<'_, SqliteRow> for Appointment {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        Ok(Self {
            id: decode_uuid(row, "id")?,
            doctor_id: decode_uuid(row, "doctor_id")?,
            patient_id: decode_uuid(row, "patient_id")?,
            date: row.try_get("date")?,
            time: row.try_get("time")?,
            duration: row.try_get("duration")?,
            status: decode_text(row, "status")?,
            reason: row.try_get("reason")?,
            notes: row.try_get("notes")?,
            payment_status: decode_text(row, "payment_status")?,
            payment_method: decode_optional_text(row, "payment_method")?,
            amount: row.try_get("amount")?,
            transaction_id: row.try_get("transaction_id")?,
            minutes_taken: row.try_get("minutes_taken")?,
            response: decode_text(row, "response")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
