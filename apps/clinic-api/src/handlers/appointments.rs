//! CRUD de consultas

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use common_db::models::{
    Appointment, AppointmentResponse, AppointmentStatus, PaymentMethod, PaymentStatus,
};
use common_db::store::appointments;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ResourceId, ValidatedJson};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub doctor: Uuid,
    pub patient: Uuid,
    pub date: NaiveDate,
    #[validate(length(min = 1))]
    pub time: String,
    #[validate(range(min = 1))]
    pub duration: i64,
    #[validate(length(min = 1))]
    pub reason: String,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub notes: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    #[validate(length(min = 1))]
    pub transaction_id: Option<String>,
    #[validate(range(min = 0))]
    pub minutes_taken: Option<i64>,
    pub response: Option<AppointmentResponse>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub doctor: Option<Uuid>,
    pub patient: Option<Uuid>,
    pub date: Option<NaiveDate>,
    #[validate(length(min = 1))]
    pub time: Option<String>,
    #[validate(range(min = 1))]
    pub duration: Option<i64>,
    #[validate(length(min = 1))]
    pub reason: Option<String>,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    pub notes: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    #[validate(length(min = 1))]
    pub transaction_id: Option<String>,
    #[validate(range(min = 0))]
    pub minutes_taken: Option<i64>,
    pub response: Option<AppointmentResponse>,
}

impl UpdateAppointmentRequest {
    fn merge_into(self, appointment: &mut Appointment) {
        if let Some(doctor) = self.doctor {
            appointment.doctor_id = doctor;
        }
        if let Some(patient) = self.patient {
            appointment.patient_id = patient;
        }
        if let Some(date) = self.date {
            appointment.date = date;
        }
        if let Some(time) = self.time {
            appointment.time = time;
        }
        if let Some(duration) = self.duration {
            appointment.duration = duration;
        }
        if let Some(reason) = self.reason {
            appointment.reason = reason;
        }
        if let Some(amount) = self.amount {
            appointment.amount = amount;
        }
        if self.notes.is_some() {
            appointment.notes = self.notes;
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
        if let Some(payment_status) = self.payment_status {
            appointment.payment_status = payment_status;
        }
        if self.payment_method.is_some() {
            appointment.payment_method = self.payment_method;
        }
        if self.transaction_id.is_some() {
            appointment.transaction_id = self.transaction_id;
        }
        if self.minutes_taken.is_some() {
            appointment.minutes_taken = self.minutes_taken;
        }
        if let Some(response) = self.response {
            appointment.response = response;
        }
    }
}

fn ensure_payment_consistent(appointment: &Appointment) -> ApiResult<()> {
    if appointment.payment_is_consistent() {
        Ok(())
    } else {
        Err(ApiError::validation(
            "paymentMethod é obrigatório quando o pagamento está confirmado",
        ))
    }
}

fn appointment_not_found(id: Uuid) -> ApiError {
    ApiError::not_found(format!("Consulta {} não encontrada", id))
}

/// POST /appointments
pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let now = Utc::now();
    let appointment = Appointment {
        id: Uuid::new_v4(),
        doctor_id: request.doctor,
        patient_id: request.patient,
        date: request.date,
        time: request.time,
        duration: request.duration,
        status: request.status.unwrap_or(AppointmentStatus::Scheduled),
        reason: request.reason,
        notes: request.notes,
        payment_status: request.payment_status.unwrap_or(PaymentStatus::Pending),
        payment_method: request.payment_method,
        amount: request.amount,
        transaction_id: request.transaction_id,
        minutes_taken: request.minutes_taken,
        response: request.response.unwrap_or(AppointmentResponse::Pending),
        created_at: now,
        updated_at: now,
    };
    ensure_payment_consistent(&appointment)?;

    let mut conn = state.pool.acquire().await?;
    appointments::insert(&mut conn, &appointment).await?;
    info!("Consulta {} agendada para {}", appointment.id, appointment.date);

    Ok((StatusCode::CREATED, Json(appointment)))
}

/// GET /appointments
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Appointment>>> {
    let mut conn = state.pool.acquire().await?;
    Ok(Json(appointments::list(&mut conn).await?))
}

/// GET /appointments/:id
pub async fn get(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<Appointment>> {
    let mut conn = state.pool.acquire().await?;
    appointments::find(&mut conn, id)
        .await?
        .map(Json)
        .ok_or_else(|| appointment_not_found(id))
}

/// PUT /appointments/:id
pub async fn update(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
    ValidatedJson(request): ValidatedJson<UpdateAppointmentRequest>,
) -> ApiResult<Json<Appointment>> {
    let mut conn = state.pool.acquire().await?;
    let mut appointment = appointments::find(&mut conn, id)
        .await?
        .ok_or_else(|| appointment_not_found(id))?;

    request.merge_into(&mut appointment);
    ensure_payment_consistent(&appointment)?;
    appointment.updated_at = Utc::now();

    if !appointments::update(&mut conn, &appointment).await? {
        return Err(appointment_not_found(id));
    }
    Ok(Json(appointment))
}

/// DELETE /appointments/:id
pub async fn delete(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<Value>> {
    let mut conn = state.pool.acquire().await?;
    if !appointments::delete(&mut conn, id).await? {
        return Err(appointment_not_found(id));
    }

    info!("Consulta {} removida", id);
    Ok(Json(json!({ "message": "Consulta removida", "id": id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment() -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            time: "09:00".to_string(),
            duration: 30,
            status: AppointmentStatus::Scheduled,
            reason: "Retorno".to_string(),
            notes: None,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            amount: 100.0,
            transaction_id: None,
            minutes_taken: None,
            response: AppointmentResponse::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut current = appointment();
        let request = UpdateAppointmentRequest {
            status: Some(AppointmentStatus::Completed),
            minutes_taken: Some(25),
            ..Default::default()
        };

        request.merge_into(&mut current);

        assert_eq!(current.status, AppointmentStatus::Completed);
        assert_eq!(current.minutes_taken, Some(25));
        assert_eq!(current.reason, "Retorno");
        assert_eq!(current.duration, 30);
    }

    #[test]
    fn test_paid_without_method_is_rejected() {
        let mut current = appointment();
        current.payment_status = PaymentStatus::Paid;
        assert!(ensure_payment_consistent(&current).is_err());

        current.payment_method = Some(PaymentMethod::Insurance);
        assert!(ensure_payment_consistent(&current).is_ok());
    }
}
