//! Persistência dos agendamentos

use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::Appointment;

pub async fn insert(conn: &mut SqliteConnection, appointment: &Appointment) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO appointments
            (id, created_at, updated_at, doctor_id, patient_id, date, time, duration, status,
             reason, notes, payment_status, payment_method, amount, transaction_id,
             minutes_taken, response)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(appointment.id.to_string())
    .bind(appointment.created_at)
    .bind(appointment.updated_at)
    .bind(appointment.doctor_id.to_string())
    .bind(appointment.patient_id.to_string())
    .bind(appointment.date)
    .bind(&appointment.time)
    .bind(appointment.duration)
    .bind(appointment.status.as_str())
    .bind(&appointment.reason)
    .bind(&appointment.notes)
    .bind(appointment.payment_status.as_str())
    .bind(appointment.payment_method.map(|method| method.as_str()))
    .bind(appointment.amount)
    .bind(&appointment.transaction_id)
    .bind(appointment.minutes_taken)
    .bind(appointment.response.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find(conn: &mut SqliteConnection, id: Uuid) -> DbResult<Option<Appointment>> {
    let appointment = sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(appointment)
}

pub async fn list(conn: &mut SqliteConnection) -> DbResult<Vec<Appointment>> {
    let appointments = sqlx::query_as::<_, Appointment>(
        "SELECT * FROM appointments ORDER BY date, time, created_at",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(appointments)
}

pub async fn update(conn: &mut SqliteConnection, appointment: &Appointment) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE appointments
         SET doctor_id = ?, patient_id = ?, date = ?, time = ?, duration = ?, status = ?,
             reason = ?, notes = ?, payment_status = ?, payment_method = ?, amount = ?,
             transaction_id = ?, minutes_taken = ?, response = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(appointment.doctor_id.to_string())
    .bind(appointment.patient_id.to_string())
    .bind(appointment.date)
    .bind(&appointment.time)
    .bind(appointment.duration)
    .bind(appointment.status.as_str())
    .bind(&appointment.reason)
    .bind(&appointment.notes)
    .bind(appointment.payment_status.as_str())
    .bind(appointment.payment_method.map(|method| method.as_str()))
    .bind(appointment.amount)
    .bind(&appointment.transaction_id)
    .bind(appointment.minutes_taken)
    .bind(appointment.response.as_str())
    .bind(appointment.updated_at)
    .bind(appointment.id.to_string())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(conn: &mut SqliteConnection, id: Uuid) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
        .bind(id.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
