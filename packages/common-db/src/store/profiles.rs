//! Persistência dos perfis por papel
//!
//! O histórico médico dos pacientes é gravado criptografado com a chave de
//! dados; por isso as funções de paciente recebem a [`EncryptionKey`].

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use crate::crypto::{decrypt, encrypt, EncryptedData, EncryptionKey};
use crate::error::DbResult;
use crate::models::{
    decode_text, decode_uuid, Admin, Doctor, Patient, ProfileRef, ProfileStatus, RoleProfile,
};

pub async fn insert(
    conn: &mut SqliteConnection,
    key: &EncryptionKey,
    profile: &RoleProfile,
) -> DbResult<()> {
    match profile {
        RoleProfile::Doctor(doctor) => insert_doctor(conn, doctor).await,
        RoleProfile::Patient(patient) => insert_patient(conn, key, patient).await,
        RoleProfile::Admin(admin) => insert_admin(conn, admin).await,
    }
}

/// Busca o perfil apontado pela credencial
pub async fn find(
    conn: &mut SqliteConnection,
    key: &EncryptionKey,
    reference: ProfileRef,
) -> DbResult<Option<RoleProfile>> {
    let profile = match reference {
        ProfileRef::Doctor(id) => find_doctor(conn, id).await?.map(RoleProfile::Doctor),
        ProfileRef::Patient(id) => find_patient(conn, key, id).await?.map(RoleProfile::Patient),
        ProfileRef::Admin(id) => find_admin(conn, id).await?.map(RoleProfile::Admin),
    };
    Ok(profile)
}

/// Regrava todos os campos mutáveis do perfil
pub async fn update(
    conn: &mut SqliteConnection,
    key: &EncryptionKey,
    profile: &RoleProfile,
) -> DbResult<bool> {
    match profile {
        RoleProfile::Doctor(doctor) => update_doctor(conn, doctor).await,
        RoleProfile::Patient(patient) => update_patient(conn, key, patient).await,
        RoleProfile::Admin(admin) => update_admin(conn, admin).await,
    }
}

/// Altera a situação do perfil. Administradores não têm situação própria e
/// retornam `false` sem tocar no banco.
pub async fn set_status(
    conn: &mut SqliteConnection,
    reference: ProfileRef,
    status: ProfileStatus,
    at: DateTime<Utc>,
) -> DbResult<bool> {
    let sql = match reference {
        ProfileRef::Doctor(_) => "UPDATE doctors SET status = ?, updated_at = ? WHERE id = ?",
        ProfileRef::Patient(_) => "UPDATE patients SET status = ?, updated_at = ? WHERE id = ?",
        ProfileRef::Admin(_) => return Ok(false),
    };

    let result = sqlx::query(sql)
        .bind(status.as_str())
        .bind(at)
        .bind(reference.id().to_string())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn license_number_exists(
    conn: &mut SqliteConnection,
    license_number: &str,
) -> DbResult<bool> {
    let exists: i64 =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM doctors WHERE license_number = ?)")
            .bind(license_number)
            .fetch_one(&mut *conn)
            .await?;
    Ok(exists != 0)
}

// Médicos

pub async fn insert_doctor(conn: &mut SqliteConnection, doctor: &Doctor) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO doctors
            (id, created_at, updated_at, first_name, last_name, address, date_of_birth, gender,
             specialization, license_number, experience, availability, verified, status, wallet_id)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(doctor.id.to_string())
    .bind(doctor.created_at)
    .bind(doctor.updated_at)
    .bind(&doctor.first_name)
    .bind(&doctor.last_name)
    .bind(&doctor.address)
    .bind(doctor.date_of_birth)
    .bind(doctor.gender.as_str())
    .bind(&doctor.specialization)
    .bind(&doctor.license_number)
    .bind(doctor.experience)
    .bind(&doctor.availability)
    .bind(doctor.verified)
    .bind(doctor.status.as_str())
    .bind(doctor.wallet_id.map(|id| id.to_string()))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find_doctor(conn: &mut SqliteConnection, id: Uuid) -> DbResult<Option<Doctor>> {
    let doctor = sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(doctor)
}

async fn update_doctor(conn: &mut SqliteConnection, doctor: &Doctor) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE doctors
         SET first_name = ?, last_name = ?, address = ?, date_of_birth = ?, gender = ?,
             specialization = ?, license_number = ?, experience = ?, availability = ?,
             verified = ?, status = ?, wallet_id = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&doctor.first_name)
    .bind(&doctor.last_name)
    .bind(&doctor.address)
    .bind(doctor.date_of_birth)
    .bind(doctor.gender.as_str())
    .bind(&doctor.specialization)
    .bind(&doctor.license_number)
    .bind(doctor.experience)
    .bind(&doctor.availability)
    .bind(doctor.verified)
    .bind(doctor.status.as_str())
    .bind(doctor.wallet_id.map(|id| id.to_string()))
    .bind(doctor.updated_at)
    .bind(doctor.id.to_string())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Vincula a carteira criada no primeiro crédito
pub async fn set_doctor_wallet(
    conn: &mut SqliteConnection,
    doctor_id: Uuid,
    wallet_id: Uuid,
    at: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query("UPDATE doctors SET wallet_id = ?, updated_at = ? WHERE id = ?")
        .bind(wallet_id.to_string())
        .bind(at)
        .bind(doctor_id.to_string())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

// Pacientes

fn seal_history(key: &EncryptionKey, history: &[String]) -> DbResult<EncryptedData> {
    let plaintext = serde_json::to_vec(history)?;
    Ok(encrypt(&plaintext, key)?)
}

fn open_history(key: &EncryptionKey, sealed: &EncryptedData) -> DbResult<Vec<String>> {
    let plaintext = decrypt(sealed, key)?;
    Ok(serde_json::from_slice(&plaintext)?)
}

fn patient_from_row(row: &SqliteRow, key: &EncryptionKey) -> DbResult<Patient> {
    let sealed = EncryptedData {
        ciphertext: row.try_get("medical_history_ciphertext")?,
        nonce: row.try_get("medical_history_nonce")?,
    };

    Ok(Patient {
        id: decode_uuid(row, "id")?,
        name: row.try_get("name")?,
        date_of_birth: row.try_get("date_of_birth")?,
        gender: decode_text(row, "gender")?,
        address: row.try_get("address")?,
        medical_history: open_history(key, &sealed)?,
        status: decode_text(row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn insert_patient(
    conn: &mut SqliteConnection,
    key: &EncryptionKey,
    patient: &Patient,
) -> DbResult<()> {
    let history = seal_history(key, &patient.medical_history)?;

    sqlx::query(
        "INSERT INTO patients
            (id, created_at, updated_at, name, date_of_birth, gender, address,
             medical_history_ciphertext, medical_history_nonce, status)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(patient.id.to_string())
    .bind(patient.created_at)
    .bind(patient.updated_at)
    .bind(&patient.name)
    .bind(patient.date_of_birth)
    .bind(patient.gender.as_str())
    .bind(&patient.address)
    .bind(&history.ciphertext)
    .bind(&history.nonce)
    .bind(patient.status.as_str())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find_patient(
    conn: &mut SqliteConnection,
    key: &EncryptionKey,
    id: Uuid,
) -> DbResult<Option<Patient>> {
    let row = sqlx::query("SELECT * FROM patients WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    row.map(|row| patient_from_row(&row, key)).transpose()
}

async fn update_patient(
    conn: &mut SqliteConnection,
    key: &EncryptionKey,
    patient: &Patient,
) -> DbResult<bool> {
    let history = seal_history(key, &patient.medical_history)?;

    let result = sqlx::query(
        "UPDATE patients
         SET name = ?, date_of_birth = ?, gender = ?, address = ?,
             medical_history_ciphertext = ?, medical_history_nonce = ?, status = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&patient.name)
    .bind(patient.date_of_birth)
    .bind(patient.gender.as_str())
    .bind(&patient.address)
    .bind(&history.ciphertext)
    .bind(&history.nonce)
    .bind(patient.status.as_str())
    .bind(patient.updated_at)
    .bind(patient.id.to_string())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

// Administradores

pub async fn insert_admin(conn: &mut SqliteConnection, admin: &Admin) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO admins (id, created_at, updated_at, name, date_of_birth, gender, address)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(admin.id.to_string())
    .bind(admin.created_at)
    .bind(admin.updated_at)
    .bind(&admin.name)
    .bind(admin.date_of_birth)
    .bind(admin.gender.as_str())
    .bind(&admin.address)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn find_admin(conn: &mut SqliteConnection, id: Uuid) -> DbResult<Option<Admin>> {
    let admin = sqlx::query_as::<_, Admin>("SELECT * FROM admins WHERE id = ?")
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(admin)
}

async fn update_admin(conn: &mut SqliteConnection, admin: &Admin) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE admins
         SET name = ?, date_of_birth = ?, gender = ?, address = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(&admin.name)
    .bind(admin.date_of_birth)
    .bind(admin.gender.as_str())
    .bind(&admin.address)
    .bind(admin.updated_at)
    .bind(admin.id.to_string())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
