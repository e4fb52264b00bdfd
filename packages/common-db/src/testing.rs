//! Utilidades de teste (feature `test-utils`)
//!
//! Banco SQLite temporário já migrado e perfis de exemplo.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use crate::models::{Doctor, Gender, Patient, ProfileStatus};
use crate::{init_db_pool, DbConfig};

/// Cria um banco temporário migrado. O diretório deve viver tanto quanto o pool.
pub async fn temp_database() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("clinic-test.db");

    let config = DbConfig {
        db_path: db_path.to_string_lossy().into_owned(),
        key_phrase: "frase-de-teste".to_string(),
        max_connections: 4,
        ..DbConfig::default()
    };

    let pool = init_db_pool(&config).await?;
    Ok((temp_dir, pool))
}

fn birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1980, 5, 17).unwrap_or_default()
}

pub fn sample_doctor(license_number: &str) -> Doctor {
    let now = Utc::now();
    Doctor {
        id: Uuid::new_v4(),
        first_name: "Gregory".to_string(),
        last_name: "House".to_string(),
        address: None,
        date_of_birth: birth_date(),
        gender: Gender::Male,
        specialization: "Diagnóstico".to_string(),
        license_number: license_number.to_string(),
        experience: 20,
        availability: "Seg-Sex 08:00-17:00".to_string(),
        verified: false,
        status: ProfileStatus::Active,
        wallet_id: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_patient() -> Patient {
    let now = Utc::now();
    Patient {
        id: Uuid::new_v4(),
        name: "Maria Souza".to_string(),
        date_of_birth: birth_date(),
        gender: Gender::Female,
        address: "Rua das Flores, 10".to_string(),
        medical_history: Vec::new(),
        status: ProfileStatus::Active,
        created_at: now,
        updated_at: now,
    }
}
