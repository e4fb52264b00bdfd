//! Sistema de migrações para banco de dados
//!
//! Este módulo gerencia as migrações do banco de dados SQLite

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::{error, info};

/// Lista de migrações SQL a serem aplicadas
const MIGRATIONS: &[&str] = &[
    // 001_accounts.sql
    r#"
    -- Perfis de médicos
    CREATE TABLE IF NOT EXISTS doctors (
        id TEXT PRIMARY KEY NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        address TEXT,
        date_of_birth DATE NOT NULL,
        gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),
        specialization TEXT NOT NULL,
        license_number TEXT NOT NULL UNIQUE,
        experience INTEGER NOT NULL CHECK (experience >= 0),
        availability TEXT NOT NULL,
        verified BOOLEAN NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'Active' CHECK (status IN ('Active', 'Suspended')),
        wallet_id TEXT
    );

    -- Perfis de pacientes (histórico médico criptografado)
    CREATE TABLE IF NOT EXISTS patients (
        id TEXT PRIMARY KEY NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        name TEXT NOT NULL,
        date_of_birth DATE NOT NULL,
        gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),
        address TEXT NOT NULL,
        medical_history_ciphertext BLOB NOT NULL,
        medical_history_nonce BLOB NOT NULL,
        status TEXT NOT NULL DEFAULT 'Active' CHECK (status IN ('Active', 'Suspended'))
    );

    -- Perfis de administradores
    CREATE TABLE IF NOT EXISTS admins (
        id TEXT PRIMARY KEY NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        name TEXT NOT NULL,
        date_of_birth DATE NOT NULL,
        gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),
        address TEXT
    );

    -- Credenciais de acesso; profile_id aponta para a tabela indicada por role
    CREATE TABLE IF NOT EXISTS credentials (
        id TEXT PRIMARY KEY NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        handle TEXT NOT NULL UNIQUE,
        email TEXT UNIQUE,
        phone TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL CHECK (role IN ('Doctor', 'Patient', 'Admin')),
        status TEXT NOT NULL DEFAULT 'Active'
            CHECK (status IN ('Active', 'Inactive', 'Suspended', 'Deleted')),
        profile_id TEXT NOT NULL UNIQUE
    );

    -- Material da chave de dados (linha única)
    CREATE TABLE IF NOT EXISTS master_keys (
        id INTEGER PRIMARY KEY CHECK (id = 1),
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        salt BLOB NOT NULL,
        check_ciphertext BLOB NOT NULL,
        check_nonce BLOB NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_credentials_role ON credentials (role);
    CREATE INDEX IF NOT EXISTS idx_credentials_created_at ON credentials (created_at);
    "#,

    // 002_scheduling_and_ledger.sql
    r#"
    -- Carteiras dos médicos
    CREATE TABLE IF NOT EXISTS doctor_wallets (
        id TEXT PRIMARY KEY NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        doctor_id TEXT NOT NULL UNIQUE,
        balance REAL NOT NULL DEFAULT 0,
        currency TEXT NOT NULL DEFAULT 'USD',
        FOREIGN KEY (doctor_id) REFERENCES doctors (id) ON DELETE CASCADE
    );

    -- Agendamentos
    CREATE TABLE IF NOT EXISTS appointments (
        id TEXT PRIMARY KEY NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        doctor_id TEXT NOT NULL,
        patient_id TEXT NOT NULL,
        date DATE NOT NULL,
        time TEXT NOT NULL,
        duration INTEGER NOT NULL CHECK (duration > 0),
        status TEXT NOT NULL CHECK (status IN ('Scheduled', 'Started', 'Completed', 'Skipped')),
        reason TEXT NOT NULL,
        notes TEXT,
        payment_status TEXT NOT NULL
            CHECK (payment_status IN ('Pending', 'Paid', 'Failed', 'Refunded')),
        payment_method TEXT
            CHECK (payment_method IN ('Cash', 'Credit Card', 'Insurance', 'Mobile Payment')),
        amount REAL NOT NULL,
        transaction_id TEXT UNIQUE,
        minutes_taken INTEGER CHECK (minutes_taken >= 0),
        response TEXT NOT NULL CHECK (response IN ('Pending', 'Accepted', 'Rejected')),
        FOREIGN KEY (doctor_id) REFERENCES doctors (id),
        FOREIGN KEY (patient_id) REFERENCES patients (id)
    );

    -- Transações financeiras
    CREATE TABLE IF NOT EXISTS transactions (
        id TEXT PRIMARY KEY NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        patient_id TEXT NOT NULL,
        doctor_id TEXT NOT NULL,
        appointment_id TEXT NOT NULL,
        amount REAL NOT NULL,
        currency TEXT NOT NULL DEFAULT 'USD',
        payment_method TEXT NOT NULL
            CHECK (payment_method IN ('Cash', 'Credit Card', 'Insurance', 'Mobile Payment')),
        transaction_id TEXT NOT NULL UNIQUE,
        status TEXT NOT NULL CHECK (status IN ('Pending', 'Completed', 'Failed', 'Refunded')),
        payment_date TIMESTAMP NOT NULL,
        FOREIGN KEY (patient_id) REFERENCES patients (id),
        FOREIGN KEY (doctor_id) REFERENCES doctors (id),
        FOREIGN KEY (appointment_id) REFERENCES appointments (id)
    );

    -- Catálogo de livros
    CREATE TABLE IF NOT EXISTS books (
        id TEXT PRIMARY KEY NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        title TEXT NOT NULL,
        author TEXT NOT NULL,
        genre TEXT,
        custom_genre TEXT,
        published_year INTEGER
    );

    CREATE INDEX IF NOT EXISTS idx_appointments_doctor_id ON appointments (doctor_id);
    CREATE INDEX IF NOT EXISTS idx_appointments_patient_id ON appointments (patient_id);
    CREATE INDEX IF NOT EXISTS idx_appointments_date ON appointments (date);
    CREATE INDEX IF NOT EXISTS idx_transactions_doctor_id ON transactions (doctor_id);
    "#,
];

/// Executa todas as migrações pendentes no banco de dados
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    info!("Aplicando migrações de banco de dados...");

    let mut version: i64 = 0;
    match sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await
    {
        Ok(v) => version = v,
        Err(e) => {
            error!("Erro ao obter versão do banco: {}", e);
            // Continuar mesmo assim, pois pode ser a primeira execução
        }
    }

    info!("Versão atual do banco: {}", version);

    for (i, migration_sql) in MIGRATIONS.iter().enumerate() {
        let migration_version = (i + 1) as i64;

        if migration_version <= version {
            info!("Migração {} já aplicada", migration_version);
            continue;
        }

        info!("Aplicando migração {}...", migration_version);

        let mut transaction = pool.begin().await.with_context(|| {
            format!("Falha ao iniciar transação para migração {}", migration_version)
        })?;

        sqlx::query(migration_sql)
            .execute(&mut *transaction)
            .await
            .with_context(|| format!("Falha ao executar migração {}", migration_version))?;

        sqlx::query(&format!("PRAGMA user_version = {}", migration_version))
            .execute(&mut *transaction)
            .await
            .with_context(|| format!("Falha ao atualizar versão para {}", migration_version))?;

        transaction.commit().await.with_context(|| {
            format!("Falha ao confirmar transação para migração {}", migration_version)
        })?;

        info!("Migração {} aplicada com sucesso", migration_version);
    }

    info!("Migrações concluídas. Versão atual: {}", MIGRATIONS.len());
    Ok(())
}
