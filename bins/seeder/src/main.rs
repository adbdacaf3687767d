//! Database seeder for Hospifin development and testing.
//!
//! Seeds one hospital with an admin, a finance and a viewer account (all with
//! password `password`), its settings, and two approved monthly reports.
//! Existing rows are left alone, so the seeder can be re-run.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::Utc;
use hospifin_core::DomainError;
use hospifin_core::access::{Actor, NewUser, Role, User, hash_password};
use hospifin_core::lifecycle::ReportManager;
use hospifin_core::report::ReportDraft;
use hospifin_core::settings::{
    HospitalSettings, NotificationSettings, SettingsUpdate, TaxSettings,
};
use hospifin_db::{ReportRepository, SettingsRepository, UserRepository};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tracing::info;

const HOSPITAL_ID: &str = "hospital-1";
const SEED_PASSWORD: &str = "password";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db = hospifin_db::connect(&database_url)
        .await
        .context("failed to connect to database")?;
    info!("Connected to database");

    let admin = seed_user(&db, "Administrator", "admin@hospital.com", Role::Admin).await?;
    let finance = seed_user(&db, "Finance Manager", "finance@hospital.com", Role::Finance).await?;
    seed_user(&db, "Viewer User", "viewer@hospital.com", Role::Viewer).await?;

    let settings = seed_settings(&db, &admin.actor()).await?;
    seed_reports(&db, &admin.actor(), &finance.actor(), &settings).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    role: Role,
) -> anyhow::Result<User> {
    let users = UserRepository::new(db.clone());
    if let Some(existing) = users.find_credentials(email).await? {
        info!(email, "user already exists, skipping");
        return Ok(existing.user);
    }

    let new_user = NewUser {
        email: email.to_string(),
        password: SEED_PASSWORD.to_string(),
        name: name.to_string(),
        role,
        hospital_id: HOSPITAL_ID.to_string(),
    };
    let hash = hash_password(&new_user.password)?;
    let user = users.create(&new_user, &hash).await?;
    info!(email, role = %role, "created user");
    Ok(user)
}

async fn seed_settings(db: &DatabaseConnection, admin: &Actor) -> anyhow::Result<HospitalSettings> {
    let repo = SettingsRepository::new(db.clone());
    if let Some(existing) = repo.find(HOSPITAL_ID).await? {
        info!("hospital settings already exist, skipping");
        return Ok(existing);
    }

    let mut settings = HospitalSettings::defaults_for(HOSPITAL_ID, "RS Sebening Kasih");
    let update = SettingsUpdate {
        address: Some("Jl. Kesehatan No. 123, Jakarta".to_string()),
        phone: Some("+62-21-1234567".to_string()),
        email: Some("admin@rsusebeningkasih.com".to_string()),
        tax_id: Some("01.234.567.8-901.000".to_string()),
        tax_settings: Some(TaxSettings {
            deduction_types: [
                "Penyusutan Peralatan",
                "Biaya Operasional",
                "Biaya Penelitian",
                "Biaya CSR",
            ]
            .map(String::from)
            .to_vec(),
            ..TaxSettings::default()
        }),
        notification_settings: Some(NotificationSettings {
            email_notifications: true,
            reminder_days: vec![7, 3, 1],
        }),
        ..SettingsUpdate::default()
    };
    settings.update(admin, update, Utc::now())?;
    let saved = repo.save(&settings).await?;
    info!(hospital = %saved.hospital_name, "created hospital settings");
    Ok(saved)
}

async fn seed_reports(
    db: &DatabaseConnection,
    admin: &Actor,
    finance: &Actor,
    settings: &HospitalSettings,
) -> anyhow::Result<()> {
    let manager = ReportManager::new(ReportRepository::new(db.clone()));

    for (preparer, body) in [(admin, january_2024()), (finance, february_2024())] {
        let draft = ReportDraft::from_json(&body).map_err(DomainError::from)?;
        let label = draft.label.clone().unwrap_or_default();
        let report = match manager.create(preparer, draft, Some(settings)).await {
            Ok(report) => report,
            Err(DomainError::DuplicatePeriod { .. }) => {
                info!(period = %label, "report already exists, skipping");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        manager.submit(preparer, report.id).await?;
        manager.approve(admin, report.id).await?;
        info!(report_id = %report.id, period = %label, "created approved report");
    }
    Ok(())
}

fn january_2024() -> Value {
    json!({
        "reportType": "monthly",
        "period": "Januari 2024",
        "year": 2024,
        "month": 1,
        "revenue": {
            "patientCare": 2_500_000_000_u64,
            "emergencyServices": 800_000_000_u64,
            "surgery": 1_200_000_000_u64,
            "laboratory": 400_000_000_u64,
            "pharmacy": 600_000_000_u64,
            "other": 200_000_000_u64
        },
        "expenses": {
            "salaries": 1_800_000_000_u64,
            "medicalSupplies": 900_000_000_u64,
            "equipment": 300_000_000_u64,
            "utilities": 200_000_000_u64,
            "maintenance": 150_000_000_u64,
            "insurance": 100_000_000_u64,
            "other": 250_000_000_u64
        },
        "assets": {
            "current": {
                "cash": 500_000_000_u64,
                "accountsReceivable": 800_000_000_u64,
                "inventory": 400_000_000_u64,
                "other": 100_000_000_u64
            },
            "fixed": {
                "buildings": 15_000_000_000_u64,
                "equipment": 8_000_000_000_u64,
                "vehicles": 500_000_000_u64,
                "other": 1_000_000_000_u64
            }
        },
        "liabilities": {
            "current": {
                "accountsPayable": 600_000_000_u64,
                "shortTermDebt": 300_000_000_u64,
                "accruedExpenses": 200_000_000_u64,
                "other": 100_000_000_u64
            },
            "longTerm": {
                "longTermDebt": 5_000_000_000_u64,
                "other": 500_000_000_u64
            }
        },
        "equity": {
            "capital": 10_000_000_000_u64,
            "retainedEarnings": 5_000_000_000_u64,
            "currentEarnings": 2_000_000_000_u64
        },
        "tax": { "rate": "0.25", "deductions": 500_000_000_u64 }
    })
}

fn february_2024() -> Value {
    json!({
        "reportType": "monthly",
        "period": "Februari 2024",
        "year": 2024,
        "month": 2,
        "revenue": {
            "patientCare": 2_700_000_000_u64,
            "emergencyServices": 850_000_000_u64,
            "surgery": 1_300_000_000_u64,
            "laboratory": 450_000_000_u64,
            "pharmacy": 650_000_000_u64,
            "other": 250_000_000_u64
        },
        "expenses": {
            "salaries": 1_850_000_000_u64,
            "medicalSupplies": 950_000_000_u64,
            "equipment": 320_000_000_u64,
            "utilities": 220_000_000_u64,
            "maintenance": 160_000_000_u64,
            "insurance": 105_000_000_u64,
            "other": 270_000_000_u64
        },
        "assets": {
            "current": {
                "cash": 600_000_000_u64,
                "accountsReceivable": 900_000_000_u64,
                "inventory": 450_000_000_u64,
                "other": 120_000_000_u64
            },
            "fixed": {
                "buildings": 15_000_000_000_u64,
                "equipment": 8_200_000_000_u64,
                "vehicles": 520_000_000_u64,
                "other": 1_050_000_000_u64
            }
        },
        "liabilities": {
            "current": {
                "accountsPayable": 650_000_000_u64,
                "shortTermDebt": 280_000_000_u64,
                "accruedExpenses": 220_000_000_u64,
                "other": 110_000_000_u64
            },
            "longTerm": {
                "longTermDebt": 4_800_000_000_u64,
                "other": 480_000_000_u64
            }
        },
        "equity": {
            "capital": 10_000_000_000_u64,
            "retainedEarnings": 5_200_000_000_u64,
            "currentEarnings": 2_325_000_000_u64
        },
        "tax": { "rate": "0.25", "deductions": 525_000_000_u64 }
    })
}
