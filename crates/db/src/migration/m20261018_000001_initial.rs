//! Initial schema: users, reports, settings, and review schedules.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(TABLES_SQL).await?;
        db.execute_unprepared(INDEXES_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('admin', 'finance', 'viewer');
CREATE TYPE report_type AS ENUM ('monthly', 'quarterly', 'annual');
CREATE TYPE report_status AS ENUM ('draft', 'submitted', 'approved', 'archived');
CREATE TYPE review_type AS ENUM ('monthly', 'quarterly', 'annual', 'audit');
CREATE TYPE review_status AS ENUM ('pending', 'in-progress', 'completed', 'overdue');
";

const TABLES_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    name VARCHAR(100) NOT NULL,
    role user_role NOT NULL DEFAULT 'viewer',
    hospital_id VARCHAR(64) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    last_login TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_users_email_lower CHECK (email = lower(email))
);

CREATE TABLE financial_reports (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    hospital_id VARCHAR(64) NOT NULL,
    report_type report_type NOT NULL,
    period VARCHAR(100) NOT NULL,
    year INTEGER NOT NULL,
    month INTEGER,
    quarter INTEGER,
    period_end DATE NOT NULL,
    revenue JSONB NOT NULL,
    expenses JSONB NOT NULL,
    assets JSONB NOT NULL,
    liabilities JSONB NOT NULL,
    equity JSONB NOT NULL,
    tax JSONB NOT NULL,
    balance_sheet JSONB NOT NULL,
    status report_status NOT NULL DEFAULT 'draft',
    created_by UUID NOT NULL REFERENCES users(id),
    approved_by UUID REFERENCES users(id),
    approved_at TIMESTAMPTZ,
    rejection_reason VARCHAR(500),
    notes VARCHAR(1000),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_reports_year CHECK (year BETWEEN 2020 AND 2030),
    CONSTRAINT chk_reports_month CHECK (month IS NULL OR month BETWEEN 1 AND 12),
    CONSTRAINT chk_reports_quarter CHECK (quarter IS NULL OR quarter BETWEEN 1 AND 4),
    CONSTRAINT chk_reports_period_shape CHECK (
        (report_type = 'monthly' AND month IS NOT NULL AND quarter IS NULL)
        OR (report_type = 'quarterly' AND quarter IS NOT NULL AND month IS NULL)
        OR (report_type = 'annual' AND month IS NULL AND quarter IS NULL)
    ),
    CONSTRAINT chk_reports_approval CHECK (status <> 'approved' OR approved_at IS NOT NULL)
);

CREATE TABLE hospital_settings (
    hospital_id VARCHAR(64) PRIMARY KEY,
    hospital_name VARCHAR(200) NOT NULL,
    address VARCHAR(500) NOT NULL DEFAULT '',
    phone VARCHAR(50) NOT NULL DEFAULT '',
    email VARCHAR(255) NOT NULL DEFAULT '',
    tax_id VARCHAR(50) NOT NULL DEFAULT '',
    fiscal_year_start INTEGER NOT NULL DEFAULT 1,
    currency VARCHAR(3) NOT NULL DEFAULT 'IDR',
    tax_settings JSONB NOT NULL,
    reporting_settings JSONB NOT NULL,
    notification_settings JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_settings_fiscal_start CHECK (fiscal_year_start BETWEEN 1 AND 12),
    CONSTRAINT chk_settings_currency CHECK (currency IN ('IDR', 'USD'))
);

CREATE TABLE review_schedules (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    report_id UUID NOT NULL REFERENCES financial_reports(id) ON DELETE CASCADE,
    hospital_id VARCHAR(64) NOT NULL,
    scheduled_date TIMESTAMPTZ NOT NULL,
    review_type review_type NOT NULL,
    assigned_to UUID NOT NULL REFERENCES users(id),
    status review_status NOT NULL DEFAULT 'pending',
    notes VARCHAR(500),
    completed_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const INDEXES_SQL: &str = r"
-- One non-archived report per hospital and period
CREATE UNIQUE INDEX uq_reports_active_period ON financial_reports (
    hospital_id, report_type, year, COALESCE(month, 0), COALESCE(quarter, 0)
) WHERE status <> 'archived';

-- One active admin per hospital
CREATE UNIQUE INDEX uq_users_active_admin ON users (hospital_id)
    WHERE role = 'admin' AND is_active;

CREATE INDEX idx_reports_listing ON financial_reports (hospital_id, period_end DESC, created_at DESC);
CREATE INDEX idx_reports_status ON financial_reports (hospital_id, status);
CREATE INDEX idx_users_hospital ON users (hospital_id);
CREATE INDEX idx_reviews_assignee ON review_schedules (assigned_to, status);
CREATE INDEX idx_reviews_date ON review_schedules (scheduled_date);
CREATE INDEX idx_reviews_report ON review_schedules (report_id);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS review_schedules CASCADE;
DROP TABLE IF EXISTS hospital_settings CASCADE;
DROP TABLE IF EXISTS financial_reports CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TYPE IF EXISTS review_status;
DROP TYPE IF EXISTS review_type;
DROP TYPE IF EXISTS report_status;
DROP TYPE IF EXISTS report_type;
DROP TYPE IF EXISTS user_role;
";
