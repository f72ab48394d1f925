//! Initial database migration.
//!
//! Creates the status catalog and orders tables plus the updated_at
//! trigger both share.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(STATUS_DEFINITIONS_SQL).await?;
        db.execute_unprepared(ORDERS_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const STATUS_DEFINITIONS_SQL: &str = r"
CREATE TABLE status_definitions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    label VARCHAR(100) NOT NULL,
    value VARCHAR(100) NOT NULL UNIQUE,
    color VARCHAR(32) NOT NULL DEFAULT '#888888',
    description TEXT,
    is_end_state BOOLEAN NOT NULL DEFAULT false,
    end_state_type VARCHAR(20),
    is_default BOOLEAN NOT NULL DEFAULT false,
    sort_order INTEGER NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_end_state_type CHECK (
        (NOT is_end_state AND end_state_type IS NULL)
        OR (is_end_state AND end_state_type IN ('done', 'cancelled', 'pending'))
    ),

    -- Checked at commit so a reorder can swap positions mid-transaction.
    CONSTRAINT uq_status_definitions_sort UNIQUE (sort_order)
        DEFERRABLE INITIALLY DEFERRED
);
";

const ORDERS_SQL: &str = r"
CREATE TABLE orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    personal_info JSONB NOT NULL DEFAULT '{}',
    order_details JSONB NOT NULL DEFAULT '{}',
    line_groups JSONB NOT NULL DEFAULT '[]',
    payment_state JSONB NOT NULL DEFAULT '{}',
    status_value VARCHAR(100) NOT NULL REFERENCES status_definitions(value),
    cancellation_reason TEXT,
    cancelled_at TIMESTAMPTZ,
    completed_at TIMESTAMPTZ,
    pending_at TIMESTAMPTZ,
    expected_resume_date DATE,
    pending_notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_orders_status ON orders(status_value);
CREATE INDEX idx_orders_created ON orders(created_at DESC);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION update_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_status_definitions_updated_at
    BEFORE UPDATE ON status_definitions
    FOR EACH ROW EXECUTE FUNCTION update_updated_at();

CREATE TRIGGER trg_orders_updated_at
    BEFORE UPDATE ON orders
    FOR EACH ROW EXECUTE FUNCTION update_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS orders;
DROP TABLE IF EXISTS status_definitions;
DROP FUNCTION IF EXISTS update_updated_at();
";
