//! Schema migration for the school records tables.

use diesel_async::AsyncPgConnection;
use diesel_async::SimpleAsyncConnection;

/// SQL migration for the records tables.
///
/// Tables are created first; the grade foreign keys are attached afterwards so
/// that re-running against an older schema (tables without constraints)
/// upgrades it in place.
pub const MIGRATION_SQL: &str = r#"
-- ================================================================
-- School records tables
-- ================================================================

CREATE TABLE IF NOT EXISTS students (
    student_id      BIGSERIAL PRIMARY KEY,
    name            VARCHAR(100) NOT NULL,
    "group"         VARCHAR(10) NOT NULL,
    email           VARCHAR(100) NOT NULL,
    CONSTRAINT uq_students_email UNIQUE (email)
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id      BIGSERIAL PRIMARY KEY,
    name            VARCHAR(100) NOT NULL,
    CONSTRAINT uq_subjects_name UNIQUE (name)
);

CREATE TABLE IF NOT EXISTS grades (
    grade_id        BIGSERIAL PRIMARY KEY,
    student_id      BIGINT NOT NULL,
    subject_id      BIGINT NOT NULL,
    grade           NUMERIC(5,2) NOT NULL,
    CONSTRAINT ck_grades_range CHECK (grade >= 0 AND grade <= 100)
);

CREATE INDEX IF NOT EXISTS idx_grades_student ON grades (student_id);
CREATE INDEX IF NOT EXISTS idx_grades_subject ON grades (subject_id);

-- ================================================================
-- Foreign keys (added after creation, skipped when present)
-- ================================================================

DO $$
BEGIN
    IF NOT EXISTS (
        SELECT 1 FROM pg_constraint WHERE conname = 'fk_grades_student'
    ) THEN
        ALTER TABLE grades
            ADD CONSTRAINT fk_grades_student
            FOREIGN KEY (student_id)
            REFERENCES students (student_id)
            ON DELETE CASCADE
            ON UPDATE CASCADE;
    END IF;

    IF NOT EXISTS (
        SELECT 1 FROM pg_constraint WHERE conname = 'fk_grades_subject'
    ) THEN
        ALTER TABLE grades
            ADD CONSTRAINT fk_grades_subject
            FOREIGN KEY (subject_id)
            REFERENCES subjects (subject_id)
            ON DELETE CASCADE
            ON UPDATE CASCADE;
    END IF;
END
$$;
"#;

/// Name of the foreign key from `grades.student_id` to `students`.
pub const FK_GRADES_STUDENT: &str = "fk_grades_student";
/// Name of the foreign key from `grades.subject_id` to `subjects`.
pub const FK_GRADES_SUBJECT: &str = "fk_grades_subject";

/// Run the records migration.
pub async fn run_migration(conn: &mut AsyncPgConnection) -> anyhow::Result<()> {
    conn.batch_execute(MIGRATION_SQL)
        .await
        .map_err(|e| anyhow::anyhow!("records migration failed: {e}"))?;
    Ok(())
}
