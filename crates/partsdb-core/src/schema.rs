//! DDL for the parts database.

pub const CREATE_CATEGORIES: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id           SERIAL PRIMARY KEY,
    display_name TEXT NOT NULL,
    description  TEXT,
    is_active    BOOLEAN NOT NULL DEFAULT TRUE
);
"#;

pub const CREATE_PARTS: &str = r#"
CREATE TABLE IF NOT EXISTS parts (
    sequence_number    SERIAL PRIMARY KEY,
    name               TEXT NOT NULL,
    category_id        INTEGER NOT NULL REFERENCES categories (id),
    value              TEXT NOT NULL,
    reference          TEXT NOT NULL DEFAULT 'R?',
    footprint          TEXT NOT NULL,
    symbol_id          TEXT NOT NULL,
    description        TEXT,
    datasheet          TEXT,
    keywords           TEXT DEFAULT '',
    fields             JSONB NOT NULL DEFAULT '{}'::jsonb,
    exclude_from_bom   BOOLEAN NOT NULL DEFAULT FALSE,
    exclude_from_board BOOLEAN NOT NULL DEFAULT FALSE,
    exclude_from_sim   BOOLEAN NOT NULL DEFAULT FALSE,
    is_active          BOOLEAN NOT NULL DEFAULT TRUE,
    created_at         TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at         TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS ix_parts_category_id ON parts (category_id);
CREATE INDEX IF NOT EXISTS ix_parts_keywords ON parts (keywords);
"#;

/// Rejects renames and refreshes `updated_at` on every update.
pub const GUARD_TOUCH_FUNCTION: &str = r#"
CREATE OR REPLACE FUNCTION parts_guard_and_touch()
RETURNS trigger LANGUAGE plpgsql AS $$
BEGIN
  IF TG_OP = 'UPDATE' AND NEW.name IS DISTINCT FROM OLD.name THEN
    RAISE EXCEPTION 'parts.name is immutable once assigned';
  END IF;
  NEW.updated_at := now();
  RETURN NEW;
END $$;
"#;

pub const DROP_GUARD_TOUCH_TRIGGER: &str = "DROP TRIGGER IF EXISTS trg_parts_guard_touch ON parts;";

pub const CREATE_GUARD_TOUCH_TRIGGER: &str = r#"
CREATE TRIGGER trg_parts_guard_touch
BEFORE UPDATE ON parts
FOR EACH ROW EXECUTE FUNCTION parts_guard_and_touch();
"#;

/// SQLSTATE raised by `RAISE EXCEPTION` in the guard trigger.
pub const SQLSTATE_RAISE_EXCEPTION: &str = "P0001";

/// SQLSTATE for a foreign key violation.
pub const SQLSTATE_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Statements that create the tables, in dependency order.
pub fn table_statements() -> [&'static str; 2] {
    [CREATE_CATEGORIES, CREATE_PARTS]
}

/// Statements that (re)install the guard trigger. Safe to run repeatedly.
pub fn trigger_statements() -> [&'static str; 3] {
    [
        GUARD_TOUCH_FUNCTION,
        DROP_GUARD_TOUCH_TRIGGER,
        CREATE_GUARD_TOUCH_TRIGGER,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_created_before_parts() {
        let stmts = table_statements();
        assert!(stmts[0].contains("CREATE TABLE IF NOT EXISTS categories"));
        assert!(stmts[1].contains("REFERENCES categories"));
    }

    #[test]
    fn trigger_is_dropped_before_recreate() {
        let stmts = trigger_statements();
        assert!(stmts[0].contains("parts_guard_and_touch"));
        assert!(stmts[1].starts_with("DROP TRIGGER IF EXISTS"));
        assert!(stmts[2].contains("BEFORE UPDATE ON parts"));
    }

    #[test]
    fn parts_fields_default_to_empty_object() {
        assert!(CREATE_PARTS.contains("DEFAULT '{}'::jsonb"));
    }
}
