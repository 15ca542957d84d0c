//! Declarative schema bootstrap.
//!
//! The schema is an explicit value enumerating every table, index, and
//! trigger, built once by [`schema`] and handed to [`SchemaDefinition::ensure`].
//! Every statement is additive and idempotent: tables and indexes are
//! created only if absent, and existing tables are never dropped or
//! altered.
//!
//! Idempotence is per invocation, not cross-invocation atomic: the
//! drop-then-create trigger pairs can race if two `ensure` calls overlap.
//! The lifecycle runs `ensure` exactly once, during startup, before the
//! server accepts requests.

use sqlx::PgPool;

use super::DbError;

/// One table plus its secondary indexes and triggers.
pub struct TableSpec {
    pub name: &'static str,
    pub create: &'static str,
    pub indexes: &'static [&'static str],
    pub triggers: &'static [&'static str],
}

/// The full persisted schema, in foreign-key dependency order.
pub struct SchemaDefinition {
    /// Statements run before any table (trigger helper functions).
    setup: &'static [&'static str],
    tables: &'static [TableSpec],
}

/// Refreshes `updated_at` whenever a row is mutated.
const TOUCH_UPDATED_AT_FN: &str = r#"
CREATE OR REPLACE FUNCTION touch_updated_at() RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql
"#;

const SOURCES: TableSpec = TableSpec {
    name: "sources",
    create: r#"
CREATE TABLE IF NOT EXISTS sources (
    id              BIGSERIAL PRIMARY KEY,
    name            TEXT NOT NULL,
    feed_url        TEXT NOT NULL UNIQUE,
    site_url        TEXT,
    source_type     TEXT NOT NULL DEFAULT 'rss',
    source_weight   DOUBLE PRECISION DEFAULT 1.0,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    last_fetched_at TIMESTAMPTZ,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#,
    indexes: &[
        "CREATE INDEX IF NOT EXISTS ix_sources_feed_url ON sources (feed_url)",
        "CREATE INDEX IF NOT EXISTS ix_sources_is_active ON sources (is_active)",
    ],
    triggers: &[
        "DROP TRIGGER IF EXISTS sources_touch_updated_at ON sources",
        "CREATE TRIGGER sources_touch_updated_at BEFORE UPDATE ON sources \
         FOR EACH ROW EXECUTE FUNCTION touch_updated_at()",
    ],
};

const ARTICLES: TableSpec = TableSpec {
    name: "articles",
    create: r#"
CREATE TABLE IF NOT EXISTS articles (
    id                   BIGSERIAL PRIMARY KEY,
    source_id            BIGINT NOT NULL REFERENCES sources (id) ON DELETE CASCADE,
    url                  TEXT NOT NULL UNIQUE,
    canonical_url        TEXT,
    title                TEXT NOT NULL,
    summary              TEXT,
    content              TEXT,
    author               TEXT,
    language             TEXT,
    tags                 TEXT[],
    categories           TEXT[],
    content_length       INTEGER,
    reading_time_minutes INTEGER,
    published_at         TIMESTAMPTZ,
    ingested_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    rating               DOUBLE PRECISION,
    source_weight        DOUBLE PRECISION,
    freshness_score      DOUBLE PRECISION,
    quality_score        DOUBLE PRECISION,
    final_score          DOUBLE PRECISION
)
"#,
    indexes: &[
        "CREATE INDEX IF NOT EXISTS ix_articles_url ON articles (url)",
        "CREATE INDEX IF NOT EXISTS ix_articles_source_id ON articles (source_id)",
        "CREATE INDEX IF NOT EXISTS ix_articles_published_at ON articles (published_at)",
        "CREATE INDEX IF NOT EXISTS ix_articles_final_score ON articles (final_score)",
    ],
    triggers: &[
        "DROP TRIGGER IF EXISTS articles_touch_updated_at ON articles",
        "CREATE TRIGGER articles_touch_updated_at BEFORE UPDATE ON articles \
         FOR EACH ROW EXECUTE FUNCTION touch_updated_at()",
    ],
};

const INGESTION_RUNS: TableSpec = TableSpec {
    name: "ingestion_runs",
    create: r#"
CREATE TABLE IF NOT EXISTS ingestion_runs (
    id            BIGSERIAL PRIMARY KEY,
    started_at    TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    completed_at  TIMESTAMPTZ,
    status        TEXT NOT NULL,
    error_message TEXT
)
"#,
    indexes: &[
        "CREATE INDEX IF NOT EXISTS ix_ingestion_runs_started_at ON ingestion_runs (started_at)",
        "CREATE INDEX IF NOT EXISTS ix_ingestion_runs_status ON ingestion_runs (status)",
    ],
    triggers: &[],
};

// source_id is ON DELETE SET NULL, not CASCADE: deleting a source must
// preserve historical run records with the reference cleared.
const INGESTION_SOURCE_RUNS: TableSpec = TableSpec {
    name: "ingestion_source_runs",
    create: r#"
CREATE TABLE IF NOT EXISTS ingestion_source_runs (
    id                BIGSERIAL PRIMARY KEY,
    ingestion_run_id  BIGINT NOT NULL REFERENCES ingestion_runs (id) ON DELETE CASCADE,
    source_id         BIGINT REFERENCES sources (id) ON DELETE SET NULL,
    started_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    completed_at      TIMESTAMPTZ,
    status            TEXT NOT NULL,
    articles_fetched  INTEGER NOT NULL DEFAULT 0,
    articles_inserted INTEGER NOT NULL DEFAULT 0,
    articles_updated  INTEGER NOT NULL DEFAULT 0,
    error_message     TEXT
)
"#,
    indexes: &[
        "CREATE INDEX IF NOT EXISTS ix_isr_ingestion_run_id ON ingestion_source_runs (ingestion_run_id)",
        "CREATE INDEX IF NOT EXISTS ix_isr_source_id ON ingestion_source_runs (source_id)",
        "CREATE INDEX IF NOT EXISTS ix_isr_status ON ingestion_source_runs (status)",
    ],
    triggers: &[],
};

static SETUP: &[&str] = &[TOUCH_UPDATED_AT_FN];
static TABLES: &[TableSpec] = &[SOURCES, ARTICLES, INGESTION_RUNS, INGESTION_SOURCE_RUNS];

/// Build the schema definition for the service.
pub fn schema() -> SchemaDefinition {
    SchemaDefinition {
        setup: SETUP,
        tables: TABLES,
    }
}

impl SchemaDefinition {
    pub fn tables(&self) -> &[TableSpec] {
        self.tables
    }

    /// Create any missing tables, indexes, and triggers.
    ///
    /// Must run after a successful connect and before any entity access.
    /// Safe to run repeatedly.
    pub async fn ensure(&self, pool: &PgPool) -> Result<(), DbError> {
        tracing::info!("Creating database schema");

        for stmt in self.setup {
            run(pool, "(setup)", stmt).await?;
        }

        for table in self.tables {
            run(pool, table.name, table.create).await?;
            for index in table.indexes {
                run(pool, table.name, index).await?;
            }
            for trigger in table.triggers {
                run(pool, table.name, trigger).await?;
            }
        }

        tracing::info!("Database schema ready");
        Ok(())
    }
}

async fn run(pool: &PgPool, table: &str, stmt: &str) -> Result<(), DbError> {
    sqlx::query(stmt)
        .execute(pool)
        .await
        .map_err(|source| DbError::Schema {
            table: table.to_string(),
            source,
        })?;
    Ok(())
}
