use sqlx::{postgres::PgPoolOptions, PgPool};

const CREATE_PEOPLE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS people (
        id          BIGSERIAL PRIMARY KEY,
        name        TEXT NOT NULL,
        surname     TEXT NOT NULL,
        patronymic  TEXT NOT NULL DEFAULT '',
        age         INTEGER NOT NULL DEFAULT 0,
        gender      TEXT NOT NULL DEFAULT 'unknown',
        nationality TEXT NOT NULL DEFAULT '',
        created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        // Bootstrap schema
        sqlx::query(CREATE_PEOPLE_TABLE).execute(&pool).await?;

        Ok(Self { pool })
    }
}
