use crate::errors::{AppError, ResultExt};
use crate::models::{Human, HumanFilter, NewHuman, UpdateHumanRequest};
use sqlx::{PgPool, Postgres, QueryBuilder};

const HUMAN_COLUMNS: &str =
    "id, name, surname, patronymic, age, gender, nationality, created_at";

/// Storage for enriched human records.
#[derive(Clone)]
pub struct HumanStorage {
    pool: PgPool,
}

impl HumanStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new record and return it as stored.
    pub async fn add_human(&self, human: &NewHuman) -> Result<Human, AppError> {
        let age = i32::try_from(human.attributes.age).unwrap_or(i32::MAX);

        let stored = sqlx::query_as::<_, Human>(&format!(
            r#"
            INSERT INTO people (name, surname, patronymic, age, gender, nationality)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            HUMAN_COLUMNS
        ))
        .bind(&human.name)
        .bind(&human.surname)
        .bind(&human.patronymic)
        .bind(age)
        .bind(human.attributes.gender.as_str())
        .bind(&human.attributes.nationality)
        .fetch_one(&self.pool)
        .await
        .context("inserting human")?;

        tracing::info!("✓ Stored human {} (id: {})", stored.name, stored.id);
        Ok(stored)
    }

    /// List records matching the filter, one page at a time.
    pub async fn get_humans(&self, filter: &HumanFilter) -> Result<Vec<Human>, AppError> {
        let mut query = build_filter_query(filter);
        let humans = query
            .build_query_as::<Human>()
            .fetch_all(&self.pool)
            .await
            .context("listing humans")?;

        Ok(humans)
    }

    /// Apply the supplied fields; absent fields keep their stored value.
    pub async fn update_human(&self, update: &UpdateHumanRequest) -> Result<Human, AppError> {
        if !update.has_changes() {
            return Err(AppError::BadRequest("nothing to update".to_string()));
        }

        let updated = sqlx::query_as::<_, Human>(&format!(
            r#"
            UPDATE people
               SET name        = COALESCE($1, name),
                   surname     = COALESCE($2, surname),
                   patronymic  = COALESCE($3, patronymic),
                   age         = COALESCE($4, age),
                   gender      = COALESCE($5, gender),
                   nationality = COALESCE($6, nationality)
             WHERE id = $7
            RETURNING {}
            "#,
            HUMAN_COLUMNS
        ))
        .bind(&update.name)
        .bind(&update.surname)
        .bind(&update.patronymic)
        .bind(update.age)
        .bind(&update.gender)
        .bind(&update.nationality)
        .bind(update.id)
        .fetch_optional(&self.pool)
        .await
        .context("updating human")?;

        updated.ok_or_else(|| AppError::NotFound("human not found".to_string()))
    }

    pub async fn delete_human(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("deleting human")?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("human not found".to_string()));
        }
        Ok(())
    }
}

/// Builds the paginated `SELECT` for a filter with every value bound as a
/// parameter.
pub fn build_filter_query(filter: &HumanFilter) -> QueryBuilder<'_, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {} FROM people", HUMAN_COLUMNS));
    let mut has_where = false;

    if let Some(ref name) = filter.name {
        condition(&mut query, &mut has_where, "name ILIKE ");
        query.push_bind(format!("%{}%", name));
    }
    if let Some(ref surname) = filter.surname {
        condition(&mut query, &mut has_where, "surname ILIKE ");
        query.push_bind(format!("%{}%", surname));
    }
    if let Some(ref patronymic) = filter.patronymic {
        condition(&mut query, &mut has_where, "patronymic ILIKE ");
        query.push_bind(format!("%{}%", patronymic));
    }
    if let Some(min_age) = filter.min_age {
        condition(&mut query, &mut has_where, "age >= ");
        query.push_bind(min_age);
    }
    if let Some(max_age) = filter.max_age {
        condition(&mut query, &mut has_where, "age <= ");
        query.push_bind(max_age);
    }
    if let Some(ref gender) = filter.gender {
        condition(&mut query, &mut has_where, "gender = ");
        query.push_bind(gender.as_str());
    }
    if let Some(ref nationality) = filter.nationality {
        condition(&mut query, &mut has_where, "nationality = ");
        query.push_bind(nationality.as_str());
    }
    if let Some(id) = filter.id {
        condition(&mut query, &mut has_where, "id = ");
        query.push_bind(id);
    }

    query.push(" ORDER BY id LIMIT ");
    query.push_bind(filter.page_size);
    query.push(" OFFSET ");
    query.push_bind(filter.offset());

    query
}

/// Appends `sql` as the next `WHERE`/`AND` condition.
fn condition(query: &mut QueryBuilder<'_, Postgres>, has_where: &mut bool, sql: &str) {
    query.push(if *has_where { " AND " } else { " WHERE " });
    query.push(sql);
    *has_where = true;
}
