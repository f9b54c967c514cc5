use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Game;

/// Get a single game by id.
pub async fn get_game(pool: &PgPool, game_id: Uuid) -> Result<Option<Game>, sqlx::Error> {
    sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = $1")
        .bind(game_id)
        .fetch_optional(pool)
        .await
}

/// Insert a scheduled game.
pub async fn insert_game(
    pool: &PgPool,
    home_team: &str,
    away_team: &str,
    game_date: NaiveDate,
    season: &str,
) -> Result<Game, sqlx::Error> {
    sqlx::query_as::<_, Game>(
        r#"
        INSERT INTO games (home_team, away_team, game_date, season)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(home_team)
    .bind(away_team)
    .bind(game_date)
    .bind(season)
    .fetch_one(pool)
    .await
}

/// Mark a game final with its end score. Returns false if the game is gone.
pub async fn set_final_score(
    pool: &PgPool,
    game_id: Uuid,
    home_score: i32,
    away_score: i32,
) -> Result<bool, sqlx::Error> {
    let res = sqlx::query(
        r#"
        UPDATE games
        SET status = 'Final', home_score = $2, away_score = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(game_id)
    .bind(home_score)
    .bind(away_score)
    .execute(pool)
    .await?;

    Ok(res.rows_affected() > 0)
}
