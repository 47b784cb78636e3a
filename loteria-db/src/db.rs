use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::Path;

use crate::models::{Game, LotteryType, NewGame};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS games (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    lottery_type  TEXT NOT NULL,
    numbers       TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    is_saved      INTEGER NOT NULL DEFAULT 1,
    user_notes    TEXT
);
CREATE INDEX IF NOT EXISTS idx_games_history
    ON games (lottery_type, is_saved, created_at);
";

const GAME_COLUMNS: &str = "id, lottery_type, numbers, created_at, is_saved, user_notes";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("loteria.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    log::debug!("Base ouverte : {}", path.display());
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

pub fn insert_game(conn: &Connection, game: &NewGame) -> Result<Game> {
    insert_game_at(conn, game, Utc::now())
}

/// Variante de `insert_game` avec une date de création imposée.
pub fn insert_game_at(
    conn: &Connection,
    game: &NewGame,
    created_at: DateTime<Utc>,
) -> Result<Game> {
    let numbers = serde_json::to_string(&game.numbers)
        .context("Impossible de sérialiser les numéros")?;
    // Largeur fixe : l'ordre lexicographique suit l'ordre chronologique.
    let stamp = created_at.to_rfc3339_opts(SecondsFormat::Micros, true);

    conn.execute(
        "INSERT INTO games (lottery_type, numbers, created_at, is_saved, user_notes)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            game.lottery_type.as_str(),
            numbers,
            stamp,
            game.is_saved,
            game.user_notes,
        ],
    ).context("Échec de l'insertion")?;

    let id = conn.last_insert_rowid();
    log::debug!("Jeu {} inséré ({})", id, game.lottery_type);

    Ok(Game {
        id,
        lottery_type: game.lottery_type,
        numbers: game.numbers.clone(),
        created_at: parse_timestamp(&stamp)?,
        is_saved: game.is_saved,
        user_notes: game.user_notes.clone(),
    })
}

/// Jeux sauvegardés d'une loterie, du plus récent au plus ancien.
pub fn fetch_saved_games(
    conn: &Connection,
    lottery_type: LotteryType,
    limit: u32,
) -> Result<Vec<Game>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS} FROM games
         WHERE lottery_type = ?1 AND is_saved = 1
         ORDER BY created_at DESC, id DESC LIMIT ?2"
    ))?;
    let games = stmt
        .query_map(rusqlite::params![lottery_type.as_str(), limit], game_from_row)?
        .collect::<Result<Vec<_>, _>>()
        .context("Échec de la lecture de l'historique")?;
    Ok(games)
}

/// Numéros de tous les jeux sauvegardés d'une loterie, sans limite.
pub fn fetch_saved_numbers(conn: &Connection, lottery_type: LotteryType) -> Result<Vec<Vec<u8>>> {
    let mut stmt = conn.prepare(
        "SELECT numbers FROM games WHERE lottery_type = ?1 AND is_saved = 1"
    )?;
    let rows = stmt
        .query_map([lottery_type.as_str()], |row| {
            let raw: String = row.get(0)?;
            parse_numbers_column(0, &raw)
        })?
        .collect::<Result<Vec<_>, _>>()
        .context("Échec de la lecture des numéros")?;
    Ok(rows)
}

pub fn fetch_game(conn: &Connection, id: i64) -> Result<Option<Game>> {
    let game = conn
        .query_row(
            &format!("SELECT {GAME_COLUMNS} FROM games WHERE id = ?1"),
            [id],
            game_from_row,
        )
        .optional()
        .with_context(|| format!("Échec de la lecture du jeu {}", id))?;
    Ok(game)
}

/// Renvoie `false` si aucun jeu ne porte cet identifiant.
pub fn delete_game(conn: &Connection, id: i64) -> Result<bool> {
    let changed = conn
        .execute("DELETE FROM games WHERE id = ?1", [id])
        .with_context(|| format!("Échec de la suppression du jeu {}", id))?;
    Ok(changed > 0)
}

pub fn count_saved_games(conn: &Connection, lottery_type: LotteryType) -> Result<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM games WHERE lottery_type = ?1 AND is_saved = 1",
        [lottery_type.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

fn game_from_row(row: &Row<'_>) -> rusqlite::Result<Game> {
    let lottery_raw: String = row.get(1)?;
    let numbers_raw: String = row.get(2)?;
    let created_raw: String = row.get(3)?;

    let lottery_type = lottery_raw
        .parse::<LotteryType>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, e.into()))?;
    let created_at = parse_timestamp(&created_raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;

    Ok(Game {
        id: row.get(0)?,
        lottery_type,
        numbers: parse_numbers_column(2, &numbers_raw)?,
        created_at,
        is_saved: row.get(4)?,
        user_notes: row.get(5)?,
    })
}

fn parse_numbers_column(idx: usize, raw: &str) -> rusqlite::Result<Vec<u8>> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Date invalide : '{}'", raw))?;
    Ok(parsed.with_timezone(&Utc))
}
