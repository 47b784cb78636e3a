use anyhow::anyhow;
use loteria_db::db::{
    count_saved_games, delete_game, fetch_game, fetch_saved_games, fetch_saved_numbers,
    insert_game,
};
use loteria_db::models::{normalize_game, Game, HotColdAnalysis, LotteryType, NewGame};
use loteria_db::rusqlite::Connection;

use crate::analysis::analyze_hot_cold;
use crate::failure::{Action, During, Failure};
use crate::summary::{Summarizer, SummaryRequest};

pub fn save_game(
    conn: &Connection,
    lottery_type: LotteryType,
    numbers: &[u8],
    note: Option<String>,
) -> Result<Game, Failure> {
    let numbers = normalize_game(lottery_type, numbers).during(Action::Validate)?;
    let game = insert_game(conn, &NewGame::saved(lottery_type, numbers, note))
        .during(Action::Save)?;
    log::info!("Jeu {} sauvegardé pour {}", game.id, lottery_type);
    Ok(game)
}

pub fn load_history(
    conn: &Connection,
    lottery_type: LotteryType,
    limit: u32,
) -> Result<Vec<Game>, Failure> {
    fetch_saved_games(conn, lottery_type, limit).during(Action::LoadHistory)
}

/// Nombre de jeux sauvegardés par loterie, dans l'ordre de `LotteryType::ALL`.
pub fn saved_counts(conn: &Connection) -> Result<Vec<(LotteryType, u32)>, Failure> {
    LotteryType::ALL
        .iter()
        .map(|&lottery| count_saved_games(conn, lottery).map(|n| (lottery, n)))
        .collect::<anyhow::Result<Vec<_>>>()
        .during(Action::LoadHistory)
}

/// Renvoie le jeu supprimé, `None` s'il n'existait pas.
pub fn remove_game(conn: &Connection, id: i64) -> Result<Option<Game>, Failure> {
    let Some(game) = fetch_game(conn, id).during(Action::Delete)? else {
        log::warn!("Jeu {} introuvable", id);
        return Ok(None);
    };
    delete_game(conn, id).during(Action::Delete)?;
    log::info!("Jeu {} supprimé", id);
    Ok(Some(game))
}

pub fn analyze(conn: &Connection, lottery_type: LotteryType) -> Result<HotColdAnalysis, Failure> {
    let games = fetch_saved_numbers(conn, lottery_type).during(Action::Analyze)?;
    Ok(analyze_hot_cold(lottery_type, &games))
}

/// Sans numéro chaud, il n'y a rien à résumer : aucune requête n'est envoyée.
pub fn summarize(
    analysis: &HotColdAnalysis,
    summarizer: &dyn Summarizer,
) -> Result<String, Failure> {
    if analysis.hot_numbers.is_empty() {
        return Err(Failure::new(
            Action::Summarize,
            anyhow!("aucun jeu sauvegardé pour {}", analysis.lottery_type),
        ));
    }
    summarizer
        .summarize(&SummaryRequest::from_analysis(analysis))
        .during(Action::Summarize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use loteria_db::db::migrate;
    use std::cell::RefCell;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    struct FakeSummarizer {
        reply: Option<&'static str>,
        seen: RefCell<Vec<SummaryRequest>>,
    }

    impl FakeSummarizer {
        fn new(reply: Option<&'static str>) -> Self {
            Self { reply, seen: RefCell::new(Vec::new()) }
        }
    }

    impl Summarizer for FakeSummarizer {
        fn summarize(&self, request: &SummaryRequest) -> Result<String> {
            self.seen.borrow_mut().push(request.clone());
            match self.reply {
                Some(text) => Ok(text.to_string()),
                None => bail!("HTTP 500"),
            }
        }
    }

    #[test]
    fn test_save_sorts_and_roundtrips() {
        let conn = setup();
        let note = Some("sonho".to_string());
        let saved = save_game(&conn, LotteryType::Quina, &[44, 2, 80, 17, 9], note).unwrap();
        assert_eq!(saved.numbers, vec![2, 9, 17, 44, 80]);

        let history = load_history(&conn, LotteryType::Quina, 50).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].numbers, saved.numbers);
        assert_eq!(history[0].user_notes.as_deref(), Some("sonho"));
    }

    #[test]
    fn test_save_rejects_invalid_game() {
        let conn = setup();
        let failure = save_game(&conn, LotteryType::Megasena, &[1, 2, 3], None).unwrap_err();
        assert_eq!(failure.action, Action::Validate);
        assert!(load_history(&conn, LotteryType::Megasena, 50).unwrap().is_empty());
    }

    #[test]
    fn test_store_failure_is_reported_per_action() {
        // sans migration, la table n'existe pas
        let conn = Connection::open_in_memory().unwrap();
        let quina = LotteryType::Quina;
        let save = save_game(&conn, quina, &[1, 2, 3, 4, 5], None).unwrap_err();
        assert_eq!(save.action, Action::Save);
        let history = load_history(&conn, quina, 50).unwrap_err();
        assert_eq!(history.action, Action::LoadHistory);
        assert_eq!(saved_counts(&conn).unwrap_err().action, Action::LoadHistory);
        assert_eq!(remove_game(&conn, 1).unwrap_err().action, Action::Delete);
        assert_eq!(analyze(&conn, quina).unwrap_err().action, Action::Analyze);
    }

    #[test]
    fn test_remove_game_keeps_others() {
        let conn = setup();
        let a = save_game(&conn, LotteryType::Megasena, &[1, 2, 3, 4, 5, 6], None).unwrap();
        let b = save_game(&conn, LotteryType::Megasena, &[10, 20, 30, 40, 50, 60], None)
            .unwrap();

        let removed = remove_game(&conn, a.id).unwrap().unwrap();
        assert_eq!(removed.numbers, vec![1, 2, 3, 4, 5, 6]);
        assert!(remove_game(&conn, a.id).unwrap().is_none());

        let history = load_history(&conn, LotteryType::Megasena, 50).unwrap();
        assert_eq!(history.iter().map(|g| g.id).collect::<Vec<_>>(), vec![b.id]);
    }

    #[test]
    fn test_saved_counts_per_lottery() {
        let conn = setup();
        save_game(&conn, LotteryType::Quina, &[1, 2, 3, 4, 5], None).unwrap();
        save_game(&conn, LotteryType::Quina, &[6, 7, 8, 9, 10], None).unwrap();
        save_game(&conn, LotteryType::Megasena, &[1, 2, 3, 4, 5, 6], None).unwrap();

        let counts = saved_counts(&conn).unwrap();
        assert_eq!(
            counts,
            vec![
                (LotteryType::Megasena, 1),
                (LotteryType::Quina, 2),
                (LotteryType::Lotofacil, 0),
            ]
        );
    }

    #[test]
    fn test_analyze_uses_saved_games_of_lottery() {
        let conn = setup();
        let games = [[7, 1, 2, 3, 4, 5], [7, 11, 12, 13, 14, 15], [7, 21, 22, 23, 24, 25]];
        for game in games {
            save_game(&conn, LotteryType::Megasena, &game, None).unwrap();
        }
        save_game(&conn, LotteryType::Quina, &[1, 2, 3, 4, 5], None).unwrap();

        let analysis = analyze(&conn, LotteryType::Megasena).unwrap();
        assert_eq!(analysis.games_analyzed, 3);
        assert_eq!(analysis.hot_numbers[0].number, 7);
        assert_eq!(analysis.hot_numbers[0].frequency, 3);
    }

    #[test]
    fn test_summarize_forwards_top_five() {
        let conn = setup();
        save_game(&conn, LotteryType::Quina, &[1, 2, 3, 4, 5], None).unwrap();
        save_game(&conn, LotteryType::Quina, &[1, 2, 3, 4, 6], None).unwrap();
        let analysis = analyze(&conn, LotteryType::Quina).unwrap();

        let fake = FakeSummarizer::new(Some("Analyse"));
        assert_eq!(summarize(&analysis, &fake).unwrap(), "Analyse");

        let seen = fake.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].hot_numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(seen[0].cold_numbers, vec![7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_summarize_failure_is_reported() {
        let conn = setup();
        save_game(&conn, LotteryType::Quina, &[1, 2, 3, 4, 5], None).unwrap();
        let analysis = analyze(&conn, LotteryType::Quina).unwrap();

        let failure = summarize(&analysis, &FakeSummarizer::new(None)).unwrap_err();
        assert_eq!(failure.action, Action::Summarize);
    }

    #[test]
    fn test_summarize_without_history_sends_nothing() {
        let conn = setup();
        let analysis = analyze(&conn, LotteryType::Lotofacil).unwrap();

        let fake = FakeSummarizer::new(Some("Analyse"));
        assert!(summarize(&analysis, &fake).is_err());
        assert!(fake.seen.borrow().is_empty());
    }
}
