use std::io::{self, Write};

use anyhow::{Context, Result};
use loteria_db::models::{format_numbers, parse_numbers, Game, HotColdAnalysis, LotteryType};
use loteria_db::rusqlite::Connection;

use crate::analysis::sampler::generate_games;
use crate::commands;
use crate::config::AppConfig;
use crate::display;
use crate::failure::{Action, During, Failure};
use crate::summary::OpenAiSummarizer;

#[derive(Debug, PartialEq)]
enum InteractiveCommand {
    Generate,
    Save,
    History,
    Delete,
    Analyze,
    Summarize,
    Lottery,
    Quit,
}

fn parse_command(input: &str) -> Option<InteractiveCommand> {
    match input.trim().to_lowercase().as_str() {
        "1" | "generer" | "générer" | "generate" | "gen" => Some(InteractiveCommand::Generate),
        "2" | "sauvegarder" | "save" | "sav" => Some(InteractiveCommand::Save),
        "3" | "historique" | "history" | "hist" => Some(InteractiveCommand::History),
        "4" | "supprimer" | "delete" | "del" => Some(InteractiveCommand::Delete),
        "5" | "analyser" | "analyze" | "ana" => Some(InteractiveCommand::Analyze),
        "6" | "ia" | "ai" | "resume" | "résumé" => Some(InteractiveCommand::Summarize),
        "7" | "loterie" | "lottery" | "lot" => Some(InteractiveCommand::Lottery),
        "8" | "quitter" | "quit" | "q" | "exit" => Some(InteractiveCommand::Quit),
        _ => None,
    }
}

fn display_menu(session: &Session) {
    println!();
    println!("── {} ──", session.lottery_type.config().name);
    match &session.current_game {
        Some(game) => println!("  Jeu courant : {}", format_numbers(game)),
        None => println!("  Aucun jeu courant"),
    }
    println!("  1. generer     Générer un jeu");
    println!("  2. sauvegarder Sauvegarder le jeu courant");
    println!("  3. historique  Jeux sauvegardés");
    println!("  4. supprimer   Supprimer un jeu");
    println!("  5. analyser    Numéros chauds et froids");
    println!("  6. ia          Analyse IA");
    println!("  7. loterie     Changer de loterie");
    println!("  8. quitter     Quitter");
    println!();
}

/// État d'une session : loterie choisie, jeu affiché, historique et analyse affichés.
#[derive(Debug, Default)]
struct Session {
    lottery_type: LotteryType,
    current_game: Option<Vec<u8>>,
    history: Vec<Game>,
    analysis: Option<HotColdAnalysis>,
}

impl Session {
    fn new(lottery_type: LotteryType) -> Self {
        Self {
            lottery_type,
            ..Self::default()
        }
    }

    /// Un jeu généré pour une autre loterie n'est plus valide.
    fn select(&mut self, lottery_type: LotteryType) {
        if lottery_type != self.lottery_type {
            *self = Self::new(lottery_type);
        }
    }

    fn forget(&mut self, id: i64) {
        self.history.retain(|g| g.id != id);
    }
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    let read = io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        anyhow::bail!("Fin de l'entrée");
    }
    Ok(input.trim().to_string())
}

fn generate_interactive(session: &mut Session) {
    let game = generate_games(session.lottery_type, 1, None).remove(0);
    display::display_generated(session.lottery_type, std::slice::from_ref(&game));
    session.current_game = Some(game);
}

fn save_interactive(conn: &Connection, config: &AppConfig, session: &mut Session) -> Result<()> {
    let numbers = match &session.current_game {
        Some(game) => game.clone(),
        None => {
            let input = prompt("Aucun jeu courant. Saisissez vos numéros (vide = annuler) : ")?;
            if input.is_empty() {
                println!("Générez un jeu d'abord pour pouvoir le sauvegarder.");
                return Ok(());
            }
            match parse_entered_numbers(&input) {
                Ok(numbers) => numbers,
                Err(failure) => {
                    failure.report();
                    return Ok(());
                }
            }
        }
    };
    let note = prompt("Note (optionnelle) : ")?;

    match commands::save_game(conn, session.lottery_type, &numbers, Some(note)) {
        Ok(game) => {
            display::display_saved(&game);
            session.analysis = None;
            refresh_history(conn, config, session);
        }
        Err(failure) => failure.report(),
    }
    Ok(())
}

fn parse_entered_numbers(input: &str) -> Result<Vec<u8>, Failure> {
    parse_numbers(input).during(Action::Validate)
}

fn refresh_history(conn: &Connection, config: &AppConfig, session: &mut Session) {
    match commands::load_history(conn, session.lottery_type, config.history_limit) {
        Ok(games) => session.history = games,
        Err(failure) => failure.report(),
    }
}

fn delete_interactive(conn: &Connection, session: &mut Session) -> Result<()> {
    let raw = prompt("Identifiant du jeu à supprimer : ")?;
    let id: i64 = raw.parse().context("Identifiant invalide")?;

    match commands::remove_game(conn, id) {
        Ok(Some(game)) => {
            session.forget(game.id);
            session.analysis = None;
            display::display_deleted(&game);
        }
        Ok(None) => println!("Aucun jeu #{id}."),
        Err(failure) => failure.report(),
    }
    Ok(())
}

fn summarize_interactive(conn: &Connection, config: &AppConfig, session: &mut Session) {
    if session.analysis.is_none() {
        match commands::analyze(conn, session.lottery_type) {
            Ok(analysis) => session.analysis = Some(analysis),
            Err(failure) => return failure.report(),
        }
    }
    let Some(analysis) = &session.analysis else {
        return;
    };

    let outcome = OpenAiSummarizer::from_config(&config.ai)
        .during(Action::Summarize)
        .and_then(|client| commands::summarize(analysis, &client));
    match outcome {
        Ok(text) => display::display_summary(&text),
        Err(failure) => failure.report(),
    }
}

fn select_interactive(conn: &Connection, session: &mut Session) -> Result<()> {
    let counts = commands::saved_counts(conn).unwrap_or_else(|failure| {
        failure.report();
        Vec::new()
    });
    display::display_lotteries(Some(session.lottery_type), &counts);
    let input = prompt("Loterie (megasena, quina, lotofacil) : ")?;
    let lottery_type: LotteryType = input.parse()?;
    session.select(lottery_type);
    Ok(())
}

pub fn run_interactive(
    conn: &Connection,
    config: &AppConfig,
    lottery_type: LotteryType,
) -> Result<()> {
    println!("Bienvenue dans le mode interactif de loteria !");
    let mut session = Session::new(lottery_type);

    loop {
        display_menu(&session);
        let input = match prompt("> ") {
            Ok(s) => s,
            Err(_) => break, // EOF / Ctrl+D
        };

        if input.is_empty() {
            continue;
        }

        let result = match parse_command(&input) {
            Some(InteractiveCommand::Quit) => {
                println!("Au revoir !");
                break;
            }
            Some(InteractiveCommand::Generate) => {
                generate_interactive(&mut session);
                Ok(())
            }
            Some(InteractiveCommand::Save) => save_interactive(conn, config, &mut session),
            Some(InteractiveCommand::History) => {
                refresh_history(conn, config, &mut session);
                display::display_history(session.lottery_type, &session.history);
                Ok(())
            }
            Some(InteractiveCommand::Delete) => delete_interactive(conn, &mut session),
            Some(InteractiveCommand::Analyze) => {
                match commands::analyze(conn, session.lottery_type) {
                    Ok(analysis) => {
                        display::display_hot_cold(&analysis);
                        session.analysis = Some(analysis);
                    }
                    Err(failure) => failure.report(),
                }
                Ok(())
            }
            Some(InteractiveCommand::Summarize) => {
                summarize_interactive(conn, config, &mut session);
                Ok(())
            }
            Some(InteractiveCommand::Lottery) => select_interactive(conn, &mut session),
            None => {
                println!(
                    "Commande inconnue : '{}'. Tapez un numéro (1-8) ou un nom de commande.",
                    input
                );
                Ok(())
            }
        };

        if let Err(e) = result {
            println!("Erreur: {e:#}");
        }
    }

    Ok(())
}
