mod analysis;
mod commands;
mod config;
mod display;
mod failure;
mod interactive;
mod summary;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::analysis::sampler::generate_games;
use crate::config::AppConfig;
use crate::failure::{Action, During, Failure};
use crate::summary::OpenAiSummarizer;
use loteria_db::db::{migrate, open_db};
use loteria_db::models::{parse_numbers, LotteryType};
use loteria_db::rusqlite::Connection;

#[derive(Parser)]
#[command(name = "loteria", about = "Génération, historique et analyse de jeux de loterie")]
struct Cli {
    /// Fichier de configuration JSON (défaut : loteria.json s'il existe)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lister les loteries disponibles
    Lotteries,

    /// Afficher le chemin de la base de données
    DbPath,

    /// Générer des jeux aléatoires
    Generate {
        /// Loterie
        #[arg(short, long, default_value = "megasena")]
        lottery: LotteryType,

        /// Nombre de jeux à générer
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Seed pour la reproductibilité
        #[arg(long)]
        seed: Option<u64>,

        /// Sauvegarder les jeux générés dans l'historique
        #[arg(short, long)]
        save: bool,

        /// Note attachée aux jeux sauvegardés
        #[arg(short, long, requires = "save")]
        note: Option<String>,
    },

    /// Sauvegarder un jeu saisi (ex: 04 08 15 16 23 42)
    Save {
        /// Loterie
        #[arg(short, long, default_value = "megasena")]
        lottery: LotteryType,

        /// Note attachée au jeu
        #[arg(short, long)]
        note: Option<String>,

        /// Numéros séparés par des espaces, virgules ou tirets
        #[arg(required = true, num_args = 1..)]
        numbers: Vec<String>,
    },

    /// Lister les jeux sauvegardés, du plus récent au plus ancien
    History {
        /// Loterie
        #[arg(short, long, default_value = "megasena")]
        lottery: LotteryType,

        /// Nombre de jeux à afficher (défaut : history_limit de la configuration)
        #[arg(long)]
        last: Option<u32>,
    },

    /// Supprimer un jeu sauvegardé
    Delete {
        /// Identifiant du jeu
        id: i64,
    },

    /// Numéros chauds et froids des jeux sauvegardés
    Analyze {
        /// Loterie
        #[arg(short, long, default_value = "megasena")]
        lottery: LotteryType,

        /// Demander en plus une analyse rédigée par IA
        #[arg(long)]
        ai: bool,
    },

    /// Mode interactif
    Interactive {
        /// Loterie de départ
        #[arg(short, long, default_value = "megasena")]
        lottery: LotteryType,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let path = config.database_path();

    match cli.command {
        Command::DbPath => {
            println!("{}", path.display());
            return Ok(());
        }
        Command::Generate { lottery, count, seed, save: false, .. } => {
            cmd_generate(lottery, count, seed);
            return Ok(());
        }
        _ => {}
    }

    let conn = open_db(&path)?;
    migrate(&conn)?;

    let outcome = match cli.command {
        Command::Generate { lottery, count, seed, note, .. } => {
            cmd_generate_and_save(&conn, lottery, count, seed, note)
        }
        Command::Save { lottery, note, numbers } => cmd_save(&conn, lottery, &numbers, note),
        Command::History { lottery, last } => {
            cmd_history(&conn, lottery, last.unwrap_or(config.history_limit))
        }
        Command::Lotteries => cmd_lotteries(&conn),
        Command::Delete { id } => cmd_delete(&conn, id),
        Command::Analyze { lottery, ai } => cmd_analyze(&conn, &config, lottery, ai),
        Command::Interactive { lottery } => {
            return interactive::run_interactive(&conn, &config, lottery);
        }
        Command::DbPath => Ok(()),
    };

    if let Err(failure) = outcome {
        failure.report();
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_generate(lottery: LotteryType, count: usize, seed: Option<u64>) -> Vec<Vec<u8>> {
    let games = generate_games(lottery, count, seed);
    display::display_generated(lottery, &games);
    games
}

fn cmd_generate_and_save(
    conn: &Connection,
    lottery: LotteryType,
    count: usize,
    seed: Option<u64>,
    note: Option<String>,
) -> Result<(), Failure> {
    for game in cmd_generate(lottery, count, seed) {
        let saved = commands::save_game(conn, lottery, &game, note.clone())?;
        display::display_saved(&saved);
    }
    Ok(())
}

fn cmd_save(
    conn: &Connection,
    lottery: LotteryType,
    raw_numbers: &[String],
    note: Option<String>,
) -> Result<(), Failure> {
    let numbers = parse_numbers(&raw_numbers.join(" ")).during(Action::Validate)?;
    let saved = commands::save_game(conn, lottery, &numbers, note)?;
    display::display_saved(&saved);
    Ok(())
}

fn cmd_history(conn: &Connection, lottery: LotteryType, last: u32) -> Result<(), Failure> {
    let games = commands::load_history(conn, lottery, last)?;
    display::display_history(lottery, &games);
    Ok(())
}

fn cmd_lotteries(conn: &Connection) -> Result<(), Failure> {
    let counts = commands::saved_counts(conn)?;
    display::display_lotteries(None, &counts);
    Ok(())
}

fn cmd_delete(conn: &Connection, id: i64) -> Result<(), Failure> {
    match commands::remove_game(conn, id)? {
        Some(game) => display::display_deleted(&game),
        None => println!("Aucun jeu #{id}."),
    }
    Ok(())
}

fn cmd_analyze(
    conn: &Connection,
    config: &AppConfig,
    lottery: LotteryType,
    ai: bool,
) -> Result<(), Failure> {
    let analysis = commands::analyze(conn, lottery)?;
    display::display_hot_cold(&analysis);

    if ai {
        let client = OpenAiSummarizer::from_config(&config.ai).during(Action::Summarize)?;
        let text = commands::summarize(&analysis, &client)?;
        display::display_summary(&text);
    }
    Ok(())
}
