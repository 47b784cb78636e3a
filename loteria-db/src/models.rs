use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LotteryType {
    #[default]
    Megasena,
    Quina,
    Lotofacil,
}

/// Plage de numéros et taille de grille d'une loterie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotteryConfig {
    pub name: &'static str,
    pub min_number: u8,
    pub max_number: u8,
    pub numbers_per_game: usize,
}

const MEGASENA: LotteryConfig = LotteryConfig {
    name: "Mega-Sena",
    min_number: 1,
    max_number: 60,
    numbers_per_game: 6,
};

const QUINA: LotteryConfig = LotteryConfig {
    name: "Quina",
    min_number: 1,
    max_number: 80,
    numbers_per_game: 5,
};

const LOTOFACIL: LotteryConfig = LotteryConfig {
    name: "Lotofácil",
    min_number: 1,
    max_number: 25,
    numbers_per_game: 15,
};

impl LotteryType {
    pub const ALL: [LotteryType; 3] = [
        LotteryType::Megasena,
        LotteryType::Quina,
        LotteryType::Lotofacil,
    ];

    pub fn config(&self) -> &'static LotteryConfig {
        match self {
            LotteryType::Megasena => &MEGASENA,
            LotteryType::Quina => &QUINA,
            LotteryType::Lotofacil => &LOTOFACIL,
        }
    }

    /// Identifiant stocké en base.
    pub fn as_str(&self) -> &'static str {
        match self {
            LotteryType::Megasena => "megasena",
            LotteryType::Quina => "quina",
            LotteryType::Lotofacil => "lotofacil",
        }
    }
}

impl fmt::Display for LotteryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LotteryType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "megasena" => Ok(LotteryType::Megasena),
            "quina" => Ok(LotteryType::Quina),
            "lotofacil" => Ok(LotteryType::Lotofacil),
            other => bail!("Loterie inconnue : '{}'", other),
        }
    }
}

impl LotteryConfig {
    pub fn numbers(&self) -> RangeInclusive<u8> {
        self.min_number..=self.max_number
    }

    pub fn range_size(&self) -> usize {
        (self.max_number - self.min_number) as usize + 1
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers().contains(&number)
    }
}

/// Jeu enregistré. `numbers` est trié et sans doublon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub lottery_type: LotteryType,
    pub numbers: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub is_saved: bool,
    pub user_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub lottery_type: LotteryType,
    pub numbers: Vec<u8>,
    pub is_saved: bool,
    pub user_notes: Option<String>,
}

impl NewGame {
    /// Jeu sauvegardé dans l'historique. Une note vide est ignorée.
    pub fn saved(lottery_type: LotteryType, numbers: Vec<u8>, note: Option<String>) -> Self {
        let user_notes = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Self {
            lottery_type,
            numbers,
            is_saved: true,
            user_notes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFrequency {
    pub number: u8,
    pub frequency: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotColdAnalysis {
    pub lottery_type: LotteryType,
    pub hot_numbers: Vec<NumberFrequency>,
    pub cold_numbers: Vec<NumberFrequency>,
    pub games_analyzed: usize,
    pub last_updated: DateTime<Utc>,
}

pub fn validate_game(lottery_type: LotteryType, numbers: &[u8]) -> Result<()> {
    let config = lottery_type.config();
    if numbers.len() != config.numbers_per_game {
        bail!(
            "{} attend {} numéros, {} reçus",
            config.name,
            config.numbers_per_game,
            numbers.len()
        );
    }
    for &n in numbers {
        if !config.contains(n) {
            bail!(
                "Numéro {} hors limites ({}-{})",
                n,
                config.min_number,
                config.max_number
            );
        }
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    Ok(())
}

/// Valide une grille saisie et la renvoie triée.
pub fn normalize_game(lottery_type: LotteryType, numbers: &[u8]) -> Result<Vec<u8>> {
    validate_game(lottery_type, numbers)?;
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();
    Ok(sorted)
}

/// Accepte les séparateurs espace, virgule ou tiret, donc aussi la sortie de `format_numbers`.
/// Un tiret collé devant ou derrière un numéro (`-2`, `3-`) est refusé.
pub fn parse_numbers(input: &str) -> Result<Vec<u8>> {
    let mut numbers = Vec::new();
    for token in input.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() || token == "-" {
            continue;
        }
        for part in token.split('-') {
            let n = part
                .parse::<u8>()
                .with_context(|| format!("Numéro invalide : '{}'", token))?;
            numbers.push(n);
        }
    }
    Ok(numbers)
}

pub fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}
