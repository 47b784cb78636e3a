pub mod sampler;

use chrono::Utc;

use loteria_db::models::{HotColdAnalysis, LotteryConfig, LotteryType, NumberFrequency};

/// Taille des classements chauds et froids.
pub const RANKING_SIZE: usize = 10;

/// Nombre d'apparitions de chaque numéro de la plage, zéros compris.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTally {
    min_number: u8,
    counts: Vec<u32>,
}

impl FrequencyTally {
    pub fn new(config: &LotteryConfig) -> Self {
        Self {
            min_number: config.min_number,
            counts: vec![0; config.range_size()],
        }
    }

    /// Les numéros hors plage sont ignorés.
    pub fn from_games(config: &LotteryConfig, games: &[Vec<u8>]) -> Self {
        let mut tally = Self::new(config);
        for game in games {
            for &n in game {
                tally.record(n);
            }
        }
        tally
    }

    pub fn record(&mut self, number: u8) {
        if let Some(count) = number
            .checked_sub(self.min_number)
            .and_then(|idx| self.counts.get_mut(idx as usize))
        {
            *count += 1;
        }
    }

    /// Parcourt la plage dans l'ordre croissant des numéros.
    pub fn iter(&self) -> impl Iterator<Item = NumberFrequency> + '_ {
        let min_number = self.min_number;
        self.counts.iter().enumerate().map(move |(idx, &frequency)| NumberFrequency {
            number: min_number + idx as u8,
            frequency,
        })
    }
}

/// Numéros sortis au moins une fois, par fréquence décroissante puis numéro croissant.
pub fn hot_numbers(tally: &FrequencyTally, limit: usize) -> Vec<NumberFrequency> {
    let mut ranked: Vec<NumberFrequency> = tally.iter().filter(|f| f.frequency > 0).collect();
    // tri stable sur une plage déjà croissante : égalités par numéro croissant
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    ranked.truncate(limit);
    ranked
}

/// Toute la plage, jamais sortis compris, par fréquence croissante puis numéro croissant.
pub fn cold_numbers(tally: &FrequencyTally, limit: usize) -> Vec<NumberFrequency> {
    let mut ranked: Vec<NumberFrequency> = tally.iter().collect();
    ranked.sort_by_key(|f| f.frequency);
    ranked.truncate(limit);
    ranked
}

pub fn analyze_hot_cold(lottery_type: LotteryType, games: &[Vec<u8>]) -> HotColdAnalysis {
    let tally = FrequencyTally::from_games(lottery_type.config(), games);
    log::debug!("{} jeux analysés pour {}", games.len(), lottery_type);

    HotColdAnalysis {
        lottery_type,
        hot_numbers: hot_numbers(&tally, RANKING_SIZE),
        cold_numbers: cold_numbers(&tally, RANKING_SIZE),
        games_analyzed: games.len(),
        last_updated: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq(number: u8, frequency: u32) -> NumberFrequency {
        NumberFrequency { number, frequency }
    }

    #[test]
    fn test_empty_history() {
        let analysis = analyze_hot_cold(LotteryType::Megasena, &[]);
        assert!(analysis.hot_numbers.is_empty());
        assert_eq!(analysis.cold_numbers.len(), RANKING_SIZE);
        assert!(analysis.cold_numbers.iter().all(|f| f.frequency == 0));
        let numbers: Vec<u8> = analysis.cold_numbers.iter().map(|f| f.number).collect();
        assert_eq!(numbers, (1..=10).collect::<Vec<u8>>());
        assert_eq!(analysis.games_analyzed, 0);
    }

    #[test]
    fn test_empty_tally_covers_range() {
        let tally = FrequencyTally::new(LotteryType::Quina.config());
        assert_eq!(tally.iter().count(), 80);
        assert!(tally.iter().all(|f| f.frequency == 0));
    }

    #[test]
    fn test_number_in_every_game_is_hottest() {
        let games = vec![
            vec![7, 10, 20, 30, 40, 50],
            vec![1, 7, 12, 23, 34, 45],
            vec![2, 7, 13, 24, 35, 46],
            vec![3, 7, 14, 25, 36, 47],
            vec![4, 7, 15, 26, 37, 48],
        ];
        let analysis = analyze_hot_cold(LotteryType::Megasena, &games);
        assert_eq!(analysis.hot_numbers[0], freq(7, 5));
        assert_eq!(analysis.hot_numbers.len(), RANKING_SIZE);
        assert_eq!(analysis.games_analyzed, 5);
    }

    #[test]
    fn test_hot_tie_break_ascending() {
        let games = vec![vec![9, 3, 5, 1, 2], vec![9, 3, 4, 6, 8]];
        let tally = FrequencyTally::from_games(LotteryType::Quina.config(), &games);
        let hot = hot_numbers(&tally, 4);
        assert_eq!(hot, vec![freq(3, 2), freq(9, 2), freq(1, 1), freq(2, 1)]);
    }

    #[test]
    fn test_hot_excludes_unseen_numbers() {
        let games = vec![vec![1, 2, 3, 4, 5]];
        let tally = FrequencyTally::from_games(LotteryType::Quina.config(), &games);
        let hot = hot_numbers(&tally, RANKING_SIZE);
        assert_eq!(hot.len(), 5);
        assert!(hot.iter().all(|f| f.frequency == 1));
    }

    #[test]
    fn test_cold_includes_unseen_numbers() {
        let games: Vec<Vec<u8>> = vec![(1..=15).collect(), (1..=15).collect()];
        let tally = FrequencyTally::from_games(LotteryType::Lotofacil.config(), &games);
        let cold = cold_numbers(&tally, RANKING_SIZE);
        let numbers: Vec<u8> = cold.iter().map(|f| f.number).collect();
        assert_eq!(numbers, vec![16, 17, 18, 19, 20, 21, 22, 23, 24, 25]);
        assert!(cold.iter().all(|f| f.frequency == 0));
    }

    #[test]
    fn test_cold_orders_by_frequency_then_number() {
        let mut games: Vec<Vec<u8>> = Vec::new();
        for _ in 0..3 {
            games.push((1..=15).collect());
        }
        games.push((11..=25).collect());
        let tally = FrequencyTally::from_games(LotteryType::Lotofacil.config(), &games);
        let cold = cold_numbers(&tally, 12);
        assert_eq!(cold[0], freq(16, 1));
        assert_eq!(cold[9], freq(25, 1));
        assert_eq!(cold[10], freq(1, 3));
    }

    #[test]
    fn test_out_of_range_numbers_ignored() {
        let games = vec![vec![0, 61, 200, 60]];
        let tally = FrequencyTally::from_games(LotteryType::Megasena.config(), &games);
        let seen: Vec<NumberFrequency> = tally.iter().filter(|f| f.frequency > 0).collect();
        assert_eq!(seen, vec![freq(60, 1)]);
        assert_eq!(tally.iter().count(), 60);
    }
}
