use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use loteria_db::models::LotteryType;

/// Tire une grille par mélange partiel de Fisher-Yates sur toute la plage,
/// puis la trie. Termine en O(plage), même quand la grille couvre presque tout.
pub fn generate_game<R: Rng + ?Sized>(lottery_type: LotteryType, rng: &mut R) -> Vec<u8> {
    let config = lottery_type.config();
    let mut pool: Vec<u8> = config.numbers().collect();
    let (picked, _) = pool.partial_shuffle(rng, config.numbers_per_game);

    let mut numbers = picked.to_vec();
    numbers.sort_unstable();
    numbers
}

pub fn generate_games(lottery_type: LotteryType, count: usize, seed: Option<u64>) -> Vec<Vec<u8>> {
    let mut rng: StdRng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    (0..count)
        .map(|_| generate_game(lottery_type, &mut rng))
        .collect()
}
