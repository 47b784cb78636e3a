use chrono::Local;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use loteria_db::models::{format_numbers, Game, HotColdAnalysis, LotteryType, NumberFrequency};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// `selected` ajoute une colonne de marque (mode interactif). `counts` vide : colonne « — ».
pub fn display_lotteries(selected: Option<LotteryType>, counts: &[(LotteryType, u32)]) {
    println!("{}", lotteries_table(selected, counts));
}

fn lotteries_table(selected: Option<LotteryType>, counts: &[(LotteryType, u32)]) -> Table {
    let mut table = new_table();
    let mut header = vec!["Loterie", "Identifiant", "Numéros", "Par jeu", "Sauvegardés"];
    if selected.is_some() {
        header.insert(0, "");
    }
    table.set_header(header);

    for lottery in LotteryType::ALL {
        let config = lottery.config();
        let saved = counts
            .iter()
            .find(|(l, _)| *l == lottery)
            .map(|(_, n)| n.to_string())
            .unwrap_or_else(|| "—".to_string());
        let mut row = vec![
            config.name.to_string(),
            lottery.as_str().to_string(),
            format!("{} à {}", config.min_number, config.max_number),
            config.numbers_per_game.to_string(),
            saved,
        ];
        if let Some(current) = selected {
            let marker = if lottery == current { "●" } else { "" };
            row.insert(0, marker.to_string());
        }
        table.add_row(row);
    }
    table
}

pub fn display_generated(lottery_type: LotteryType, games: &[Vec<u8>]) {
    let config = lottery_type.config();
    println!(
        "\n🎲 {} : {} numéros de {} à {}\n",
        config.name, config.numbers_per_game, config.min_number, config.max_number
    );

    let mut table = new_table();
    table.set_header(vec!["#", "Numéros"]);
    for (i, game) in games.iter().enumerate() {
        table.add_row(vec![format!("{}", i + 1), format_numbers(game)]);
    }
    println!("{table}");
}

pub fn display_deleted(game: &Game) {
    println!(
        "Jeu #{} supprimé : {}",
        game.id,
        format_numbers(&game.numbers)
    );
}

pub fn display_saved(game: &Game) {
    println!(
        "Jeu #{} sauvegardé : {}",
        game.id,
        format_numbers(&game.numbers)
    );
}

pub fn display_history(lottery_type: LotteryType, games: &[Game]) {
    let name = lottery_type.config().name;
    if games.is_empty() {
        println!(
            "Aucun jeu sauvegardé pour {name}. Générez et sauvegardez des jeux pour les voir ici."
        );
        return;
    }

    let label = if games.len() == 1 { "jeu sauvegardé" } else { "jeux sauvegardés" };
    println!("\n📜 {} {} pour {}\n", games.len(), label, name);

    let mut table = new_table();
    table.set_header(vec!["#", "Date", "Numéros", "Notes"]);

    for game in games {
        let date = game
            .created_at
            .with_timezone(&Local)
            .format("%d/%m/%Y à %H:%M")
            .to_string();
        table.add_row(vec![
            game.id.to_string(),
            date,
            format_numbers(&game.numbers),
            game.user_notes.clone().unwrap_or_else(|| "—".to_string()),
        ]);
    }
    println!("{table}");
}

pub fn display_hot_cold(analysis: &HotColdAnalysis) {
    let name = analysis.lottery_type.config().name;
    println!("\n📊 Analyse {} sur {} jeux sauvegardés\n", name, analysis.games_analyzed);

    if analysis.hot_numbers.is_empty() {
        println!("Sauvegardez quelques jeux pour voir l'analyse.");
        return;
    }

    println!("── Numéros chauds ──");
    display_ranking(&analysis.hot_numbers, Color::Red);

    println!("\n── Numéros froids ──");
    display_ranking(&analysis.cold_numbers, Color::Blue);
}

fn display_ranking(ranking: &[NumberFrequency], color: Color) {
    let mut table = new_table();
    table.set_header(vec!["Rang", "Numéro", "Fréquence"]);

    for (i, entry) in ranking.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(format!("{:02}", entry.number)).fg(color),
            Cell::new(format!("{}×", entry.frequency)),
        ]);
    }
    println!("{table}");
}

pub fn display_summary(text: &str) {
    println!("\n🧠 Analyse IA\n");
    println!("{text}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lotteries_table_marks_only_selection() {
        let listing = lotteries_table(None, &[]).to_string();
        assert!(!listing.contains('●'));
        assert!(listing.contains("Mega-Sena"));

        let counts = [(LotteryType::Quina, 3)];
        let menu = lotteries_table(Some(LotteryType::Quina), &counts).to_string();
        assert_eq!(menu.matches('●').count(), 1);
        let quina_row = menu.lines().find(|l| l.contains("Quina")).unwrap();
        assert!(quina_row.contains('●'));
        assert!(quina_row.contains('3'));
    }
}
