use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use loteria_db::models::{HotColdAnalysis, LotteryType};

use crate::config::AiConfig;

/// Nombre de numéros chauds et froids transmis au modèle.
pub const PROMPT_NUMBERS: usize = 5;

const SYSTEM_PROMPT: &str = "Vous êtes un analyste statistique spécialisé dans les loteries. \
     Fournissez des analyses objectives et pratiques.";

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub lottery_type: LotteryType,
    pub hot_numbers: Vec<u8>,
    pub cold_numbers: Vec<u8>,
}

impl SummaryRequest {
    pub fn from_analysis(analysis: &HotColdAnalysis) -> Self {
        Self {
            lottery_type: analysis.lottery_type,
            hot_numbers: analysis
                .hot_numbers
                .iter()
                .take(PROMPT_NUMBERS)
                .map(|f| f.number)
                .collect(),
            cold_numbers: analysis
                .cold_numbers
                .iter()
                .take(PROMPT_NUMBERS)
                .map(|f| f.number)
                .collect(),
        }
    }
}

/// Service externe de génération de texte. Le texte renvoyé est affiché tel quel.
pub trait Summarizer {
    fn summarize(&self, request: &SummaryRequest) -> Result<String>;
}

pub fn build_prompt(request: &SummaryRequest) -> String {
    let config = request.lottery_type.config();
    let join = |numbers: &[u8]| {
        numbers
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Vous êtes un expert en analyse statistique de loteries. \
         Analysez les données suivantes de la {name} :

NUMÉROS CHAUDS (les plus fréquents) : {hot}
NUMÉROS FROIDS (les moins fréquents) : {cold}

Configuration du jeu :
- Numéros de {min} à {max}
- Numéros par jeu : {per_game}

Fournissez une analyse concise (150 mots maximum) sur :
1. Les tendances observées dans les numéros chauds et froids
2. Une stratégie pour combiner numéros chauds et froids
3. Une recommandation de jeu équilibrée

Soyez objectif et pratique. La loterie reste aléatoire, mais l'historique peut guider les choix.",
        name = config.name,
        hot = join(&request.hot_numbers),
        cold = join(&request.cold_numbers),
        min = config.min_number,
        max = config.max_number,
        per_game = config.numbers_per_game,
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Client bloquant pour `POST {base_url}/chat/completions`.
pub struct OpenAiSummarizer {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiSummarizer {
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("OPENAI_API_KEY non défini")?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();

        Ok(Self {
            agent,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl Summarizer for OpenAiSummarizer {
    fn summarize(&self, request: &SummaryRequest) -> Result<String> {
        let prompt = build_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &prompt },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        log::debug!("Requête de complétion vers {} ({})", self.endpoint, self.model);
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(&body);

        let raw = match response {
            Ok(resp) => resp
                .into_string()
                .context("Réponse illisible de l'API de complétion")?,
            Err(ureq::Error::Status(code, resp)) => {
                let detail = resp.into_string().unwrap_or_default();
                bail!("L'API de complétion a répondu {}: {}", code, detail.trim());
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(anyhow!(transport).context("API de complétion injoignable"));
            }
        };

        extract_completion(&raw)
    }
}

/// Premier choix non vide d'une réponse `chat/completions`.
pub fn extract_completion(raw: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(raw)
        .context("Réponse JSON invalide de l'API de complétion")?;
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .context("Réponse vide de l'API de complétion")?;
    Ok(text)
}
