use std::fmt;

/// Action utilisateur dont l'échec donne lieu à un message unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Validate,
    Save,
    LoadHistory,
    Delete,
    Analyze,
    Summarize,
}

impl Action {
    pub fn user_message(&self) -> &'static str {
        match self {
            Action::Validate => "Grille invalide",
            Action::Save => "Erreur lors de l'enregistrement du jeu",
            Action::LoadHistory => "Erreur lors du chargement de l'historique",
            Action::Delete => "Erreur lors de la suppression du jeu",
            Action::Analyze => "Erreur lors de l'analyse des numéros",
            Action::Summarize => "Erreur lors de la génération de l'analyse IA",
        }
    }
}

/// Échec d'un appel externe ou d'une saisie, rattaché à l'action qui l'a provoqué.
#[derive(Debug)]
pub struct Failure {
    pub action: Action,
    pub source: anyhow::Error,
}

impl Failure {
    pub fn new(action: Action, source: anyhow::Error) -> Self {
        Self { action, source }
    }

    /// Journalise la chaîne complète et affiche un seul message à l'utilisateur.
    pub fn report(&self) {
        log::error!("{:?} : {:#}", self.action, self.source);
        println!("✗ {}", self);
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action {
            // seule la cause d'une saisie invalide est utile à l'utilisateur
            Action::Validate => write!(f, "{} : {}", self.action.user_message(), self.source),
            _ => f.write_str(self.action.user_message()),
        }
    }
}

impl std::error::Error for Failure {}

pub trait During<T> {
    fn during(self, action: Action) -> Result<T, Failure>;
}

impl<T> During<T> for anyhow::Result<T> {
    fn during(self, action: Action) -> Result<T, Failure> {
        self.map_err(|source| Failure::new(action, source))
    }
}
