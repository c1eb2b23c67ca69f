use crate::domain::model::{Market, TranslationResult, TranslationSource};
use crate::domain::ports::TranslationProvider;
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of a single translation strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt {
    Translated(String),
    Skipped { reason: String },
}

#[async_trait]
pub trait TranslationStrategy: Send + Sync {
    fn source(&self) -> TranslationSource;
    async fn attempt(&self, query: &str, market: &Market) -> Attempt;
}

pub fn translation_prompt(market: &Market) -> String {
    format!(
        "You are a shopping search assistant. Translate the user's product search query into \
         {language} ({code}) for shoppers in {country}. Keep well-known brand names and product \
         names untranslated. Use the terminology local shoppers would type into a search box. \
         Return only the translated query text, without quotes or explanations.",
        language = market.language_name,
        code = market.language,
        country = market.name,
    )
}

/// 第一層：遠端翻譯服務 (LLM)
pub struct RemoteTranslation {
    provider: Arc<dyn TranslationProvider>,
}

impl RemoteTranslation {
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TranslationStrategy for RemoteTranslation {
    fn source(&self) -> TranslationSource {
        TranslationSource::Remote
    }

    async fn attempt(&self, query: &str, market: &Market) -> Attempt {
        match self.provider.translate(&translation_prompt(market), query).await {
            Ok(text) => {
                let text = text.trim().trim_matches('"').trim();
                if text.is_empty() {
                    Attempt::Skipped {
                        reason: "remote translation returned empty text".to_string(),
                    }
                } else {
                    Attempt::Translated(text.to_string())
                }
            }
            Err(e) => {
                tracing::warn!("⚠️ Remote translation failed, falling back: {}", e);
                Attempt::Skipped {
                    reason: e.to_string(),
                }
            }
        }
    }
}

// (phrase, [(language, translation)])
const PHRASEBOOK: &[(&str, &[(&str, &str)])] = &[
    (
        "laptop",
        &[
            ("sk", "notebook"),
            ("cs", "notebook"),
            ("de", "Laptop"),
            ("pl", "laptop"),
            ("hu", "laptop"),
            ("fr", "ordinateur portable"),
            ("it", "portatile"),
            ("es", "portátil"),
            ("nl", "laptop"),
            ("sv", "bärbar dator"),
        ],
    ),
    (
        "mobile phone",
        &[
            ("sk", "mobilný telefón"),
            ("cs", "mobilní telefon"),
            ("de", "Handy"),
            ("pl", "telefon komórkowy"),
            ("hu", "mobiltelefon"),
            ("fr", "téléphone portable"),
            ("it", "cellulare"),
            ("es", "teléfono móvil"),
            ("nl", "mobiele telefoon"),
            ("sv", "mobiltelefon"),
        ],
    ),
    (
        "headphones",
        &[
            ("sk", "slúchadlá"),
            ("cs", "sluchátka"),
            ("de", "Kopfhörer"),
            ("pl", "słuchawki"),
            ("hu", "fejhallgató"),
            ("fr", "casque audio"),
            ("it", "cuffie"),
            ("es", "auriculares"),
            ("nl", "koptelefoon"),
            ("sv", "hörlurar"),
        ],
    ),
    (
        "running shoes",
        &[
            ("sk", "bežecká obuv"),
            ("cs", "běžecké boty"),
            ("de", "Laufschuhe"),
            ("pl", "buty do biegania"),
            ("hu", "futócipő"),
            ("fr", "chaussures de course"),
            ("it", "scarpe da corsa"),
            ("es", "zapatillas de running"),
            ("nl", "hardloopschoenen"),
            ("sv", "löparskor"),
        ],
    ),
    (
        "coffee machine",
        &[
            ("sk", "kávovar"),
            ("cs", "kávovar"),
            ("de", "Kaffeemaschine"),
            ("pl", "ekspres do kawy"),
            ("hu", "kávéfőző"),
            ("fr", "machine à café"),
            ("it", "macchina da caffè"),
            ("es", "cafetera"),
            ("nl", "koffiemachine"),
            ("sv", "kaffemaskin"),
        ],
    ),
    (
        "television",
        &[
            ("sk", "televízor"),
            ("cs", "televize"),
            ("de", "Fernseher"),
            ("pl", "telewizor"),
            ("hu", "televízió"),
            ("fr", "téléviseur"),
            ("it", "televisore"),
            ("es", "televisor"),
            ("nl", "televisie"),
            ("sv", "tv-apparat"),
        ],
    ),
];

/// 第二層：本地固定詞表
pub struct PhrasebookTranslation;

impl PhrasebookTranslation {
    pub fn lookup(query: &str, language: &str) -> Option<&'static str> {
        let normalized = query.trim().to_lowercase();
        PHRASEBOOK
            .iter()
            .find(|(phrase, _)| *phrase == normalized)
            .and_then(|(_, translations)| {
                translations
                    .iter()
                    .find(|(lang, _)| *lang == language)
                    .map(|(_, text)| *text)
            })
    }
}

#[async_trait]
impl TranslationStrategy for PhrasebookTranslation {
    fn source(&self) -> TranslationSource {
        TranslationSource::Phrasebook
    }

    async fn attempt(&self, query: &str, market: &Market) -> Attempt {
        match Self::lookup(query, market.language) {
            Some(text) => Attempt::Translated(text.to_string()),
            None => Attempt::Skipped {
                reason: format!("no phrasebook entry for '{}' in {}", query, market.language),
            },
        }
    }
}

/// 最後一層：原樣返回
pub struct Passthrough;

#[async_trait]
impl TranslationStrategy for Passthrough {
    fn source(&self) -> TranslationSource {
        TranslationSource::Passthrough
    }

    async fn attempt(&self, query: &str, _market: &Market) -> Attempt {
        Attempt::Translated(query.to_string())
    }
}

/// Ordered fallback chain of translation strategies. `translate` never fails.
pub struct Translator {
    strategies: Vec<Box<dyn TranslationStrategy>>,
}

impl Translator {
    /// Remote (when configured) → phrasebook → passthrough.
    pub fn new(remote: Option<Arc<dyn TranslationProvider>>) -> Self {
        let mut strategies: Vec<Box<dyn TranslationStrategy>> = Vec::new();
        if let Some(provider) = remote {
            strategies.push(Box::new(RemoteTranslation::new(provider)));
        }
        strategies.push(Box::new(PhrasebookTranslation));
        strategies.push(Box::new(Passthrough));
        Self { strategies }
    }

    pub fn with_strategies(strategies: Vec<Box<dyn TranslationStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn has_remote(&self) -> bool {
        self.strategies
            .iter()
            .any(|s| s.source() == TranslationSource::Remote)
    }

    pub async fn translate(&self, query: &str, market: &Market) -> TranslationResult {
        for strategy in &self.strategies {
            match strategy.attempt(query, market).await {
                Attempt::Translated(text) => {
                    tracing::debug!(
                        "🌐 Translated '{}' -> '{}' ({}, {:?})",
                        query,
                        text,
                        market.language,
                        strategy.source()
                    );
                    return TranslationResult {
                        original_query: query.to_string(),
                        translated_query: text,
                        target_language: market.language.to_string(),
                        source: strategy.source(),
                    };
                }
                Attempt::Skipped { reason } => {
                    tracing::debug!("🌐 {:?} translation skipped: {}", strategy.source(), reason);
                }
            }
        }

        TranslationResult {
            original_query: query.to_string(),
            translated_query: query.to_string(),
            target_language: market.language.to_string(),
            source: TranslationSource::Passthrough,
        }
    }
}
