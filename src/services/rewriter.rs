// Rewrite Model
// Turns a flagged paragraph into a more natural, human-sounding version

use std::future::Future;
use thiserror::Error;
use tracing::debug;

use super::providers::{ChatOptions, ProviderClient, ProviderError};

const REWRITE_MAX_TOKENS: i32 = 1024;

const REWRITE_SYSTEM_PROMPT: &str = r#"Bir e-ticaret sitesinin teknik ürün içerik editörüsün.
Sana verilen paragrafı anlamını ve bilgisini birebir koruyarak, daha doğal ve insan eliyle yazılmış gibi yeniden yaz.

KURALLAR:
- Kelime değiştirmekle yetinme; cümle yapısını ve sıralamasını değiştir.
- Model adları, teknik terimler ve sayılar olduğu gibi kalsın.
- Satır düzenini koru: girdideki her satır için bir satır üret.
- Açıklama, başlık veya tırnak ekleme; yalnızca yeniden yazılmış metni döndür."#;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("rewrite model unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("malformed model output: {0}")]
    Malformed(String),
}

/// External rewrite collaborator.
pub trait RewriteModel {
    fn rewrite(&self, text: &str) -> impl Future<Output = Result<String, RewriteError>> + Send;
}

/// [`RewriteModel`] backed by a chat completion endpoint.
#[derive(Clone)]
pub struct ChatRewriter {
    client: ProviderClient,
    temperature: f64,
}

impl ChatRewriter {
    pub fn new(client: ProviderClient, temperature: f64) -> Self {
        Self { client, temperature }
    }

    pub fn is_configured(&self) -> bool {
        self.client.has_api_key()
    }
}

impl RewriteModel for ChatRewriter {
    async fn rewrite(&self, text: &str) -> Result<String, RewriteError> {
        if !self.client.has_api_key() {
            return Err(RewriteError::Unavailable("API key not configured".to_string()));
        }

        let options = ChatOptions {
            max_tokens: REWRITE_MAX_TOKENS,
            temperature: self.temperature,
            json_format: false,
        };
        let result = self.client.chat(REWRITE_SYSTEM_PROMPT, text, options).await?;
        debug!(
            model = self.client.model(),
            latency_ms = result.latency_ms,
            "rewriter.completed"
        );

        clean_reply(&result.content)
    }
}

fn clean_reply(content: &str) -> Result<String, RewriteError> {
    let cleaned = content.trim().trim_matches('"').trim();
    if cleaned.is_empty() {
        return Err(RewriteError::Malformed("empty rewrite".to_string()));
    }
    Ok(cleaned.to_string())
}
