use axum::extract::FromRef;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{credits::CreditLedger, error::AppError, state::AppState};

/// ClipDrop rejects longer prompts.
pub const MAX_PROMPT_CHARS: usize = 1000;

const CREDITS_PER_IMAGE: i64 = 1;

#[derive(Debug)]
pub struct GeneratedImage {
    pub data_url: String,
    pub credit_balance: i64,
}

pub(crate) fn normalize_prompt(prompt: &str) -> Result<&str, AppError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::Validation("Prompt is required".into()));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(AppError::Validation(format!(
            "Prompt must be at most {MAX_PROMPT_CHARS} characters"
        )));
    }
    Ok(prompt)
}

fn png_data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

/// Balance check, one upstream call, then the debit. The balance is only
/// touched after the generator has returned an image.
#[instrument(skip(st, prompt))]
pub async fn generate_for_user(
    st: &AppState,
    user_id: Uuid,
    prompt: &str,
) -> Result<GeneratedImage, AppError> {
    let prompt = normalize_prompt(prompt)?;
    let ledger = CreditLedger::from_ref(st);

    let balance = ledger.balance(user_id).await?;
    if balance <= 0 {
        info!(%user_id, balance, "generation refused, no credits");
        return Err(AppError::InsufficientCredit { balance });
    }

    let image = st.generator.generate(prompt).await.map_err(|e| {
        warn!(%user_id, error = %e, "image generation failed");
        e
    })?;

    // A concurrent request may have spent the last credit meanwhile; the
    // image is withheld rather than handed out unpaid.
    let credit_balance = ledger.debit(user_id, CREDITS_PER_IMAGE).await?;

    info!(%user_id, bytes = image.len(), credit_balance, "image generated");
    Ok(GeneratedImage {
        data_url: png_data_url(&image),
        credit_balance,
    })
}
