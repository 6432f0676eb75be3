// ============================
// crates/backend-lib/src/handlers/balance.rs
// ============================
use std::sync::Arc;

use axum::{extract::State, Json};
use kodbank_common::BalanceResponse;

use crate::auth::AuthContext;
use crate::{error::AppError, AppState};

/// `GET /balance/check`
pub async fn balance(
    State(state): State<Arc<AppState>>,
    context: AuthContext,
) -> Result<Json<BalanceResponse>, AppError> {
    let user = state.auth.profile(&context).await?;
    Ok(Json(BalanceResponse {
        balance: user.balance(),
        username: user.username,
        currency: state.settings.bank.currency.clone(),
    }))
}
