use reqwest::StatusCode;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// One line of the external cart: a catalog product reference and a quantity.
/// The quantity is wire-typed as `i64` so a non-integer payload fails to
/// deserialize instead of being silently truncated.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub database_product_id: i32,
    pub quantity: i64,
}

/// Snapshot of a user's live cart as held by the external cart store.
/// `temporal_id` is the cart-session token: the store mints a fresh one each
/// time the user starts a new checkout session, and reconciliation uses it as
/// the idempotency key.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    #[serde(default)]
    pub items: Vec<CartLine>,
    pub temporal_id: String,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Read-only HTTP client for the external cart store.
#[derive(Clone)]
pub struct CartStore {
    client: reqwest::Client,
    base_url: String,
}

impl CartStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the live cart for a user. `None` means the store has no cart for
    /// this user; transport errors propagate instead of hanging or defaulting.
    pub async fn get_cart(&self, usuario_id: &str) -> AppResult<Option<CartSnapshot>> {
        let url = format!("{}/carts/{}", self.base_url, usuario_id);
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response.error_for_status()?;
        // A body that does not match the contract (e.g. a fractional
        // quantity) is the client's cart being malformed, not the store
        // being down.
        let snapshot = response.json::<CartSnapshot>().await.map_err(|err| {
            if err.is_decode() {
                AppError::BadRequest("El carrito contiene líneas malformadas".into())
            } else {
                AppError::CartStore(err)
            }
        })?;
        Ok(Some(snapshot))
    }
}
