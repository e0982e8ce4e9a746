use keepsake_template::{KeyTemplate, Params};
use keepsake_types::StorageKey;
use uuid::Uuid;

use crate::error::StoreResult;

/// Prefix of keys generated for stores without a template.
pub const GENERATED_KEY_PREFIX: &str = "result-";

/// Render the key for `params`, or generate a fresh one when the store has
/// no template.
pub(crate) fn render_key(template: Option<&KeyTemplate>, params: &Params) -> StoreResult<StorageKey> {
    match template {
        Some(template) => Ok(template.render(params)?),
        None => Ok(StorageKey::new(format!(
            "{GENERATED_KEY_PREFIX}{}",
            Uuid::now_v7()
        ))?),
    }
}
