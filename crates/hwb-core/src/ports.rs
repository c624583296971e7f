use async_trait::async_trait;
use serde_json::Value;

use crate::{domain::Cursor, Result};

/// Port for the remote homework status API.
///
/// Returns the decoded JSON body of a successful (200) response verbatim;
/// shape checks belong to [`crate::status::validate`]. Every failure is an
/// [`crate::Error::EndpointUnavailable`].
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, cursor: Cursor) -> Result<Value>;
}
