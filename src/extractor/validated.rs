use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;

use crate::{
    error::{ApiError, BodyError, ValidationError},
    schema,
    traits::StateProvider,
};

use super::{json::ApiJson, Extractor};

/// Extracts the request body as JSON and validates it against the schema of `T`.
///
/// Rejects with every schema violation at once. Only a valid body is deserialized into `T`.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + JsonSchema + Debug + Send,
    S: Send + Sync + StateProvider,
{
    type Rejection = ApiError;

    #[tracing::instrument(name = "validated_extractor", skip_all)]
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = ApiJson::<Value>::from_request(req, state)
            .await?
            .into_extracted();

        let violations = schema::validate::<T>(&value);

        if !violations.is_empty() {
            tracing::warn!(?violations, "Validation errors");

            return Err(ValidationError::new(violations).into());
        }

        tracing::trace!("Validated");

        match serde_json::from_value::<T>(value) {
            Ok(extracted) => Ok(ValidatedJson(extracted)),
            Err(err) => {
                tracing::warn!(%err, "Rejection");

                Err(BodyError::new(
                    state.error_verbosity(),
                    StatusCode::BAD_REQUEST,
                    err.to_string(),
                )
                .into())
            }
        }
    }
}
