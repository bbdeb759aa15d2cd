//! JSON body extractors that run `validator` rules before the handler sees the value.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Deserialize a JSON body and validate it. Malformed JSON is a `bad_request`, rule violations a `validation_error`.
#[derive(Clone, Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// JSON array body; every element is validated and the first failure rejects the whole request.
#[derive(Clone, Debug)]
pub struct ValidatedJsonList<T>(pub Vec<T>);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJsonList<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(values) = Json::<Vec<T>>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        for value in &values {
            value.validate()?;
        }
        Ok(ValidatedJsonList(values))
    }
}
