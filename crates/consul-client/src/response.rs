//! Response mapping.
//!
//! Turns an [`HttpResponse`] into a typed value. Each endpoint picks one
//! shape: a single object, an array, an object whose values are the models
//! (keys are redundant IDs), or an object whose keys are part of the model.
//! Collection decodes never return a half-built element: an element either
//! decodes fully or is dropped (lenient) or fails the call (strict).

use serde_json::Value;

use crate::decode::{KeyedModel, model_name};
use crate::error::{Error, Result};
use crate::transport::HttpResponse;

/// What to do with a collection element that fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementPolicy {
    /// Skip the element and keep the rest.
    #[default]
    Lenient,
    /// Fail the whole call.
    Strict,
}

/// Map non-success status codes to the appropriate error.
pub fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let message = response.text().trim().to_string();
    if response.status == 404 {
        return Err(Error::NotFound(message));
    }
    Err(Error::Api {
        status: response.status,
        message,
    })
}

/// Check the status and parse the body as JSON.
pub fn parse(response: &HttpResponse) -> Result<Value> {
    check_status(response)?;
    Ok(serde_json::from_slice(&response.body)?)
}

/// Succeed on any 2xx status, ignoring the body.
pub fn empty(response: &HttpResponse) -> Result<()> {
    check_status(response)
}

/// Decode a `true`/`false` payload.
pub fn boolean(response: &HttpResponse) -> Result<bool> {
    parse(response)?.as_bool().ok_or(Error::UnexpectedShape {
        expected: "boolean",
    })
}

/// Decode the whole payload as one model.
pub fn single<T, F>(response: &HttpResponse, decode: F) -> Result<T>
where
    F: Fn(&Value) -> Option<T>,
{
    let value = parse(response)?;
    decode(&value).ok_or(Error::Decode {
        model: model_name::<T>(),
    })
}

/// Decode a JSON array, one model per element.
pub fn array<T, F>(response: &HttpResponse, decode: F, policy: ElementPolicy) -> Result<Vec<T>>
where
    F: Fn(&Value) -> Option<T>,
{
    let value = parse(response)?;
    let items = value.as_array().ok_or(Error::UnexpectedShape {
        expected: "array",
    })?;
    collect(items.iter(), decode, policy)
}

/// Decode a JSON object, one model per value; keys are ignored.
pub fn values<T, F>(response: &HttpResponse, decode: F, policy: ElementPolicy) -> Result<Vec<T>>
where
    F: Fn(&Value) -> Option<T>,
{
    let value = parse(response)?;
    let entries = value.as_object().ok_or(Error::UnexpectedShape {
        expected: "object",
    })?;
    collect(entries.values(), decode, policy)
}

/// Decode a JSON object where each key names the model built from its value.
pub fn keyed<T: KeyedModel>(response: &HttpResponse, policy: ElementPolicy) -> Result<Vec<T>> {
    let value = parse(response)?;
    let entries = value.as_object().ok_or(Error::UnexpectedShape {
        expected: "object keyed by name",
    })?;
    let mut models = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        match T::from_keyed_json(key, value) {
            Some(model) => models.push(model),
            None => skip_or_fail::<T>(policy)?,
        }
    }
    Ok(models)
}

fn collect<'a, T, F, I>(items: I, decode: F, policy: ElementPolicy) -> Result<Vec<T>>
where
    F: Fn(&Value) -> Option<T>,
    I: Iterator<Item = &'a Value>,
{
    let mut models = Vec::new();
    for item in items {
        match decode(item) {
            Some(model) => models.push(model),
            None => skip_or_fail::<T>(policy)?,
        }
    }
    Ok(models)
}

fn skip_or_fail<T>(policy: ElementPolicy) -> Result<()> {
    let model = model_name::<T>();
    match policy {
        ElementPolicy::Lenient => {
            tracing::debug!(model, "Skipping element that failed to decode");
            Ok(())
        }
        ElementPolicy::Strict => Err(Error::Decode { model }),
    }
}
