//! Assertions used by scenarios.
//!
//! Each check returns a [`ScenarioFailure`] instead of panicking so the
//! runner can report every scenario, not just the first one to fail.

use crate::domain::error::ClientError;
use crate::domain::response::{ApiResponse, ResponseBody};
use std::fmt::Debug;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioFailure {
    /// The service behaved differently than expected.
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// The scenario could not be set up; says nothing about the service.
    #[error("precondition not met: {0}")]
    Precondition(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ScenarioFailure {
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }
}

pub type Check<T = ()> = Result<T, ScenarioFailure>;

pub fn expect_status(context: &str, actual: u16, expected: u16) -> Check {
    if actual == expected {
        Ok(())
    } else {
        Err(ScenarioFailure::assertion(format!(
            "{context}: expected status {expected}, got {actual}"
        )))
    }
}

pub fn expect_not_status(context: &str, actual: u16, rejected: u16) -> Check {
    if actual != rejected {
        Ok(())
    } else {
        Err(ScenarioFailure::assertion(format!(
            "{context}: expected any status but {rejected}"
        )))
    }
}

/// Status 200 and a body that decoded; yields the body.
pub fn expect_ok<'r, T>(context: &str, response: &'r ApiResponse<T>) -> Check<&'r T> {
    expect_status(context, response.status, 200)?;
    match &response.body {
        ResponseBody::Parsed(value) => Ok(value),
        ResponseBody::Unparsed { reason, raw } => Err(ScenarioFailure::assertion(format!(
            "{context}: body did not decode ({reason}): {}",
            preview(raw)
        ))),
    }
}

pub fn expect_eq<A, E>(field: &str, actual: &A, expected: &E) -> Check
where
    A: PartialEq<E> + Debug + ?Sized,
    E: Debug + ?Sized,
{
    if actual == expected {
        Ok(())
    } else {
        Err(ScenarioFailure::assertion(format!(
            "{field}: expected {expected:?}, got {actual:?}"
        )))
    }
}

pub fn expect_that(condition: bool, message: impl Into<String>) -> Check {
    if condition {
        Ok(())
    } else {
        Err(ScenarioFailure::assertion(message))
    }
}

fn preview(raw: &str) -> String {
    const MAX: usize = 200;
    if raw.chars().count() <= MAX {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(MAX).collect();
        format!("{head}...")
    }
}
