//! API request and response types

use crate::state_machine::QuantityInput;
use serde::{Deserialize, Serialize};

/// Request to send a chat message
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Request to select an offered option
#[derive(Debug, Deserialize)]
pub struct SelectOptionRequest {
    pub option: String,
}

/// Request to start a purchase at an explicit price
#[derive(Debug, Deserialize)]
pub struct StartPurchaseRequest {
    pub unit_price: f64,
}

/// Request to change the quantity field
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    #[serde(default)]
    pub value: QuantityInput,
}

/// Version information
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub name: &'static str,
    pub version: &'static str,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
