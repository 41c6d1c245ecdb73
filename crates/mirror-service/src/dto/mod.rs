//! Data transfer objects for service requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for inputs
//! - Response DTOs for serializing outputs and cached views
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{DisplayRequest, ReactRequest, SendMessageRequest};
pub use responses::{ConversationResponse, MessageResponse, ReactionResponse, SendMessageResponse};
