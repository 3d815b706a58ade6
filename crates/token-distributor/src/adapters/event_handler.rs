//! # Event Handler Adapter
//!
//! Decodes inbound distributor requests and turns every outcome into a
//! response payload.
//!
//! ## Identity
//!
//! - The caller is taken from the envelope, never from the payload
//! - The envelope `correlation_id` is echoed in the response
//! - A refused or reverted call is still a response (`success: false`); only
//!   undecodable input is an `IpcError`
//! - `respond` encodes the response for publishing on `topics::RESPONSE`

use crate::domain::entities::CallContext;
use crate::domain::value_objects::{Address, U256};
use crate::errors::{DistributorError, IpcError};
use crate::events::{
    topics, DistributeNativeRequestPayload, DistributeTokenRequestPayload,
    DistributorResponsePayload, TransferOwnershipRequestPayload,
};
use crate::ports::inbound::{DistributionReceipt, DistributorApi};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Inbound message from the event bus.
#[derive(Clone, Debug)]
pub struct InboundMessage {
    /// Topic the message was received on.
    pub topic: String,
    /// Authenticated caller (from the envelope).
    pub caller: Address,
    /// Correlation ID for request/response matching.
    pub correlation_id: Uuid,
    /// JSON payload bytes.
    pub payload: Vec<u8>,
}

/// Outbound message for the event bus.
#[derive(Clone, Debug)]
pub struct OutboundMessage {
    /// Topic to publish on.
    pub topic: String,
    /// Correlation ID of the request being answered.
    pub correlation_id: Uuid,
    /// JSON payload bytes.
    pub payload: Vec<u8>,
}

/// Event handler for distributor requests.
pub struct DistributorEventHandler<T: DistributorApi> {
    /// The distributor API implementation.
    api: Arc<T>,
}

impl<T: DistributorApi> DistributorEventHandler<T> {
    /// Create a new event handler.
    pub fn new(api: Arc<T>) -> Self {
        Self { api }
    }

    /// Handle a `DistributeTokenRequest`.
    pub async fn handle_distribute_token(
        &self,
        caller: Address,
        correlation_id: Uuid,
        payload: DistributeTokenRequestPayload,
    ) -> DistributorResponsePayload {
        let result = self
            .api
            .distribute_token(
                CallContext::new(caller),
                payload.ledger,
                payload.receivers,
                payload.amounts,
            )
            .await;
        distribution_response(correlation_id, result)
    }

    /// Handle a `DistributeNativeRequest`.
    pub async fn handle_distribute_native(
        &self,
        caller: Address,
        correlation_id: Uuid,
        payload: DistributeNativeRequestPayload,
    ) -> DistributorResponsePayload {
        let result = self
            .api
            .distribute_native(
                CallContext::new(caller).with_value(payload.value),
                payload.receivers,
                payload.amounts,
            )
            .await;
        distribution_response(correlation_id, result)
    }

    /// Handle a `TransferOwnershipRequest`.
    pub async fn handle_transfer_ownership(
        &self,
        caller: Address,
        correlation_id: Uuid,
        payload: TransferOwnershipRequestPayload,
    ) -> DistributorResponsePayload {
        match self.api.transfer_ownership(caller, payload.new_owner).await {
            Ok(event) => DistributorResponsePayload {
                correlation_id,
                success: true,
                total: U256::zero(),
                events: vec![event],
                category: None,
                revert_reason: None,
            },
            Err(err) => failure_response(correlation_id, &err),
        }
    }

    /// Decodes `message` by topic and routes it to its handler.
    ///
    /// # Errors
    ///
    /// `UnknownTopic` for topics this handler does not serve,
    /// `SerializationError` for undecodable payloads.
    pub async fn dispatch(
        &self,
        message: InboundMessage,
    ) -> Result<DistributorResponsePayload, IpcError> {
        debug!(
            topic = %message.topic,
            correlation_id = %message.correlation_id,
            "Dispatching distributor request"
        );

        let InboundMessage {
            topic,
            caller,
            correlation_id,
            payload,
        } = message;

        match topic.as_str() {
            topics::DISTRIBUTE_TOKEN_REQUEST => Ok(self
                .handle_distribute_token(caller, correlation_id, decode(&payload)?)
                .await),
            topics::DISTRIBUTE_NATIVE_REQUEST => Ok(self
                .handle_distribute_native(caller, correlation_id, decode(&payload)?)
                .await),
            topics::TRANSFER_OWNERSHIP_REQUEST => Ok(self
                .handle_transfer_ownership(caller, correlation_id, decode(&payload)?)
                .await),
            _ => Err(IpcError::UnknownTopic(topic)),
        }
    }

    /// Dispatches `message` and encodes the response for the bus.
    ///
    /// # Errors
    ///
    /// Same as [`Self::dispatch`], plus `SerializationError` if the response
    /// cannot be encoded.
    pub async fn respond(&self, message: InboundMessage) -> Result<OutboundMessage, IpcError> {
        let response = self.dispatch(message).await?;
        let payload = serde_json::to_vec(&response)
            .map_err(|e| IpcError::SerializationError(e.to_string()))?;

        Ok(OutboundMessage {
            topic: topics::RESPONSE.to_string(),
            correlation_id: response.correlation_id,
            payload,
        })
    }
}

fn decode<P: DeserializeOwned>(bytes: &[u8]) -> Result<P, IpcError> {
    serde_json::from_slice(bytes).map_err(|e| IpcError::SerializationError(e.to_string()))
}

fn distribution_response(
    correlation_id: Uuid,
    result: Result<DistributionReceipt, DistributorError>,
) -> DistributorResponsePayload {
    match result {
        Ok(receipt) => DistributorResponsePayload {
            correlation_id,
            success: true,
            total: receipt.total,
            events: receipt.events,
            category: None,
            revert_reason: None,
        },
        Err(err) => failure_response(correlation_id, &err),
    }
}

fn failure_response(correlation_id: Uuid, err: &DistributorError) -> DistributorResponsePayload {
    DistributorResponsePayload {
        correlation_id,
        success: false,
        total: U256::zero(),
        events: vec![],
        category: Some(err.category()),
        revert_reason: Some(err.to_string()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
