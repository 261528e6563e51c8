//! Control-plane client for the engine's gRPC management API.
//!
//! Each call opens its own connection and drops it when done; connections are
//! not pooled. Every call, connection setup included, is bounded by a single
//! deadline, and running past it always surfaces as [`ControlError::Timeout`].

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use auto_impl::auto_impl;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Endpoint;
use tonic::{Code, Request, Status};
use tracing::{debug, trace};

use crate::proto::{
    TypedMessage,
    protocol::User,
    proxyman::{
        ALTER_INBOUND_PATH, AddUserOperation, AlterInboundRequest, AlterInboundResponse,
        RemoveUserOperation,
    },
    stats::{GET_STATS_PATH, GetStatsRequest, GetStatsResponse},
};

#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("invalid control endpoint: {0}")]
    InvalidEndpoint(#[source] tonic::transport::Error),

    #[error("control endpoint unreachable: {0}")]
    Connect(#[from] tonic::transport::Error),

    #[error("control request failed: {0}")]
    Status(#[from] Status),

    #[error("control request timed out after {0:?}")]
    Timeout(Duration),
}

impl ControlError {
    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connect(_) | Self::Timeout(_) => true,
            Self::Status(status) => status.code() == Code::Unavailable,
            Self::InvalidEndpoint(_) => false,
        }
    }
}

/// Whether the engine reported the user or counter as absent.
///
/// The engine reports missing users with an `Unknown` status whose message
/// contains "not found", so the message is checked as well as the code.
pub fn is_not_found(status: &Status) -> bool {
    status.code() == Code::NotFound || status.message().contains("not found")
}

/// Name of the counter for bytes sent by a user.
pub fn uplink_counter(email: &str) -> String {
    format!("user>>>{email}>>>traffic>>>uplink")
}

/// Name of the counter for bytes sent to a user.
pub fn downlink_counter(email: &str) -> String {
    format!("user>>>{email}>>>traffic>>>downlink")
}

/// Operations on the engine's control plane.
#[async_trait]
#[auto_impl(&, Arc, Box)]
pub trait ControlPlane: Send + Sync {
    /// Add a user to the inbound tagged `tag`.
    async fn add_user(
        &self,
        tag: &str,
        email: &str,
        account: TypedMessage,
    ) -> Result<(), ControlError>;

    /// Remove a user from the inbound tagged `tag`. Absent users are not an error.
    async fn remove_user(&self, tag: &str, email: &str) -> Result<(), ControlError>;

    /// Read a traffic counter by full name. Absent counters read as zero.
    async fn get_counter(&self, name: &str) -> Result<i64, ControlError>;
}

/// [`ControlPlane`] over the engine's gRPC API on a loopback address.
#[derive(Clone, Debug)]
pub struct GrpcControlPlane {
    endpoint: Endpoint,
    timeout: Duration,
}

impl GrpcControlPlane {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Result<Self, ControlError> {
        // `bounded` owns the only deadline; expired calls must map to `Timeout`.
        let endpoint =
            Endpoint::from_shared(format!("http://{addr}")).map_err(ControlError::InvalidEndpoint)?;
        Ok(Self { endpoint, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn unary<Req, Resp>(&self, path: &'static str, message: Req) -> Result<Resp, ControlError>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        self.bounded(async {
            let channel = self.endpoint.connect().await?;
            let mut grpc = Grpc::new(channel);
            grpc.ready().await?;

            let response = grpc
                .unary(
                    Request::new(message),
                    PathAndQuery::from_static(path),
                    ProstCodec::<Req, Resp>::default(),
                )
                .await?;
            Ok::<_, ControlError>(response.into_inner())
        })
        .await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ControlError>>,
    ) -> Result<T, ControlError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ControlError::Timeout(self.timeout))?
    }

    async fn alter_inbound(&self, tag: &str, operation: TypedMessage) -> Result<(), ControlError> {
        let request = AlterInboundRequest {
            tag: tag.to_owned(),
            operation: Some(operation),
        };
        self.unary::<_, AlterInboundResponse>(ALTER_INBOUND_PATH, request)
            .await
            .map(drop)
    }
}

#[async_trait]
impl ControlPlane for GrpcControlPlane {
    async fn add_user(
        &self,
        tag: &str,
        email: &str,
        account: TypedMessage,
    ) -> Result<(), ControlError> {
        let operation = TypedMessage::pack(&AddUserOperation {
            user: Some(User {
                level: 0,
                email: email.to_owned(),
                account: Some(account),
            }),
        });
        self.alter_inbound(tag, operation).await?;
        debug!(%tag, %email, "added user");
        Ok(())
    }

    async fn remove_user(&self, tag: &str, email: &str) -> Result<(), ControlError> {
        let operation = TypedMessage::pack(&RemoveUserOperation {
            email: email.to_owned(),
        });
        match self.alter_inbound(tag, operation).await {
            Ok(()) => {
                debug!(%tag, %email, "removed user");
                Ok(())
            }
            Err(ControlError::Status(status)) if is_not_found(&status) => {
                trace!(%tag, %email, "user already absent");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn get_counter(&self, name: &str) -> Result<i64, ControlError> {
        let request = GetStatsRequest {
            name: name.to_owned(),
            reset: false,
        };
        match self
            .unary::<_, GetStatsResponse>(GET_STATS_PATH, request)
            .await
        {
            Ok(response) => Ok(response.stat.map_or(0, |stat| stat.value)),
            Err(ControlError::Status(status)) if is_not_found(&status) => Ok(0),
            Err(err) => Err(err),
        }
    }
}
