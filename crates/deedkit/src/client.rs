//! The deed client: one call per deed operation.

use std::time::Duration;

use deedkit_core::{
    address_for, namespace_prefix, validate_batch, Action, Address, EnvelopeBuilder, Identity,
    Payload,
};
use deedkit_gateway::{
    CommitWaiter, GatewayError, HttpTransport, LedgerGateway, ReqwestTransport, WaitReport,
};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::keys::load_identity;
use crate::record::DeedRecord;

/// Builds, signs and submits deed transactions, and reads deed state.
///
/// Reads work without an identity; writes need one.
pub struct DeedClient<T: HttpTransport = ReqwestTransport> {
    gateway: LedgerGateway<T>,
    identity: Option<Identity>,
    builder: EnvelopeBuilder,
}

impl DeedClient<ReqwestTransport> {
    /// Connect using a loaded configuration.
    ///
    /// The key file, when configured, must be readable and well formed.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut gateway = LedgerGateway::connect(&config.url)?;
        if let Some(auth) = config.auth()? {
            gateway = gateway.with_auth(auth);
        }
        let identity = config.key_file.as_ref().map(load_identity).transpose()?;
        Ok(Self::new(gateway, identity))
    }
}

impl<T: HttpTransport> DeedClient<T> {
    pub fn new(gateway: LedgerGateway<T>, identity: Option<Identity>) -> Self {
        Self {
            gateway,
            identity,
            builder: EnvelopeBuilder::new(),
        }
    }

    pub fn gateway(&self) -> &LedgerGateway<T> {
        &self.gateway
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// State address of a deed.
    pub fn address_of(&self, name: &str) -> Address {
        address_for(name)
    }

    /// Register a new deed owned by `owner`.
    pub async fn create(
        &self,
        name: &str,
        owner: &str,
        wait: Option<Duration>,
    ) -> Result<WaitReport> {
        self.submit(name, Action::Create, owner, wait).await
    }

    /// Hand a deed to `new_owner`.
    pub async fn transfer(
        &self,
        name: &str,
        new_owner: &str,
        wait: Option<Duration>,
    ) -> Result<WaitReport> {
        self.submit(name, Action::Transfer, new_owner, wait).await
    }

    /// Remove a deed.
    pub async fn delete(&self, name: &str, wait: Option<Duration>) -> Result<WaitReport> {
        self.submit(name, Action::Delete, "", wait).await
    }

    /// Every deed in the namespace, sorted by name.
    pub async fn list(&self) -> Result<Vec<DeedRecord>> {
        let Some(entries) = self.gateway.list(&namespace_prefix()).await? else {
            return Ok(Vec::new());
        };

        let mut records = Vec::new();
        for entry in &entries {
            records.extend(DeedRecord::parse_all(entry)?);
        }
        records.sort();
        Ok(records)
    }

    /// The deed named `name`.
    pub async fn show(&self, name: &str) -> Result<DeedRecord> {
        let address = address_for(name);
        let state = match self.gateway.fetch_state(&address, name).await {
            Ok(state) => state,
            Err(GatewayError::NotFound { .. }) => {
                return Err(ClientError::ResourceNotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        DeedRecord::parse_all(&state)?
            .into_iter()
            .find(|record| record.name == name)
            .ok_or_else(|| ClientError::ResourceNotFound(name.to_string()))
    }

    async fn submit(
        &self,
        name: &str,
        action: Action,
        owner: &str,
        wait: Option<Duration>,
    ) -> Result<WaitReport> {
        let identity = self
            .identity
            .as_ref()
            .ok_or(ClientError::SigningUnavailable)?;

        if !Payload::new(name, action.as_str(), owner).is_unambiguous() {
            warn!(deed = name, owner, "deed field contains the payload delimiter");
        }

        let tx = self
            .builder
            .build_transaction(identity, name, action.as_str(), owner);
        let batch = self.builder.build_batch(vec![tx], identity)?;
        validate_batch(&batch)?;

        let report = CommitWaiter::new(&self.gateway)
            .submit_and_wait_outcome(&batch, Some(name), wait)
            .await?;

        info!(
            deed = name,
            %action,
            batch_id = %report.receipt.batch_id,
            outcome = ?report.outcome,
            "deed submitted"
        );
        Ok(report)
    }
}
