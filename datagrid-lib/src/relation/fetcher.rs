//! Lookup of related entities by id.

use async_trait::async_trait;
use log::warn;

use crate::error::ConfigError;
use crate::error::Error;
use crate::model::Record;
use crate::model::Value;
use crate::remote::RemoteClient;

/// Looks up one related entity by table and id.
///
/// `Ok(None)` means the entity does not exist. Errors are transport or
/// configuration failures.
#[async_trait]
pub trait RelationFetcher: Send + Sync {
    /// Fetches the entity `id` of `table`.
    async fn fetch(&self, table: &str, id: &Value) -> Result<Option<Record>, Error>;
}

/// Relation lookup over HTTP: `GET <endpoint>?table=<table>&id=<id>`.
///
/// A 404 is reported as `Ok(None)`.
#[derive(Debug, Clone)]
pub struct HttpRelationFetcher {
    client: RemoteClient,
    endpoint: String,
}

impl HttpRelationFetcher {
    /// Creates a fetcher for a relation endpoint.
    pub fn new(client: RemoteClient, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Validates the parameters of a relation lookup.
pub fn check_relation_params(table: &str, id: &Value) -> Result<(), ConfigError> {
    if table.trim().is_empty() {
        return Err(ConfigError::missing_relation_parameter("table"));
    }
    if id.is_null() || id.to_display_string().trim().is_empty() {
        return Err(ConfigError::missing_relation_parameter("id"));
    }
    Ok(())
}

#[async_trait]
impl RelationFetcher for HttpRelationFetcher {
    async fn fetch(&self, table: &str, id: &Value) -> Result<Option<Record>, Error> {
        check_relation_params(table, id)?;
        let params = [
            ("table".to_string(), table.to_string()),
            ("id".to_string(), id.to_display_string()),
        ];
        match self.client.get_json(&self.endpoint, &params).await {
            Ok(serde_json::Value::Object(map)) => Ok(Some(Record::from(map))),
            Ok(serde_json::Value::Null) => Ok(None),
            Ok(_) => {
                warn!("Relation {}:{} is not an object, ignoring", table, id);
                Ok(None)
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
