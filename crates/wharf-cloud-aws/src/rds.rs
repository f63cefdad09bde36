//! RDS database instance driver
//!
//! `up` is idempotent against an existing instance: a live describe
//! decides between reusing the instance as-is (its configuration is
//! never mutated) and creating a fresh one, then the connection facts
//! are exported as `setenv` events either way. `down` deletes without a
//! final snapshot and treats an absent instance as success.

use crate::client::{DEFAULT_REGION, load_aws_config};
use crate::driver::ResourceDriver;
use crate::error::{AwsError, Result};
use crate::waiter::{self, WaitConfig};
use async_trait::async_trait;
use aws_sdk_rds::Client;
use aws_sdk_rds::types::DbInstance;
use wharf_core::{EventSink, Options, with_fallback};

const DEFAULT_ENGINE: &str = "postgres";
const DEFAULT_DB_NAME: &str = "app";
const DEFAULT_IDENTIFIER: &str = "rds";
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "password";
const DEFAULT_INSTANCE_CLASS: &str = "db.t3.micro";
const DEFAULT_ALLOCATED_STORAGE_GIB: i32 = 20;

/// Default port for an engine family, used when the endpoint reports
/// no port.
fn default_port_for_engine(engine: &str) -> i32 {
    match engine.to_lowercase().as_str() {
        "postgres" | "postgresql" => 5432,
        "mysql" | "mariadb" => 3306,
        "sqlserver" => 1433,
        _ => 5432,
    }
}

fn allocated_storage_or_default(value: i32) -> i32 {
    if value <= 0 {
        DEFAULT_ALLOCATED_STORAGE_GIB
    } else {
        value
    }
}

fn connection_dsn(
    engine: &str,
    username: &str,
    password: &str,
    host: &str,
    port: i32,
    db_name: &str,
) -> String {
    format!("{engine}://{username}:{password}@{host}:{port}/{db_name}")
}

/// Looks up an instance by identifier.
///
/// Only a missing/empty result set means "absent": a not-found fault is
/// expected and silent, while any other describe failure is reported as
/// an error event but still answers `None` so the caller falls through
/// to creation.
async fn find_instance(
    client: &Client,
    identifier: &str,
    events: &dyn EventSink,
) -> Option<DbInstance> {
    match client
        .describe_db_instances()
        .db_instance_identifier(identifier)
        .send()
        .await
    {
        Ok(output) => output.db_instances.unwrap_or_default().into_iter().next(),
        Err(err) => {
            if !err
                .as_service_error()
                .is_some_and(|e| e.is_db_instance_not_found_fault())
            {
                events.error(&format!("describe DB instances failed: {err}"));
            }
            None
        }
    }
}

/// RDS driver
#[derive(Debug, Default)]
pub struct RdsDriver {
    wait: WaitConfig,
    client: Option<Client>,
}

impl RdsDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver bound to a pre-built client, bypassing ambient region
    /// resolution. Used by embedding callers and tests.
    pub fn with_client(client: Client) -> Self {
        Self {
            wait: WaitConfig::default(),
            client: Some(client),
        }
    }

    async fn client_for(&self, region: &str) -> Client {
        match &self.client {
            Some(client) => client.clone(),
            None => Client::new(&load_aws_config(region).await),
        }
    }

    async fn create_instance(
        &self,
        client: &Client,
        options: &Options,
        identifier: &str,
        engine: &str,
        db_name: &str,
        username: &str,
        password: &str,
        events: &dyn EventSink,
    ) -> Result<DbInstance> {
        let mut create = client
            .create_db_instance()
            .db_instance_identifier(identifier)
            .engine(engine)
            .master_username(username)
            .master_user_password(password)
            .db_instance_class(with_fallback(
                &options.instance_class,
                DEFAULT_INSTANCE_CLASS,
            ))
            .allocated_storage(allocated_storage_or_default(options.allocated_storage))
            .db_name(db_name)
            .multi_az(options.multi_az)
            .publicly_accessible(options.publicly_accessible);

        if !options.security_group_ids.is_empty() {
            create = create.set_vpc_security_group_ids(Some(options.security_group_ids.clone()));
        }

        create.send().await.map_err(|err| {
            events.error(&format!("create DB instance failed: {err}"));
            AwsError::Api(format!("create DB instance failed: {err}"))
        })?;

        waiter::wait_until("RDS instance available", &self.wait, || {
            let client = client.clone();
            let identifier = identifier.to_string();
            async move {
                let output = client
                    .describe_db_instances()
                    .db_instance_identifier(&identifier)
                    .send()
                    .await
                    .map_err(|err| {
                        AwsError::Api(format!("describe DB instances failed: {err}"))
                    })?;

                Ok(output
                    .db_instances()
                    .first()
                    .is_some_and(|i| i.db_instance_status() == Some("available")))
            }
        })
        .await
        .map_err(|err| {
            events.error(&format!(
                "waiting for DB instance to become available failed: {err}"
            ));
            err
        })?;

        // Re-describe to pick up the endpoint assigned during creation.
        match find_instance(client, identifier, events).await {
            Some(instance) => Ok(instance),
            None => {
                events.error("describe DB instance after creation returned no instances");
                Err(AwsError::CreatedInstanceMissing(identifier.to_string()))
            }
        }
    }
}

#[async_trait]
impl ResourceDriver for RdsDriver {
    fn name(&self) -> &str {
        "rds"
    }

    async fn up(&self, options: &Options, events: &dyn EventSink) -> Result<()> {
        let region = with_fallback(&options.region, DEFAULT_REGION).to_string();
        let engine = with_fallback(&options.engine, DEFAULT_ENGINE).to_string();
        let db_name = with_fallback(&options.db_name, DEFAULT_DB_NAME).to_string();
        let identifier = with_fallback(&options.name, DEFAULT_IDENTIFIER).to_string();
        let username = with_fallback(&options.username, DEFAULT_USERNAME).to_string();
        let password = with_fallback(&options.password, DEFAULT_PASSWORD).to_string();

        let client = self.client_for(&region).await;

        let instance = match find_instance(&client, &identifier, events).await {
            Some(instance) => {
                events.info(&format!(
                    "reusing existing RDS instance {identifier} in {region}"
                ));
                instance
            }
            None => {
                events.info(&format!(
                    "creating RDS instance {identifier} in {region} (engine={engine})"
                ));
                self.create_instance(
                    &client,
                    options,
                    &identifier,
                    &engine,
                    &db_name,
                    &username,
                    &password,
                    events,
                )
                .await?
            }
        };

        let endpoint = instance
            .endpoint()
            .and_then(|e| e.address().map(|addr| (addr.to_string(), e.port().unwrap_or(0))));
        let Some((host, reported_port)) = endpoint else {
            events.error(&format!(
                "DB instance {identifier} does not have an endpoint yet"
            ));
            return Err(AwsError::MissingEndpoint(identifier));
        };

        let port = if reported_port == 0 {
            default_port_for_engine(&engine)
        } else {
            reported_port
        };

        let dsn = connection_dsn(&engine, &username, &password, &host, port, &db_name);

        events.setenv("DB_ENGINE", &engine);
        events.setenv("DB_HOST", &host);
        events.setenv("DB_PORT", &port.to_string());
        events.setenv("DB_NAME", &db_name);
        events.setenv("DB_USER", &username);
        events.setenv("DB_PASSWORD", &password);
        events.setenv("DB_DSN", &dsn);

        events.setenv("RDS_REGION", &region);
        events.setenv("RDS_ENDPOINT", &format!("{host}:{port}"));
        events.setenv("RDS_INSTANCE_IDENTIFIER", &identifier);

        events.info(&format!(
            "service rds ready for {identifier} (engine={engine} endpoint={host}:{port})"
        ));

        Ok(())
    }

    async fn down(&self, options: &Options, events: &dyn EventSink) -> Result<()> {
        let region = with_fallback(&options.region, DEFAULT_REGION).to_string();
        let identifier = with_fallback(&options.name, DEFAULT_IDENTIFIER).to_string();

        let client = self.client_for(&region).await;

        events.info(&format!(
            "deleting RDS instance {identifier} in region {region} (skip final snapshot)"
        ));

        if let Err(err) = client
            .delete_db_instance()
            .db_instance_identifier(&identifier)
            .skip_final_snapshot(true)
            .send()
            .await
        {
            if err
                .as_service_error()
                .is_some_and(|e| e.is_db_instance_not_found_fault())
            {
                events.info(&format!(
                    "RDS instance {identifier} does not exist, nothing to delete"
                ));
                return Ok(());
            }

            events.error(&format!("delete DB instance failed: {err}"));
            return Err(AwsError::Api(format!("delete DB instance failed: {err}")));
        }

        waiter::wait_until("RDS instance deleted", &self.wait, || {
            let client = client.clone();
            let identifier = identifier.clone();
            async move {
                match client
                    .describe_db_instances()
                    .db_instance_identifier(&identifier)
                    .send()
                    .await
                {
                    Ok(output) => Ok(output.db_instances().is_empty()),
                    Err(err)
                        if err
                            .as_service_error()
                            .is_some_and(|e| e.is_db_instance_not_found_fault()) =>
                    {
                        Ok(true)
                    }
                    Err(err) => Err(AwsError::Api(format!(
                        "describe DB instances failed: {err}"
                    ))),
                }
            }
        })
        .await
        .map_err(|err| {
            events.error(&format!(
                "waiting for DB instance to be deleted failed: {err}"
            ));
            err
        })?;

        events.info(&format!("RDS instance {identifier} successfully deleted"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_follow_engine_family() {
        assert_eq!(default_port_for_engine("postgres"), 5432);
        assert_eq!(default_port_for_engine("postgresql"), 5432);
        assert_eq!(default_port_for_engine("mysql"), 3306);
        assert_eq!(default_port_for_engine("mariadb"), 3306);
        assert_eq!(default_port_for_engine("sqlserver"), 1433);
        assert_eq!(default_port_for_engine("cockroach"), 5432);
    }

    #[test]
    fn port_default_is_case_insensitive() {
        assert_eq!(default_port_for_engine("MySQL"), 3306);
    }

    #[test]
    fn allocated_storage_replaces_non_positive_values() {
        assert_eq!(allocated_storage_or_default(0), 20);
        assert_eq!(allocated_storage_or_default(-5), 20);
        assert_eq!(allocated_storage_or_default(100), 100);
    }

    #[test]
    fn dsn_has_engine_scheme_and_credentials() {
        assert_eq!(
            connection_dsn("postgres", "admin", "pw", "h", 5432, "app"),
            "postgres://admin:pw@h:5432/app"
        );
    }
}
