//! Builds a backend client from however much configuration is present.
//!
//! The tiers are checked in order:
//! 1. no section at all: construct with the driver defaults;
//! 2. section without `port`: construct with `ip` only;
//! 3. otherwise: construct with `ip` and `port`.
//!
//! Choosing the tier never fails and never looks at the field values.
//! Whatever is wrong with the configured `ip` or `port` surfaces as a
//! connection error from the connector.

use std::{fmt, sync::Arc};

use crumpit_core::{BackendConfig, Config};
use serde_json::Value;

use crate::{BackendConnector, BackendError};

/// The constructor a section selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construction {
    /// Zero arguments.
    Defaults,
    /// One argument: the host, as configured.
    Host(Value),
    /// Two arguments: host and port, as configured.
    Address(Value, Value),
}

fn field(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(text) => f.write_str(text),
        other => write!(f, "{other}"),
    }
}

impl fmt::Display for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defaults => f.write_str("driver defaults"),
            Self::Host(ip) => field(f, ip),
            Self::Address(ip, port) => {
                field(f, ip)?;
                f.write_str(":")?;
                field(f, port)
            }
        }
    }
}

/// Select the construction tier for `section`.
#[must_use]
pub fn plan(section: Option<&BackendConfig>) -> Construction {
    match section {
        None => Construction::Defaults,
        Some(BackendConfig { ip, port: None }) => Construction::Host(ip.clone()),
        Some(BackendConfig { ip, port: Some(port) }) => Construction::Address(ip.clone(), port.clone()),
    }
}

/// Construct a fresh client for `section` through `connector`.
///
/// # Errors
/// Propagates the connector's error when the selected constructor fails.
pub async fn resolve<C>(
    section: Option<&BackendConfig>,
    connector: &C,
) -> Result<Arc<C::Client>, BackendError>
where
    C: BackendConnector + ?Sized,
{
    let construction = plan(section);
    tracing::debug!(backend = %connector.kind(), via = %construction, "constructing backend client");
    match &construction {
        Construction::Defaults => connector.connect_default().await,
        Construction::Host(ip) => connector.connect_host(ip).await,
        Construction::Address(ip, port) => connector.connect_addr(ip, port).await,
    }
}

/// [`resolve`] using the section `config` holds for the connector's kind.
///
/// # Errors
/// Propagates the connector's error when the selected constructor fails.
pub async fn resolve_from<C>(config: &Config, connector: &C) -> Result<Arc<C::Client>, BackendError>
where
    C: BackendConnector + ?Sized,
{
    resolve(config.backend(connector.kind()), connector).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crumpit_core::{BackendKind, StoreValue};
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::{
        doubles::{FakeConnector, FakeLiveRuns},
        LiveRunsClient, LiveRunsConnector,
    };

    fn section(ip: Value, port: Option<Value>) -> BackendConfig {
        BackendConfig { ip, port }
    }

    fn connector() -> FakeConnector<dyn LiveRunsClient> {
        FakeConnector::<dyn LiveRunsClient>::serving(BackendKind::DocumentStore, Arc::new(FakeLiveRuns::default()))
    }

    #[test]
    fn absent_section_plans_defaults() {
        assert_eq!(plan(None), Construction::Defaults);
    }

    #[test]
    fn section_without_port_plans_host_only() {
        assert_eq!(plan(Some(&section(json!("10.1.1.1"), None))), Construction::Host(json!("10.1.1.1")));
    }

    #[test]
    fn complete_section_plans_full_address() {
        assert_eq!(
            plan(Some(&section(json!("10.1.1.1"), Some(json!(27017))))),
            Construction::Address(json!("10.1.1.1"), json!(27017))
        );
    }

    #[test]
    fn fields_are_passed_through_unvalidated() {
        assert_eq!(plan(Some(&section(json!(""), None))), Construction::Host(json!("")));
        assert_eq!(plan(Some(&section(Value::Null, None))), Construction::Host(Value::Null));
        assert_eq!(
            plan(Some(&section(json!("not a host!"), Some(json!("abc"))))),
            Construction::Address(json!("not a host!"), json!("abc"))
        );
        assert_eq!(
            plan(Some(&section(json!(7), Some(json!(70000))))),
            Construction::Address(json!(7), json!(70000))
        );
    }

    #[test]
    fn construction_displays_fields_without_quotes() {
        assert_eq!(Construction::Address(json!("db"), json!(27017)).to_string(), "db:27017");
        assert_eq!(Construction::Host(json!(7)).to_string(), "7");
    }

    #[tokio::test]
    async fn resolve_calls_exactly_the_selected_constructor() {
        let fake = connector();
        for cfg in [None, Some(section(json!("h"), None)), Some(section(json!("h"), Some(json!(1))))] {
            if let Err(e) = resolve(cfg.as_ref(), &fake).await {
                panic!("resolve failed: {e}");
            }
        }
        assert_eq!(
            fake.calls(),
            vec![
                Construction::Defaults,
                Construction::Host(json!("h")),
                Construction::Address(json!("h"), json!(1)),
            ]
        );
    }

    #[tokio::test]
    async fn resolve_returns_connector_failure() {
        let fake = FakeConnector::<dyn LiveRunsClient>::refusing(BackendKind::DocumentStore);
        let result = resolve(Some(&section(json!("10.9.9.9"), Some(json!(27017)))), &fake).await;
        assert!(matches!(result, Err(BackendError::Unavailable { .. })));
        assert_eq!(fake.calls(), vec![Construction::Address(json!("10.9.9.9"), json!(27017))]);
    }

    #[tokio::test]
    async fn malformed_port_fails_at_connection_time() {
        let fake = connector();
        let result = resolve(Some(&section(json!("h"), Some(json!("27017")))), &fake).await;
        assert!(matches!(result, Err(BackendError::Unavailable { kind: BackendKind::DocumentStore, .. })));
        assert_eq!(fake.calls(), vec![Construction::Address(json!("h"), json!("27017"))]);
    }

    #[tokio::test]
    async fn resolve_from_uses_connector_kind_section() {
        let config = match Config::from_yaml_str("mongoDB:\n  ip: mongo\nsqlDB:\n  ip: sql\n  port: 3306\n") {
            Ok(c) => c,
            Err(e) => panic!("config parse failed: {e}"),
        };
        let fake = connector();
        let dynamic: &LiveRunsConnector = &fake;
        let client = match resolve_from(&config, dynamic).await {
            Ok(c) => c,
            Err(e) => panic!("resolve failed: {e}"),
        };
        assert!(matches!(client.list_runs().await, Ok(StoreValue::Array(_))));
        assert_eq!(fake.calls(), vec![Construction::Host(json!("mongo"))]);
    }

    proptest! {
        #[test]
        fn plan_tier_matches_present_fields(present in any::<bool>(), ip in "[a-z0-9.]{0,16}", port in proptest::option::of(any::<i64>())) {
            let cfg = present.then(|| section(json!(ip), port.map(|p| json!(p))));
            let expected = match (present, port) {
                (false, _) => Construction::Defaults,
                (true, None) => Construction::Host(json!(ip)),
                (true, Some(p)) => Construction::Address(json!(ip), json!(p)),
            };
            prop_assert_eq!(plan(cfg.as_ref()), expected);
        }
    }
}
