//! Service registry: the immutable set of monitored services.
//!
//! Loaded once per process from a YAML file shaped like:
//!
//! ```yaml
//! services:
//!   - id: billing
//!     name: Billing
//!     description: Invoicing backend
//!     health_check_url: https://billing.example.com/health
//!     version_check_url: https://billing.example.com/version
//!     schedule: "*/5 6-21 * * *"
//! ```
//!
//! Every entry is validated at load time, so a registry that exists is a
//! registry whose URLs and schedules are usable.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use http::Uri;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::schedule::CronSchedule;
use crate::service::Service;

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    services: Vec<Service>,
}

/// Read-only mapping from service id to descriptor.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    services: BTreeMap<String, Arc<Service>>,
}

impl Registry {
    /// Load and validate a registry from a YAML file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_yaml_str(&content)?;
        debug!(?path, services = registry.len(), "registry loaded");
        Ok(registry)
    }

    /// Parse and validate a registry from YAML text.
    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        let file: RegistryFile = serde_yaml::from_str(content)?;
        Self::from_services(file.services)
    }

    /// Build a registry from descriptors, validating each one.
    pub fn from_services(services: Vec<Service>) -> CoreResult<Self> {
        let mut map = BTreeMap::new();
        for service in services {
            validate(&service)?;
            if map.contains_key(&service.id) {
                return Err(CoreError::DuplicateId(service.id));
            }
            map.insert(service.id.clone(), Arc::new(service));
        }
        Ok(Self { services: map })
    }

    /// Look up a service by id.
    pub fn get(&self, id: &str) -> Option<&Arc<Service>> {
        self.services.get(id)
    }

    /// All services, ordered by id.
    pub fn services(&self) -> impl Iterator<Item = &Arc<Service>> {
        self.services.values()
    }

    /// All service ids, in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Shared handles to every service, ordered by id.
    pub fn to_vec(&self) -> Vec<Arc<Service>> {
        self.services.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

fn validate(service: &Service) -> CoreResult<()> {
    if service.id.trim().is_empty() {
        return Err(CoreError::EmptyId);
    }
    validate_url(&service.id, "health_check_url", &service.health_check_url)?;
    validate_url(&service.id, "version_check_url", &service.version_check_url)?;
    CronSchedule::parse(&service.schedule).map_err(|source| CoreError::InvalidSchedule {
        service_id: service.id.clone(),
        source,
    })?;
    Ok(())
}

/// Require an absolute `http`/`https` URL with a host.
fn validate_url(service_id: &str, field: &'static str, url: &str) -> CoreResult<()> {
    let invalid = |reason: &str| CoreError::InvalidUrl {
        service_id: service_id.to_string(),
        field,
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let uri: Uri = url.parse().map_err(|e: http::uri::InvalidUri| invalid(&e.to_string()))?;
    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(_) => return Err(invalid("scheme must be http or https")),
        None => return Err(invalid("URL must be absolute")),
    }
    if uri.host().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(())
}
