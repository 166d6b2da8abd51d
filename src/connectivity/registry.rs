//! Controller registry, one controller per data domain.

use dashmap::DashMap;
use std::sync::Arc;

use crate::connectivity::controller::ConnectivityModeController;
use crate::connectivity::mode::ConnectionStatus;
use crate::connectivity::policy::ModePolicy;

/// Shared map of domain name -> controller.
#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    inner: Arc<DashMap<String, Arc<ConnectivityModeController>>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller under its domain name, replacing any previous one.
    pub fn insert(&self, controller: Arc<ConnectivityModeController>) {
        self.inner.insert(controller.domain().to_string(), controller);
    }

    pub fn get(&self, domain: &str) -> Option<Arc<ConnectivityModeController>> {
        self.inner.get(domain).map(|entry| entry.value().clone())
    }

    pub fn domains(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn all(&self) -> Vec<Arc<ConnectivityModeController>> {
        let mut controllers: Vec<_> = self.inner.iter().map(|e| e.value().clone()).collect();
        controllers.sort_by(|a, b| a.domain().cmp(b.domain()));
        controllers
    }

    /// Snapshots of all domains, sorted by name.
    pub fn statuses(&self) -> Vec<ConnectionStatus> {
        self.all().iter().map(|c| c.connection_status()).collect()
    }

    /// Apply a reloaded policy to every controller.
    pub fn update_policy(&self, policy: ModePolicy) {
        for controller in self.all() {
            controller.update_policy(policy);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
