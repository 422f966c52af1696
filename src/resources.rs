// ABOUTME: Shared server resources constructed once at startup
// ABOUTME: Bundles config, database, auth, provider adapters, sync, and the tool registry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FleetSync Contributors

use crate::auth::AuthManager;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::providers;
use crate::sync::SyncOrchestrator;
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Everything route handlers need, shared behind one `Arc`
pub struct ServerResources {
    /// Resolved server configuration
    pub config: ServerConfig,
    /// Shared database handle
    pub database: Arc<Database>,
    /// Query-layer token validation
    pub auth: AuthManager,
    /// Sync pipeline driver
    pub sync: SyncOrchestrator,
    /// Query tool registry
    pub tools: ToolRegistry,
}

impl ServerResources {
    /// Assemble resources around an already-migrated database
    #[must_use]
    pub fn new(config: ServerConfig, database: Arc<Database>) -> Self {
        let auth = AuthManager::new(config.jwt_secret.clone());
        let adapters = providers::registry(&config.samsara_api_base, &config.motive_api_base);
        let sync = SyncOrchestrator::new(
            Arc::clone(&database),
            reqwest::Client::new(),
            adapters,
            config.sync_run_ttl_minutes,
        );

        Self {
            config,
            database,
            auth,
            sync,
            tools: ToolRegistry::new(),
        }
    }
}
