//! Replication setup — pass-through port over an external replication
//! service. The core never performs replication itself; it emits the job
//! descriptions a real integration would submit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::error::{FactoryError, Result};
use super::inventory::Server;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationSettings {
    pub replication_server_instance_type: String,
    pub security_group_ids: Vec<String>,
    pub subnet_id: String,
    pub use_dedicated_replication_server: bool,
    pub staging_disk_type: String,
    pub ebs_encryption: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchTemplate {
    pub instance_type: String,
    pub security_groups: Vec<String>,
    pub subnet_id: String,
    pub iam_instance_profile: String,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationStatus {
    Initiated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationJob {
    pub source_server_id: String,
    pub settings: ReplicationSettings,
    pub launch_template: LaunchTemplate,
    pub status: ReplicationStatus,
    pub initial_sync_progress: u8,
    pub last_sync_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationBatch {
    pub batch_id: String,
    pub jobs: Vec<ReplicationJob>,
    pub estimated_initial_sync_hours: u32,
    pub next_steps: Vec<String>,
}

/// Narrow capability the planner core needs from a replication backend.
pub trait ReplicationSetupPort: Send + Sync {
    fn setup(&self, servers: &[Server]) -> Result<ReplicationBatch>;
}

/// Simulated backend: emits INITIATED jobs for the first `batch_limit`
/// servers without touching any external service.
#[derive(Debug, Clone)]
pub struct SimulatedReplication {
    pub batch_limit: usize,
}

impl Default for SimulatedReplication {
    fn default() -> Self {
        Self { batch_limit: 3 }
    }
}

impl ReplicationSetupPort for SimulatedReplication {
    fn setup(&self, servers: &[Server]) -> Result<ReplicationBatch> {
        if servers.is_empty() {
            return Err(FactoryError::Validation(
                "no source servers supplied for replication setup".to_string(),
            ));
        }

        let now = Utc::now();
        let jobs: Vec<ReplicationJob> = servers
            .iter()
            .take(self.batch_limit)
            .map(|server| ReplicationJob {
                source_server_id: server.server_id.clone(),
                settings: ReplicationSettings {
                    replication_server_instance_type: "t3.small".to_string(),
                    security_group_ids: vec!["sg-replication-default".to_string()],
                    subnet_id: "subnet-staging-area".to_string(),
                    use_dedicated_replication_server: false,
                    staging_disk_type: "gp3".to_string(),
                    ebs_encryption: "DEFAULT".to_string(),
                },
                launch_template: LaunchTemplate {
                    instance_type: server.target_profile.clone(),
                    security_groups: vec!["sg-production-app".to_string()],
                    subnet_id: "subnet-production-apps".to_string(),
                    iam_instance_profile: "EC2-Replication-Role".to_string(),
                    tags: BTreeMap::from([
                        ("Name".to_string(), format!("Migrated-{}", server.hostname)),
                        ("Environment".to_string(), "Production".to_string()),
                        ("OriginalServer".to_string(), server.server_id.clone()),
                    ]),
                },
                status: ReplicationStatus::Initiated,
                initial_sync_progress: 0,
                last_sync_time: now,
            })
            .collect();

        info!(jobs = jobs.len(), "replication setup initiated");

        Ok(ReplicationBatch {
            batch_id: format!("repl-{}", now.format("%Y%m%d%H%M%S")),
            jobs,
            estimated_initial_sync_hours: 24,
            next_steps: vec![
                "Monitor initial replication progress".to_string(),
                "Validate replication settings".to_string(),
                "Prepare launch templates for test instances".to_string(),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::discovery::{DiscoveryScope, DiscoverySource, SimulatedDiscovery};

    #[test]
    fn batch_is_capped_at_the_limit() {
        let servers = SimulatedDiscovery
            .discover(&DiscoveryScope::default())
            .unwrap();
        let batch = SimulatedReplication::default().setup(&servers).unwrap();
        assert_eq!(batch.jobs.len(), 3);
        assert_eq!(batch.jobs[0].source_server_id, "srv-001");
        assert_eq!(batch.jobs[0].status, ReplicationStatus::Initiated);
        assert_eq!(batch.jobs[0].initial_sync_progress, 0);
    }

    #[test]
    fn launch_template_follows_the_target_profile() {
        let servers = SimulatedDiscovery
            .discover(&DiscoveryScope::default())
            .unwrap();
        let batch = SimulatedReplication { batch_limit: 10 }.setup(&servers).unwrap();
        for (job, server) in batch.jobs.iter().zip(&servers) {
            assert_eq!(job.launch_template.instance_type, server.target_profile);
            assert_eq!(
                job.launch_template.tags.get("OriginalServer"),
                Some(&server.server_id)
            );
        }
    }

    #[test]
    fn empty_server_list_is_a_validation_error() {
        let err = SimulatedReplication::default().setup(&[]).unwrap_err();
        assert!(matches!(err, FactoryError::Validation(_)));
    }
}
