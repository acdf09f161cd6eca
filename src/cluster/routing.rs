//! Shard resolution: which copy of which shard serves a request.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::BuildHasher;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TermwalkError};
use crate::shard::store::ShardId;

/// Routing preference for choosing among the copies of a shard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Preference {
    /// Prefer the copy held by the coordinating node.
    Local,
    /// Use the primary copy.
    Primary,
    /// Any other string: the same string always picks the same copy.
    Custom(String),
}

impl FromStr for Preference {
    type Err = TermwalkError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" => Err(TermwalkError::validation("preference must not be empty")),
            "_local" => Ok(Preference::Local),
            "_primary" => Ok(Preference::Primary),
            custom => Ok(Preference::Custom(custom.to_string())),
        }
    }
}

impl fmt::Display for Preference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preference::Local => f.write_str("_local"),
            Preference::Primary => f.write_str("_primary"),
            Preference::Custom(value) => f.write_str(value),
        }
    }
}

/// One copy of a shard on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardCopy {
    /// Node holding the copy.
    pub node_id: String,
    /// Whether this is the primary copy.
    pub primary: bool,
    /// Whether the copy can serve requests.
    pub active: bool,
}

impl ShardCopy {
    /// An active primary copy.
    pub fn primary(node_id: impl Into<String>) -> Self {
        ShardCopy {
            node_id: node_id.into(),
            primary: true,
            active: true,
        }
    }

    /// An active replica copy.
    pub fn replica(node_id: impl Into<String>) -> Self {
        ShardCopy {
            node_id: node_id.into(),
            primary: false,
            active: true,
        }
    }

    /// Mark the copy inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Routing entry of one shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardRouting {
    /// The shard.
    pub shard_id: ShardId,
    /// Its copies.
    pub copies: Vec<ShardCopy>,
}

/// Where a shard request should be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardTarget {
    /// The shard.
    pub shard_id: ShardId,
    /// Node to send to; `None` when no copy is active.
    pub node_id: Option<String>,
}

/// Snapshot of cluster topology.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterState {
    local_node: String,
    blocked: Option<String>,
    indices: BTreeMap<String, Vec<ShardRouting>>,
}

impl ClusterState {
    /// Empty cluster seen from `local_node`.
    pub fn new(local_node: impl Into<String>) -> Self {
        ClusterState {
            local_node: local_node.into(),
            ..Default::default()
        }
    }

    /// A single node holding the primaries of `shard_count` shards of `index`.
    pub fn single_node(local_node: impl Into<String>, index: &str, shard_count: u32) -> Self {
        let local_node = local_node.into();
        let shards = (0..shard_count)
            .map(|shard| ShardRouting {
                shard_id: ShardId::new(index, shard),
                copies: vec![ShardCopy::primary(local_node.as_str())],
            })
            .collect();
        Self::new(local_node).with_index(index, shards)
    }

    /// Add or replace the routing table of an index.
    pub fn with_index(mut self, index: impl Into<String>, shards: Vec<ShardRouting>) -> Self {
        self.indices.insert(index.into(), shards);
        self
    }

    /// Block all reads with a reason.
    pub fn with_block(mut self, reason: impl Into<String>) -> Self {
        self.blocked = Some(reason.into());
        self
    }

    /// The node this state is seen from.
    pub fn local_node(&self) -> &str {
        &self.local_node
    }

    /// Routing table of an index.
    pub fn index(&self, index: &str) -> Option<&[ShardRouting]> {
        self.indices.get(index).map(Vec::as_slice)
    }

    /// Resolve the shards of `index` to concrete targets.
    pub fn resolve(&self, index: &str, preference: Option<&Preference>) -> Result<Vec<ShardTarget>> {
        if let Some(reason) = &self.blocked {
            return Err(TermwalkError::routing(format!("cluster is blocked: {reason}")));
        }

        let shards = self
            .indices
            .get(index)
            .ok_or_else(|| TermwalkError::routing(format!("no such index [{index}]")))?;
        if shards.is_empty() {
            return Err(TermwalkError::routing(format!(
                "index [{index}] has no shards"
            )));
        }

        Ok(shards
            .iter()
            .map(|routing| ShardTarget {
                shard_id: routing.shard_id.clone(),
                node_id: self.select_copy(routing, preference),
            })
            .collect())
    }

    fn select_copy(&self, routing: &ShardRouting, preference: Option<&Preference>) -> Option<String> {
        let active: Vec<&ShardCopy> = routing.copies.iter().filter(|c| c.active).collect();
        if active.is_empty() {
            return None;
        }

        let chosen = match preference {
            Some(Preference::Local) => active
                .iter()
                .find(|c| c.node_id == self.local_node)
                .unwrap_or(&active[0]),
            Some(Preference::Primary) => active.iter().find(|c| c.primary).unwrap_or(&active[0]),
            Some(Preference::Custom(value)) => {
                let hasher = ahash::RandomState::with_seeds(17, 31, 43, 59);
                let slot = BuildHasher::hash_one(&hasher, (value, &routing.shard_id)) as usize % active.len();
                &active[slot]
            }
            None => &active[rand::rng().random_range(0..active.len())],
        };

        Some(chosen.node_id.clone())
    }
}

/// Resolves an index and preference to the shards to query.
pub trait ShardResolver: Send + Sync {
    /// Targets for every shard of `index`.
    fn resolve(&self, index: &str, preference: Option<&Preference>) -> Result<Vec<ShardTarget>>;
}

/// Holds the current [`ClusterState`] and resolves against it.
#[derive(Debug, Default)]
pub struct ClusterService {
    state: RwLock<Arc<ClusterState>>,
}

impl ClusterService {
    /// Create a service over an initial state.
    pub fn new(state: ClusterState) -> Self {
        ClusterService {
            state: RwLock::new(Arc::new(state)),
        }
    }

    /// Current state.
    pub fn state(&self) -> Arc<ClusterState> {
        Arc::clone(&self.state.read())
    }

    /// Replace the state.
    pub fn update(&self, state: ClusterState) {
        *self.state.write() = Arc::new(state);
    }
}

impl ShardResolver for ClusterService {
    fn resolve(&self, index: &str, preference: Option<&Preference>) -> Result<Vec<ShardTarget>> {
        self.state().resolve(index, preference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replicated_state() -> ClusterState {
        ClusterState::new("node-b").with_index(
            "logs",
            vec![
                ShardRouting {
                    shard_id: ShardId::new("logs", 0),
                    copies: vec![ShardCopy::primary("node-a"), ShardCopy::replica("node-b")],
                },
                ShardRouting {
                    shard_id: ShardId::new("logs", 1),
                    copies: vec![ShardCopy::replica("node-a"), ShardCopy::primary("node-c")],
                },
            ],
        )
    }

    fn nodes(targets: &[ShardTarget]) -> Vec<Option<&str>> {
        targets.iter().map(|t| t.node_id.as_deref()).collect()
    }

    #[test]
    fn test_parse_preference() {
        assert_eq!("_local".parse::<Preference>().unwrap(), Preference::Local);
        assert_eq!("_primary".parse::<Preference>().unwrap(), Preference::Primary);
        assert_eq!(
            "session-42".parse::<Preference>().unwrap(),
            Preference::Custom("session-42".to_string())
        );
        assert!("".parse::<Preference>().is_err());
        assert_eq!(Preference::Local.to_string(), "_local");
    }

    #[test]
    fn test_primary_preference() {
        let targets = replicated_state()
            .resolve("logs", Some(&Preference::Primary))
            .unwrap();
        assert_eq!(nodes(&targets), vec![Some("node-a"), Some("node-c")]);
    }

    #[test]
    fn test_local_preference() {
        let targets = replicated_state()
            .resolve("logs", Some(&Preference::Local))
            .unwrap();
        // Shard 1 has no local copy and falls back to the first active one.
        assert_eq!(nodes(&targets), vec![Some("node-b"), Some("node-a")]);
    }

    #[test]
    fn test_custom_preference_is_stable() {
        let state = replicated_state();
        let preference = Preference::Custom("user-7".to_string());
        let first = state.resolve("logs", Some(&preference)).unwrap();
        for _ in 0..10 {
            assert_eq!(state.resolve("logs", Some(&preference)).unwrap(), first);
        }
    }

    #[test]
    fn test_no_preference_picks_active_copy() {
        let targets = replicated_state().resolve("logs", None).unwrap();
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| t.node_id.is_some()));
    }

    #[test]
    fn test_inactive_copies_are_skipped() {
        let state = ClusterState::new("node-a").with_index(
            "logs",
            vec![ShardRouting {
                shard_id: ShardId::new("logs", 0),
                copies: vec![ShardCopy::primary("node-a").inactive()],
            }],
        );
        let targets = state.resolve("logs", Some(&Preference::Primary)).unwrap();
        assert_eq!(targets[0].node_id, None);
    }

    #[test]
    fn test_resolution_errors() {
        let state = replicated_state();
        assert!(matches!(
            state.resolve("missing", None),
            Err(TermwalkError::Routing(_))
        ));

        let empty = ClusterState::new("n").with_index("empty", Vec::new());
        assert!(matches!(
            empty.resolve("empty", None),
            Err(TermwalkError::Routing(_))
        ));

        let blocked = replicated_state().with_block("read-only maintenance");
        match blocked.resolve("logs", None) {
            Err(TermwalkError::Routing(msg)) => assert!(msg.contains("blocked")),
            other => panic!("expected routing error, got {other:?}"),
        }
    }

    #[test]
    fn test_cluster_service_update() {
        let service = ClusterService::new(ClusterState::single_node("n1", "logs", 2));
        assert_eq!(service.resolve("logs", None).unwrap().len(), 2);

        service.update(ClusterState::single_node("n1", "logs", 3));
        assert_eq!(service.resolve("logs", None).unwrap().len(), 3);
        assert_eq!(service.state().local_node(), "n1");
    }
}
