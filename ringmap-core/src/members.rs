//! Member registry: the authoritative list of ring sites, fetched once per
//! run and snapshotted to disk so analysis can re-run offline.

use crate::error::{CoreError, Result};
use ringmap_spider::host::simple_host;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

pub const DEFAULT_REGISTRY_URL: &str = "https://api.travellings.cn/all";
pub const MEMBERS_FILE: &str = "members.json";

/// One registered site. `id` is stable across runs and is the node identity
/// of the connectivity graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_reason: Option<String>,
}

/// Registry wire format: `{"data": [...]}` with string tag lists and
/// camelCase field names.
#[derive(Debug, Deserialize)]
struct RegistryResponse {
    data: Vec<RawMember>,
}

#[derive(Debug, Deserialize)]
struct RawMember {
    id: i64,
    name: String,
    status: String,
    url: String,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default, rename = "failedReason")]
    failed_reason: Option<String>,
}

impl From<RawMember> for Member {
    fn from(raw: RawMember) -> Self {
        Member {
            id: raw.id,
            name: raw.name.trim().to_string(),
            status: raw.status.trim().to_string(),
            // a handful of registry entries carry a malformed scheme
            url: raw.url.trim().replace(":///", "://"),
            tags: raw
                .tag
                .as_deref()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            failed_reason: raw.failed_reason,
        }
    }
}

/// Fetch the registry snapshot. A failure here is fatal to the whole run:
/// without the member list there is nothing to crawl or analyze.
pub async fn fetch_registry(client: &reqwest::Client, registry_url: &str) -> Result<Vec<Member>> {
    info!("Fetching member registry from {}", registry_url);
    let response = client.get(registry_url).send().await?.error_for_status()?;
    let registry: RegistryResponse = response.json().await?;
    let members: Vec<Member> = registry.data.into_iter().map(Member::from).collect();
    info!("Registry contains {} members", members.len());
    Ok(members)
}

pub fn save_members(members: &[Member], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(members)?;
    crate::records::write_atomic(path, &json)
}

pub fn load_members(path: &Path) -> Result<Vec<Member>> {
    if !path.exists() {
        return Err(CoreError::MissingArtifact(format!(
            "{} (run `ringmap crawl` first)",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    let members: Vec<Member> = serde_json::from_str(&content)?;
    Ok(members)
}

/// Normalized host → member. Two members resolving to the same host would
/// make link attribution ambiguous, so that is a fatal data error rather
/// than something to paper over.
pub fn member_host_map(members: &[Member]) -> Result<HashMap<String, &Member>> {
    let mut map: HashMap<String, &Member> = HashMap::new();
    for member in members {
        let host = simple_host(&member.url);
        if host.is_empty() {
            continue;
        }
        if let Some(existing) = map.insert(host.clone(), member) {
            return Err(CoreError::InvalidRegistry(format!(
                "members #{} and #{} both normalize to host '{}'",
                existing.id, member.id, host
            )));
        }
    }
    Ok(map)
}
