//! Instance-definition document: the source of truth a pool reload swaps in.
//!
//! ```json
//! {
//!   "version": 7,
//!   "video": ["https://inv.example.com"],
//!   "search": ["https://inv.example.com"],
//!   "channel": [],
//!   "comments": [],
//!   "playlist": [],
//!   "secondary": { "video": ["https://piped-api.example.com"] }
//! }
//! ```
//!
//! The five primary keys are required. `secondary` and each of its keys are
//! optional; an absent secondary list is empty.

use serde::Deserialize;

use super::instance::{Category, Instance, Provider};

pub(crate) type CategoryLists = [Vec<Instance>; 5];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDefinition")]
pub struct PoolDefinition {
    pub version: Option<u64>,
    pub(crate) primary: CategoryLists,
    pub(crate) secondary: CategoryLists,
}

#[derive(Debug, Deserialize)]
struct RawDefinition {
    #[serde(default)]
    version: Option<u64>,
    video: Vec<String>,
    search: Vec<String>,
    channel: Vec<String>,
    comments: Vec<String>,
    playlist: Vec<String>,
    #[serde(default)]
    secondary: RawSecondary,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSecondary {
    video: Vec<String>,
    search: Vec<String>,
    channel: Vec<String>,
    comments: Vec<String>,
    playlist: Vec<String>,
}

impl TryFrom<RawDefinition> for PoolDefinition {
    type Error = String;

    fn try_from(raw: RawDefinition) -> Result<Self, Self::Error> {
        let primary = [
            parse_list(Category::Video, Provider::Primary, raw.video)?,
            parse_list(Category::Search, Provider::Primary, raw.search)?,
            parse_list(Category::Channel, Provider::Primary, raw.channel)?,
            parse_list(Category::Comments, Provider::Primary, raw.comments)?,
            parse_list(Category::Playlist, Provider::Primary, raw.playlist)?,
        ];
        let s = raw.secondary;
        let secondary = [
            parse_list(Category::Video, Provider::Secondary, s.video)?,
            parse_list(Category::Search, Provider::Secondary, s.search)?,
            parse_list(Category::Channel, Provider::Secondary, s.channel)?,
            parse_list(Category::Comments, Provider::Secondary, s.comments)?,
            parse_list(Category::Playlist, Provider::Secondary, s.playlist)?,
        ];
        Ok(Self {
            version: raw.version,
            primary,
            secondary,
        })
    }
}

fn parse_list(
    category: Category,
    provider: Provider,
    urls: Vec<String>,
) -> Result<Vec<Instance>, String> {
    let instances = urls
        .iter()
        .map(|url| Instance::parse(url).map_err(|e| format!("{provider} {category} list: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(dedup(instances))
}

impl PoolDefinition {
    pub fn from_json(document: &str) -> Result<Self, String> {
        serde_json::from_str(document).map_err(|e| format!("malformed definition document: {e}"))
    }

    /// Builds a definition from explicit lists, mostly useful for seeding and tests.
    pub fn builder() -> PoolDefinitionBuilder {
        PoolDefinitionBuilder::default()
    }

    pub fn list(&self, provider: Provider, category: Category) -> &[Instance] {
        match provider {
            Provider::Primary => &self.primary[category.index()],
            Provider::Secondary => &self.secondary[category.index()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.iter().chain(self.secondary.iter()).all(Vec::is_empty)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PoolDefinitionBuilder {
    definition: PoolDefinition,
}

impl PoolDefinitionBuilder {
    pub fn version(mut self, version: u64) -> Self {
        self.definition.version = Some(version);
        self
    }

    pub fn primary(mut self, category: Category, instances: Vec<Instance>) -> Self {
        self.definition.primary[category.index()] = dedup(instances);
        self
    }

    pub fn secondary(mut self, category: Category, instances: Vec<Instance>) -> Self {
        self.definition.secondary[category.index()] = dedup(instances);
        self
    }

    pub fn build(self) -> PoolDefinition {
        self.definition
    }
}

// Rotation relies on members being unique within a list.
fn dedup(instances: Vec<Instance>) -> Vec<Instance> {
    let mut list: Vec<Instance> = Vec::with_capacity(instances.len());
    for instance in instances {
        if !list.contains(&instance) {
            list.push(instance);
        }
    }
    list
}
