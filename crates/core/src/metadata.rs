//! Wire schema of the per-cell artifact metadata record.
//!
//! The build job computes this record at run time (in the `meta` step) and
//! the publishing cell re-exposes it as a JSON job output. Field names live
//! here once so the script that writes the record, the expressions that read
//! it and the graph validator cannot drift apart.

use crate::config::BuildConfig;

/// Top-level keys of the metadata record.
pub mod key {
    /// Runner label of the cell
    pub const TARGET_OS: &str = "targetOs";
    /// Runtime version of the cell
    pub const TARGET_NODE: &str = "targetNode";
    /// Target name embedded in artifact names
    pub const TARGET_NAME: &str = "targetName";
    /// Language package section
    pub const NODE_PKG: &str = "nodePkg";
    /// Container image section
    pub const IMAGE: &str = "image";
}

/// Keys inside the sections.
pub mod section_key {
    /// Package owner scope (without `@`)
    pub const OWNER: &str = "owner";
    /// Image base name
    pub const NAME: &str = "name";
    /// Uploaded artifact name
    pub const ARTIFACT_NAME: &str = "artifactName";
    /// File name inside the artifact
    pub const FILE_NAME: &str = "fileName";
}

/// One field of the record: a scalar leaf or a named section of leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Scalar value
    Leaf(&'static str),
    /// Nested object with its own fields
    Section(&'static str, &'static [Field]),
}

impl Field {
    /// The key this field is stored under.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Leaf(name) | Self::Section(name, _) => name,
        }
    }
}

/// Every field the metadata script can write.
pub const SCHEMA: &[Field] = &[
    Field::Leaf(key::TARGET_OS),
    Field::Leaf(key::TARGET_NODE),
    Field::Leaf(key::TARGET_NAME),
    Field::Section(
        key::NODE_PKG,
        &[
            Field::Leaf(section_key::OWNER),
            Field::Leaf(section_key::ARTIFACT_NAME),
            Field::Leaf(section_key::FILE_NAME),
        ],
    ),
    Field::Section(
        key::IMAGE,
        &[
            Field::Leaf(section_key::NAME),
            Field::Leaf(section_key::ARTIFACT_NAME),
            Field::Leaf(section_key::FILE_NAME),
        ],
    ),
];

/// Resolve a dotted path (`["nodePkg", "fileName"]`) against [`SCHEMA`].
#[must_use]
pub fn lookup(path: &[&str]) -> Option<&'static Field> {
    let (first, rest) = path.split_first()?;
    let mut field = SCHEMA.iter().find(|f| f.name() == *first)?;
    for segment in rest {
        match field {
            Field::Section(_, fields) => field = fields.iter().find(|f| f.name() == *segment)?,
            Field::Leaf(_) => return None,
        }
    }
    Some(field)
}

/// Which optional parts of the record a given build writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataPlan {
    /// `targetNode` is set
    pub runtime_version: bool,
    /// The `nodePkg` section is set
    pub node_pkg: bool,
    /// The `image` section is set
    pub image: bool,
}

impl MetadataPlan {
    /// The plan for a build configuration.
    #[must_use]
    pub fn for_build(build: &BuildConfig) -> Self {
        Self {
            runtime_version: build.target.has_runtime_versions(),
            node_pkg: build.artifacts.language_package,
            image: build.artifacts.container_image,
        }
    }

    /// Whether `path` names a scalar this plan actually writes.
    #[must_use]
    pub fn provides(&self, path: &[&str]) -> bool {
        if !matches!(lookup(path), Some(Field::Leaf(_))) {
            return false;
        }
        match path.first().copied() {
            Some(key::TARGET_NODE) => self.runtime_version,
            Some(key::NODE_PKG) => self.node_pkg,
            Some(key::IMAGE) => self.image,
            _ => true,
        }
    }
}
