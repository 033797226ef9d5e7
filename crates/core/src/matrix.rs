//! Expansion of a [`BuildTarget`] into concrete matrix cells.

use crate::config::BuildTarget;
use crate::error::Result;
use crate::platform::{Platform, resolve_platform_tag, resolve_runner};
use serde::Serialize;

/// One concrete (OS, architecture, runtime version) build.
///
/// Serializes as a `strategy.matrix.include` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    /// Runner label the cell runs on
    pub os: String,
    /// Canonical platform tag of the runner
    pub platform: Platform,
    /// CPU architecture
    pub arch: String,
    /// Runtime version, when the target is runtime-versioned
    #[serde(rename = "node", skip_serializing_if = "Option::is_none")]
    pub runtime_version: Option<String>,
    /// Whether this cell's metadata is re-exposed to publish jobs
    pub publish: bool,
}

impl MatrixCell {
    /// The target name embedded in artifact names, e.g. `node-v18-linux-x64`.
    #[must_use]
    pub fn target_name(&self) -> String {
        match &self.runtime_version {
            Some(version) => format!("node-v{version}-{}-{}", self.platform, self.arch),
            None => format!("{}-{}", self.platform, self.arch),
        }
    }
}

/// Expand a build target into its matrix cells.
///
/// Cells are ordered OS-major, then by architecture, then by runtime version.
/// The first cell of the first OS is the single publishing cell.
///
/// # Errors
///
/// Returns the target's validation error (empty list, unrecognized OS).
pub fn expand(target: &BuildTarget) -> Result<Vec<MatrixCell>> {
    target.validate()?;

    let runtimes: Vec<Option<&String>> = if target.has_runtime_versions() {
        target.runtime_versions.iter().map(Some).collect()
    } else {
        vec![None]
    };

    let mut cells = Vec::with_capacity(
        target.operating_systems.len() * target.architectures.len() * runtimes.len(),
    );
    for os in &target.operating_systems {
        let platform = resolve_platform_tag(os)?;
        let runner = resolve_runner(os);
        for arch in &target.architectures {
            for runtime in &runtimes {
                cells.push(MatrixCell {
                    os: runner.clone(),
                    platform,
                    arch: arch.clone(),
                    runtime_version: runtime.cloned(),
                    publish: cells.is_empty(),
                });
            }
        }
    }

    tracing::debug!(
        cells = cells.len(),
        operating_systems = target.operating_systems.len(),
        architectures = target.architectures.len(),
        runtimes = runtimes.len(),
        "Expanded build matrix"
    );

    Ok(cells)
}

/// The publishing cell of an expanded matrix.
#[must_use]
pub fn publishing_cell(cells: &[MatrixCell]) -> Option<&MatrixCell> {
    cells.iter().find(|cell| cell.publish)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_expand_single_cell() {
        let cells = expand(&BuildTarget::new(["linux"], ["x64"])).unwrap();
        assert_eq!(
            cells,
            vec![MatrixCell {
                os: "ubuntu-latest".to_string(),
                platform: Platform::Linux,
                arch: "x64".to_string(),
                runtime_version: None,
                publish: true,
            }]
        );
    }

    #[test]
    fn test_expand_cross_product_order() {
        let target = BuildTarget::new(["linux", "macos-14"], ["x64", "arm64"])
            .with_runtime_versions(["18", "20"]);
        let cells = expand(&target).unwrap();
        assert_eq!(cells.len(), 8);

        let names: Vec<_> = cells.iter().map(MatrixCell::target_name).collect();
        assert_eq!(
            names,
            [
                "node-v18-linux-x64",
                "node-v20-linux-x64",
                "node-v18-linux-arm64",
                "node-v20-linux-arm64",
                "node-v18-mac-x64",
                "node-v20-mac-x64",
                "node-v18-mac-arm64",
                "node-v20-mac-arm64",
            ]
        );
        assert_eq!(cells[4].os, "macos-14");
    }

    #[test]
    fn test_single_publishing_cell_from_first_os() {
        let cells = expand(&BuildTarget::new(["mac", "linux"], ["arm64", "x64"])).unwrap();
        let publishing: Vec<_> = cells.iter().filter(|c| c.publish).collect();
        assert_eq!(publishing.len(), 1);
        assert_eq!(publishing[0].platform, Platform::Mac);
        assert_eq!(publishing[0].arch, "arm64");
        assert_eq!(publishing_cell(&cells), Some(publishing[0]));
    }

    #[test]
    fn test_expand_rejects_unknown_os() {
        let err = expand(&BuildTarget::new(["linux", "plan9"], ["x64"])).unwrap_err();
        assert_eq!(err, Error::unrecognized_os("plan9"));
    }

    #[test]
    fn test_cell_serializes_as_include_entry() {
        let target = BuildTarget::new(["windows"], ["x64"]).with_runtime_versions(["20"]);
        let cells = expand(&target).unwrap();
        let json = serde_json::to_value(&cells[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "os": "windows-latest",
                "platform": "windows",
                "arch": "x64",
                "node": "20",
                "publish": true
            })
        );
    }
}
