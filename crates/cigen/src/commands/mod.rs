//! Command implementations.
//!
//! Both commands share the same first half: detect the project, resolve the
//! render options against it and assemble a [`GeneratorConfig`].

pub mod install;
pub mod render;

use crate::cli::{CliError, RenderArgs};
use crate::project::Project;
use cigen_core::config::{parse_bool, parse_list};
use cigen_core::{
    ArtifactKinds, BuildConfig, BuildTarget, GeneratorConfig, ImageRegistry, PackageRegistry,
    PublishConfig, ReleaseChannel,
};

/// Node.js version used when the manifest states no engine constraint.
pub const DEFAULT_NODE_VERSION: &str = "16";

fn list_or(value: Option<&str>, default: impl FnOnce() -> Vec<String>) -> Vec<String> {
    value.map_or_else(default, parse_list)
}

fn bool_or(value: Option<&str>, default: bool) -> Result<bool, CliError> {
    value.map_or(Ok(default), |v| parse_bool(v).map_err(CliError::from))
}

/// Resolve the options against the detected project.
///
/// # Errors
///
/// Returns a configuration error for malformed option values. Semantic
/// checks (known OS, manifest presence) happen when the workflow is built.
pub fn resolve_config(args: &RenderArgs, project: &Project) -> Result<GeneratorConfig, CliError> {
    let has_manifest = project.has_manifest();
    let has_dockerfile = project.has_dockerfile;

    let operating_systems = list_or(args.build_target_os.as_deref(), || vec!["linux".to_string()]);
    let architectures = list_or(args.build_target_arch.as_deref(), || vec!["x64".to_string()]);
    let runtime_versions = list_or(args.build_target_node.as_deref(), || {
        project
            .manifest
            .as_ref()
            .map(|m| {
                m.minimum_runtime_version
                    .clone()
                    .unwrap_or_else(|| DEFAULT_NODE_VERSION.to_string())
            })
            .into_iter()
            .collect()
    });

    let artifacts = ArtifactKinds {
        language_package: bool_or(args.build_nodepkg.as_deref(), has_manifest)?,
        container_image: bool_or(args.build_image.as_deref(), has_dockerfile)?,
    };

    let packages = list_or(args.publish_nodepkg.as_deref(), || {
        if has_manifest {
            vec!["hosted:public".to_string(), "public:public".to_string()]
        } else {
            Vec::new()
        }
    })
    .iter()
    .map(|s| s.parse::<PackageRegistry>())
    .collect::<Result<Vec<_>, _>>()?;

    let images = list_or(args.publish_image.as_deref(), || {
        if has_dockerfile {
            vec!["hosted".to_string()]
        } else {
            Vec::new()
        }
    })
    .iter()
    .map(|s| s.parse::<ImageRegistry>())
    .collect::<Result<Vec<_>, _>>()?;

    let release_package = bool_or(args.publish_release_nodepkg.as_deref(), has_manifest)?;
    let release_image = bool_or(args.publish_release_image.as_deref(), has_dockerfile)?;
    let releases = list_or(args.publish_release.as_deref(), || vec!["hosted".to_string()])
        .iter()
        .map(|s| ReleaseChannel::parse(s, release_package, release_image))
        .collect::<Result<Vec<_>, _>>()?;

    let config = GeneratorConfig {
        build: BuildConfig {
            target: BuildTarget::new(operating_systems, architectures)
                .with_runtime_versions(runtime_versions),
            artifacts,
        },
        publish: PublishConfig {
            releases,
            packages,
            images,
        },
        manifest: project.manifest.clone(),
    };
    tracing::debug!(?config, "Resolved configuration");
    Ok(config)
}
