//! The `meta` step script.
//!
//! Runs under `actions/github-script` in every matrix cell and returns the
//! cell's artifact metadata record. The publishing cell additionally sets the
//! record as the step output `publish`. Every field it writes is named by
//! [`cigen_core::metadata::SCHEMA`].

use crate::workflow::expr;
use cigen_core::MetadataPlan;
use cigen_core::metadata::key::{IMAGE, NODE_PKG, TARGET_NAME, TARGET_NODE, TARGET_OS};
use cigen_core::metadata::section_key::{ARTIFACT_NAME, FILE_NAME, NAME, OWNER};
use indexmap::IndexMap;

/// Environment variables the script reads, mapped to their matrix sources.
#[must_use]
pub fn script_env(plan: &MetadataPlan) -> IndexMap<String, String> {
    let mut env = IndexMap::new();
    env.insert("REPO_NAME".to_string(), expr::github("repository"));
    env.insert("MATRIX_OS".to_string(), expr::matrix("os"));
    env.insert("MATRIX_PLATFORM".to_string(), expr::matrix("platform"));
    env.insert("MATRIX_ARCH".to_string(), expr::matrix("arch"));
    env.insert("MATRIX_PUBLISH".to_string(), expr::matrix("publish"));
    if plan.runtime_version {
        env.insert("MATRIX_NODE".to_string(), expr::matrix("node"));
    }
    env
}

/// Render the script for a build plan.
///
/// Every line is trimmed and empty lines are dropped, so the document
/// emitter can store it as a literal block.
#[must_use]
pub fn render(plan: &MetadataPlan) -> String {
    let target_name = if plan.runtime_version {
        r#""node-v" + env.MATRIX_NODE + "-" + env.MATRIX_PLATFORM + "-" + env.MATRIX_ARCH"#
    } else {
        r#"env.MATRIX_PLATFORM + "-" + env.MATRIX_ARCH"#
    };

    let header = [
        "const env = process.env;".to_string(),
        "const result = {};".to_string(),
        format!("result.{TARGET_OS} = env.MATRIX_OS;"),
    ];
    let runtime = plan
        .runtime_version
        .then(|| format!("result.{TARGET_NODE} = env.MATRIX_NODE;"));
    let name = format!("result.{TARGET_NAME} = {target_name};");
    let package = if plan.node_pkg { package_lines() } else { Vec::new() };
    let image = if plan.image { image_lines() } else { Vec::new() };
    let footer = [
        format!(
            "if (env.MATRIX_PUBLISH === \"true\") core.setOutput('{}', result);",
            expr::PUBLISH_OUTPUT
        ),
        "return result;".to_string(),
    ];

    header
        .into_iter()
        .chain(runtime)
        .chain(std::iter::once(name))
        .chain(package)
        .chain(image)
        .chain(footer)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn package_lines() -> Vec<String> {
    vec![
        "const pkg = require('./package.json');".to_string(),
        r#"const [pkgOwner, pkgName] = pkg.name.slice(1).split("/");"#.to_string(),
        r#"const pkgVersion = pkg.version || "0.0.0";"#.to_string(),
        format!("result.{NODE_PKG} = {{}};"),
        format!("result.{NODE_PKG}.{OWNER} = pkgOwner;"),
        format!(
            r#"result.{NODE_PKG}.{ARTIFACT_NAME} = pkgOwner + "-" + pkgName + "-v" + pkgVersion + "-" + result.{TARGET_NAME} + ".nodepkg";"#
        ),
        format!(
            r#"result.{NODE_PKG}.{FILE_NAME} = result.{NODE_PKG}.{ARTIFACT_NAME} + ".tgz";"#
        ),
    ]
}

fn image_lines() -> Vec<String> {
    vec![
        r#"const [repoOwner, repoName] = env.REPO_NAME.split("/");"#.to_string(),
        r"const repoVersion = context.ref.replace(/^refs\/(tags|heads)\/v?/, '').replace(/[^\w.-]+/g, '-');"
            .to_string(),
        format!("result.{IMAGE} = {{}};"),
        format!(r#"result.{IMAGE}.{NAME} = repoOwner + "-" + repoName + "-v" + repoVersion;"#),
        format!(
            r#"result.{IMAGE}.{ARTIFACT_NAME} = result.{IMAGE}.{NAME} + "-" + result.{TARGET_NAME} + ".image";"#
        ),
        format!(r#"result.{IMAGE}.{FILE_NAME} = result.{IMAGE}.{ARTIFACT_NAME} + ".tar";"#),
    ]
}
