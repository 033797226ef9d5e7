//! Expression text for GitHub Actions `${{ ... }}` placeholders.
//!
//! [`PathExpr`] builds dotted accessors under a root expression. The typed
//! [`MetadataExpr`] layers the artifact metadata schema on top of it, so a
//! build step and a publish job cannot read the record from the wrong place:
//! inside the build job the record comes from the `meta` step, anywhere else
//! it comes from the build job's `publish` output.

use cigen_core::metadata::{key, section_key};
use std::fmt;
use std::marker::PhantomData;

/// Id of the build job.
pub const BUILD_JOB: &str = "build";

/// Id of the metadata step in the build job.
pub const META_STEP: &str = "meta";

/// Id of the image metadata step in the build job.
pub const IMAGE_META_STEP: &str = "image-meta";

/// Build job output carrying the publishing cell's metadata record.
pub const PUBLISH_OUTPUT: &str = "publish";

/// Build job output carrying the image tags computed by `image-meta`.
pub const PUBLISH_IMAGE_TAGS_OUTPUT: &str = "publish_image_tags";

/// Build job output carrying the image labels computed by `image-meta`.
pub const PUBLISH_IMAGE_LABELS_OUTPUT: &str = "publish_image_labels";

/// Job condition restricting publish jobs to version-tag pushes.
pub const TAG_REF_CONDITION: &str = "startsWith(github.ref, 'refs/tags/')";

/// Wrap raw expression text in `${{ ... }}`.
#[must_use]
pub fn wrap(inner: &str) -> String {
    format!("${{{{ {inner} }}}}")
}

/// `${{ matrix.<name> }}`
#[must_use]
pub fn matrix(name: &str) -> String {
    wrap(&format!("matrix.{name}"))
}

/// `${{ secrets.<name> }}`
#[must_use]
pub fn secret(name: &str) -> String {
    wrap(&format!("secrets.{name}"))
}

/// `${{ github.<name> }}`
#[must_use]
pub fn github(name: &str) -> String {
    wrap(&format!("github.{name}"))
}

/// `${{ steps.<step>.outputs.<output> }}`
#[must_use]
pub fn step_output(step: &str, output: &str) -> String {
    wrap(&format!("steps.{step}.outputs.{output}"))
}

/// `${{ needs.<job>.outputs.<output> }}`
#[must_use]
pub fn job_output(job: &str, output: &str) -> String {
    wrap(&format!("needs.{job}.outputs.{output}"))
}

/// A dotted path under a root expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    root: String,
    path: Vec<String>,
}

impl PathExpr {
    /// A path at `root` with no segments.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            path: Vec::new(),
        }
    }

    /// `${{ <root>.<path>.<name> }}`
    #[must_use]
    pub fn leaf(&self, name: &str) -> String {
        wrap(&format!("{self}.{name}"))
    }

    /// A builder one level deeper.
    #[must_use]
    pub fn section(&self, name: &str) -> Self {
        let mut path = self.path.clone();
        path.push(name.to_string());
        Self {
            root: self.root.clone(),
            path,
        }
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.root)?;
        for segment in &self.path {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

/// Where the metadata record is read from.
pub trait Scope {
    /// Root expression text, without `${{ }}`.
    fn root() -> String;
}

/// Inside the build job, from the `meta` step's return value.
#[derive(Debug, Clone, Copy)]
pub struct SameJob;

/// In a job that needs `build`, from the publishing cell's job output.
#[derive(Debug, Clone, Copy)]
pub struct Downstream;

impl Scope for SameJob {
    fn root() -> String {
        format!("fromJson(steps.{META_STEP}.outputs.result)")
    }
}

impl Scope for Downstream {
    fn root() -> String {
        format!("fromJson(needs.{BUILD_JOB}.outputs.{PUBLISH_OUTPUT})")
    }
}

/// Typed accessors over the artifact metadata record.
#[derive(Debug, Clone)]
pub struct MetadataExpr<S> {
    expr: PathExpr,
    scope: PhantomData<S>,
}

impl<S: Scope> Default for MetadataExpr<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scope> MetadataExpr<S> {
    /// Accessors rooted at the scope's expression.
    #[must_use]
    pub fn new() -> Self {
        Self {
            expr: PathExpr::new(S::root()),
            scope: PhantomData,
        }
    }

    fn leaf(&self, name: &str) -> String {
        self.expr.leaf(name)
    }

    fn section(&self, name: &str) -> PathExpr {
        self.expr.section(name)
    }

    /// Runner label of the cell.
    #[must_use]
    pub fn target_os(&self) -> String {
        self.leaf(key::TARGET_OS)
    }

    /// Runtime version of the cell.
    #[must_use]
    pub fn target_node(&self) -> String {
        self.leaf(key::TARGET_NODE)
    }

    /// Target name, e.g. `node-v18-linux-x64`.
    #[must_use]
    pub fn target_name(&self) -> String {
        self.leaf(key::TARGET_NAME)
    }

    /// The `nodePkg` section.
    #[must_use]
    pub fn node_pkg(&self) -> PackageExpr {
        PackageExpr(self.section(key::NODE_PKG))
    }

    /// The `image` section.
    #[must_use]
    pub fn image(&self) -> ImageExpr {
        ImageExpr(self.section(key::IMAGE))
    }
}

impl MetadataExpr<Downstream> {
    /// The job a reader of this scope must list in `needs`.
    #[must_use]
    pub const fn source_job(&self) -> &'static str {
        BUILD_JOB
    }
}

/// Accessors over the `nodePkg` section.
#[derive(Debug, Clone)]
pub struct PackageExpr(PathExpr);

impl PackageExpr {
    /// Owner scope (without `@`).
    #[must_use]
    pub fn owner(&self) -> String {
        self.0.leaf(section_key::OWNER)
    }

    /// Artifact the tarball is uploaded under.
    #[must_use]
    pub fn artifact_name(&self) -> String {
        self.0.leaf(section_key::ARTIFACT_NAME)
    }

    /// Tarball file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.0.leaf(section_key::FILE_NAME)
    }
}

/// Accessors over the `image` section.
#[derive(Debug, Clone)]
pub struct ImageExpr(PathExpr);

impl ImageExpr {
    /// Image base name.
    #[must_use]
    pub fn name(&self) -> String {
        self.0.leaf(section_key::NAME)
    }

    /// Artifact the image tarball is uploaded under.
    #[must_use]
    pub fn artifact_name(&self) -> String {
        self.0.leaf(section_key::ARTIFACT_NAME)
    }

    /// Image tarball file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.0.leaf(section_key::FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_expr_depth() {
        let root = PathExpr::new("fromJson(x)");
        assert_eq!(root.leaf("a"), "${{ fromJson(x).a }}");
        assert_eq!(root.section("b").leaf("c"), "${{ fromJson(x).b.c }}");
        assert_eq!(
            root.section("b").section("c").section("d").leaf("e"),
            "${{ fromJson(x).b.c.d.e }}"
        );
    }

    #[test]
    fn test_same_job_metadata() {
        let meta = MetadataExpr::<SameJob>::new();
        assert_eq!(
            meta.target_node(),
            "${{ fromJson(steps.meta.outputs.result).targetNode }}"
        );
        assert_eq!(
            meta.node_pkg().file_name(),
            "${{ fromJson(steps.meta.outputs.result).nodePkg.fileName }}"
        );
        assert_eq!(
            meta.image().artifact_name(),
            "${{ fromJson(steps.meta.outputs.result).image.artifactName }}"
        );
    }

    #[test]
    fn test_downstream_metadata() {
        let meta = MetadataExpr::<Downstream>::new();
        assert_eq!(meta.source_job(), "build");
        assert_eq!(
            meta.target_os(),
            "${{ fromJson(needs.build.outputs.publish).targetOs }}"
        );
        assert_eq!(
            meta.node_pkg().owner(),
            "${{ fromJson(needs.build.outputs.publish).nodePkg.owner }}"
        );
        assert_eq!(
            meta.image().name(),
            "${{ fromJson(needs.build.outputs.publish).image.name }}"
        );
    }

    #[test]
    fn test_context_helpers() {
        assert_eq!(matrix("os"), "${{ matrix.os }}");
        assert_eq!(secret("NPM_TOKEN"), "${{ secrets.NPM_TOKEN }}");
        assert_eq!(github("repository"), "${{ github.repository }}");
        assert_eq!(
            step_output("image-meta", "tags"),
            "${{ steps.image-meta.outputs.tags }}"
        );
        assert_eq!(
            job_output("build", "publish_image_tags"),
            "${{ needs.build.outputs.publish_image_tags }}"
        );
    }
}
