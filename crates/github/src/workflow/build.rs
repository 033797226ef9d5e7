//! The `build` job: one matrix cell per (OS, architecture, runtime version).
//!
//! Step list is `checkout, meta` followed by one independent sub-sequence per
//! enabled artifact kind.

use crate::workflow::expr::{
    self, IMAGE_META_STEP, META_STEP, MetadataExpr, PUBLISH_IMAGE_LABELS_OUTPUT,
    PUBLISH_IMAGE_TAGS_OUTPUT, PUBLISH_OUTPUT, SameJob,
};
use crate::workflow::schema::{Job, Matrix, Step, Strategy};
use crate::workflow::script;
use cigen_core::{BuildConfig, MatrixCell, MetadataPlan};
use serde_yaml::Value;

/// Staging directory for the packed language package.
///
/// Relative to the workspace so bash and the artifact actions resolve it to
/// the same directory on every runner.
pub const NODEPKG_DIR: &str = "artifact/nodepkg";

/// Staging directory for the exported image.
pub const IMAGE_DIR: &str = "artifact/image";

/// Image repository on the hosted container registry.
pub const IMAGE_REPOSITORY: &str = "ghcr.io/${{ github.repository }}";

/// Tag rules passed to `docker/metadata-action`.
pub const IMAGE_TAG_RULES: &[&str] = &[
    "type=schedule",
    "type=ref,event=branch",
    "type=ref,event=pr",
    "type=semver,pattern={{version}}",
    "type=semver,pattern={{major}}.{{minor}}",
    "type=semver,pattern={{major}}",
    "type=sha",
];

const ARTIFACT_RETENTION_DAYS: u64 = 7;

/// A `run` step pinned to bash so the same script works on every runner.
pub(crate) fn bash(command: impl Into<String>) -> Step {
    Step::run(command).with_shell("bash")
}

/// `mkdir -p <dir>`
pub(crate) fn mkdir(dir: &str) -> Step {
    bash(format!("mkdir -p {dir}")).with_name("Create artifact directory")
}

/// Assemble the build job.
///
/// `expose_image_meta` re-exports the image tags and labels for an image
/// publish job.
#[must_use]
pub fn build_job(build: &BuildConfig, cells: Vec<MatrixCell>, expose_image_meta: bool) -> Job {
    let plan = MetadataPlan::for_build(build);
    let meta = MetadataExpr::<SameJob>::new();

    let name = if plan.runtime_version {
        format!(
            "Build on node-v{}-{}-{}",
            expr::matrix("node"),
            expr::matrix("platform"),
            expr::matrix("arch")
        )
    } else {
        format!("Build on {}-{}", expr::matrix("platform"), expr::matrix("arch"))
    };

    let steps: Vec<Step> = [
        vec![
            Step::uses("actions/checkout@v4").with_name("Checkout"),
            meta_step(&plan),
        ],
        if plan.node_pkg {
            package_steps(&meta, plan.runtime_version)
        } else {
            Vec::new()
        },
        if plan.image {
            image_steps(&meta)
        } else {
            Vec::new()
        },
    ]
    .concat();

    let mut job = Job::new(name, expr::matrix("os")).with_steps(steps);
    job.strategy = Some(Strategy {
        matrix: Matrix { include: cells },
        fail_fast: Some(false),
    });
    job.outputs.insert(
        PUBLISH_OUTPUT.to_string(),
        expr::step_output(META_STEP, PUBLISH_OUTPUT),
    );
    if expose_image_meta {
        job.outputs.insert(
            PUBLISH_IMAGE_TAGS_OUTPUT.to_string(),
            expr::step_output(IMAGE_META_STEP, "tags"),
        );
        job.outputs.insert(
            PUBLISH_IMAGE_LABELS_OUTPUT.to_string(),
            expr::step_output(IMAGE_META_STEP, "labels"),
        );
    }
    job
}

fn meta_step(plan: &MetadataPlan) -> Step {
    let mut step = Step::uses("actions/github-script@v7")
        .with_id(META_STEP)
        .with_name("Build metadata")
        .with_input("script", script::render(plan));
    step.env = script::script_env(plan);
    step
}

fn upload(artifact_name: String, dir: &str) -> Step {
    Step::uses("actions/upload-artifact@v4")
        .with_input("name", artifact_name)
        .with_input("path", format!("{dir}/*"))
        .with_input("if-no-files-found", "error")
        .with_input("retention-days", Value::Number(ARTIFACT_RETENTION_DAYS.into()))
}

fn package_steps(meta: &MetadataExpr<SameJob>, runtime_versioned: bool) -> Vec<Step> {
    let pkg = meta.node_pkg();

    let mut setup = Step::uses("actions/setup-node@v4").with_name("Set up Node.js");
    if runtime_versioned {
        setup = setup.with_input("node-version", meta.target_node());
    }

    vec![
        setup,
        Step::uses("bahmutov/npm-install@v1").with_name("Install dependencies"),
        mkdir(NODEPKG_DIR),
        bash("npm run test --if-present").with_name("Test Node.js pkg"),
        bash(format!("npm pack\nmv *.tgz {NODEPKG_DIR}/{}", pkg.file_name()))
            .with_name("Pack Node.js pkg"),
        upload(pkg.artifact_name(), NODEPKG_DIR).with_name("Upload Node.js pkg"),
    ]
}

fn image_steps(meta: &MetadataExpr<SameJob>) -> Vec<Step> {
    let image = meta.image();

    vec![
        mkdir(IMAGE_DIR),
        Step::uses("docker/metadata-action@v5")
            .with_id(IMAGE_META_STEP)
            .with_name("Build image metadata")
            .with_input("images", IMAGE_REPOSITORY)
            .with_input("tags", IMAGE_TAG_RULES.join("\n")),
        Step::uses("docker/setup-buildx-action@v3").with_name("Set up Docker Buildx"),
        Step::uses("docker/build-push-action@v6")
            .with_name("Build image")
            .with_input("tags", expr::step_output(IMAGE_META_STEP, "tags"))
            .with_input("labels", expr::step_output(IMAGE_META_STEP, "labels"))
            .with_input(
                "outputs",
                format!("type=docker,dest={IMAGE_DIR}/{}", image.file_name()),
            ),
        upload(image.artifact_name(), IMAGE_DIR).with_name("Upload image"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use cigen_core::{ArtifactKinds, BuildTarget, expand};

    fn build(artifacts: ArtifactKinds, runtimes: &[&str]) -> BuildConfig {
        BuildConfig {
            target: BuildTarget::new(["linux", "mac"], ["x64"])
                .with_runtime_versions(runtimes.iter().copied()),
            artifacts,
        }
    }

    fn job_for(build: &BuildConfig, expose: bool) -> Job {
        let cells = expand(&build.target).unwrap();
        build_job(build, cells, expose)
    }

    fn step_names(job: &Job) -> Vec<&str> {
        job.steps.iter().filter_map(|s| s.name.as_deref()).collect()
    }

    #[test]
    fn test_bare_build_job() {
        let job = job_for(&build(ArtifactKinds::default(), &[]), false);
        assert_eq!(job.name.as_deref(), Some("Build on ${{ matrix.platform }}-${{ matrix.arch }}"));
        assert_eq!(job.runs_on, "${{ matrix.os }}");
        assert!(job.needs.is_empty());
        assert_eq!(step_names(&job), ["Checkout", "Build metadata"]);
        assert_eq!(job.outputs.len(), 1);
        assert_eq!(job.outputs["publish"], "${{ steps.meta.outputs.publish }}");

        let strategy = job.strategy.as_ref().unwrap();
        assert_eq!(strategy.matrix.include.len(), 2);
        assert_eq!(strategy.fail_fast, Some(false));
    }

    #[test]
    fn test_runtime_versioned_name() {
        let artifacts = ArtifactKinds {
            language_package: true,
            container_image: false,
        };
        let job = job_for(&build(artifacts, &["18", "20"]), false);
        assert_eq!(
            job.name.as_deref(),
            Some("Build on node-v${{ matrix.node }}-${{ matrix.platform }}-${{ matrix.arch }}")
        );
        let setup = &job.steps[2];
        assert_eq!(setup.uses.as_deref(), Some("actions/setup-node@v4"));
        assert_eq!(
            setup.with_inputs["node-version"],
            Value::String("${{ fromJson(steps.meta.outputs.result).targetNode }}".to_string())
        );
    }

    #[test]
    fn test_package_sub_sequence() {
        let artifacts = ArtifactKinds {
            language_package: true,
            container_image: false,
        };
        let job = job_for(&build(artifacts, &[]), false);
        assert_eq!(
            step_names(&job),
            [
                "Checkout",
                "Build metadata",
                "Set up Node.js",
                "Install dependencies",
                "Create artifact directory",
                "Test Node.js pkg",
                "Pack Node.js pkg",
                "Upload Node.js pkg",
            ]
        );
        assert!(!job.steps[2].with_inputs.contains_key("node-version"));

        let pack = job
            .steps
            .iter()
            .find(|s| s.name.as_deref() == Some("Pack Node.js pkg"))
            .unwrap();
        assert_eq!(
            pack.run.as_deref(),
            Some("npm pack\nmv *.tgz artifact/nodepkg/${{ fromJson(steps.meta.outputs.result).nodePkg.fileName }}")
        );
        assert_eq!(pack.shell.as_deref(), Some("bash"));

        let upload = job.steps.last().unwrap();
        assert_eq!(
            upload.with_inputs["name"],
            Value::String(
                "${{ fromJson(steps.meta.outputs.result).nodePkg.artifactName }}".to_string()
            )
        );
        assert_eq!(upload.with_inputs["retention-days"], Value::Number(7.into()));
    }

    #[test]
    fn test_image_sub_sequence_follows_package() {
        let artifacts = ArtifactKinds {
            language_package: true,
            container_image: true,
        };
        let job = job_for(&build(artifacts, &[]), true);
        let names = step_names(&job);
        let pkg_upload = names.iter().position(|n| *n == "Upload Node.js pkg").unwrap();
        let image_meta = names.iter().position(|n| *n == "Build image metadata").unwrap();
        assert!(pkg_upload < image_meta);
        assert_eq!(names.last(), Some(&"Upload image"));

        let build_image = job
            .steps
            .iter()
            .find(|s| s.name.as_deref() == Some("Build image"))
            .unwrap();
        assert_eq!(
            build_image.with_inputs["outputs"],
            Value::String(
                "type=docker,dest=artifact/image/${{ fromJson(steps.meta.outputs.result).image.fileName }}"
                    .to_string()
            )
        );

        assert_eq!(job.outputs["publish_image_tags"], "${{ steps.image-meta.outputs.tags }}");
        assert_eq!(job.outputs["publish_image_labels"], "${{ steps.image-meta.outputs.labels }}");
    }

    #[test]
    fn test_windows_pack_destination_matches_upload_path() {
        let artifacts = ArtifactKinds {
            language_package: true,
            container_image: true,
        };
        let build = BuildConfig {
            target: BuildTarget::new(["windows"], ["x64"]),
            artifacts,
        };
        let job = job_for(&build, false);
        let step = |name: &str| {
            job.steps
                .iter()
                .find(|s| s.name.as_deref() == Some(name))
                .unwrap()
        };
        let path = |name: &str| {
            let Value::String(path) = &step(name).with_inputs["path"] else {
                panic!("path is not a string");
            };
            path.clone()
        };

        let pack = step("Pack Node.js pkg").run.as_deref().unwrap();
        let dest = pack.trim_start_matches("npm pack\nmv *.tgz ");
        let (dest_dir, _) = dest.rsplit_once('/').unwrap();
        assert_eq!(path("Upload Node.js pkg"), format!("{dest_dir}/*"));
        assert!(!dest_dir.starts_with('/'));

        let Value::String(outputs) = &step("Build image").with_inputs["outputs"] else {
            panic!("outputs is not a string");
        };
        let image_dir = outputs
            .trim_start_matches("type=docker,dest=")
            .rsplit_once('/')
            .unwrap()
            .0;
        assert_eq!(path("Upload image"), format!("{image_dir}/*"));
        assert!(!image_dir.starts_with('/'));
    }

    #[test]
    fn test_meta_step() {
        let job = job_for(&build(ArtifactKinds::default(), &["20"]), false);
        let meta = &job.steps[1];
        assert_eq!(meta.id.as_deref(), Some("meta"));
        assert_eq!(meta.uses.as_deref(), Some("actions/github-script@v7"));
        assert!(meta.env.contains_key("MATRIX_NODE"));
        let Value::String(script) = &meta.with_inputs["script"] else {
            panic!("script is not a string");
        };
        assert!(script.contains("result.targetNode"));
    }
}
