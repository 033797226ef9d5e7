//! Publish jobs.
//!
//! Each publish job runs only for version tags, needs `build`, and reads the
//! publishing cell's metadata through [`MetadataExpr<Downstream>`].

use crate::workflow::build::{IMAGE_DIR, NODEPKG_DIR, bash, mkdir};
use crate::workflow::expr::{
    self, Downstream, MetadataExpr, PUBLISH_IMAGE_LABELS_OUTPUT, PUBLISH_IMAGE_TAGS_OUTPUT,
    TAG_REF_CONDITION,
};
use crate::workflow::schema::{Job, Step};
use cigen_core::{
    ArtifactKind, Error, ImageRegistry, PackageRegistry, PublishTarget, Registry, ReleaseChannel,
    Result,
};
use indexmap::IndexMap;
use serde_yaml::Value;

const RELEASE_ACTION: &str = "softprops/action-gh-release@v2";
const PUBLISH_RUNNER: &str = "ubuntu-latest";

/// Build one job per publish target, in target order.
///
/// # Errors
///
/// Returns [`Error::DuplicateJob`] when two targets map to the same job name.
pub fn publish_jobs(
    targets: impl IntoIterator<Item = PublishTarget>,
    runtime_versioned: bool,
) -> Result<IndexMap<String, Job>> {
    let meta = MetadataExpr::<Downstream>::new();
    let mut jobs = IndexMap::new();

    for target in targets {
        let (name, job) = match target {
            PublishTarget::ReleaseChannel(release) => release_job(&meta, &release),
            PublishTarget::PackageRegistry(registry) => {
                package_job(&meta, &registry, runtime_versioned)
            }
            PublishTarget::ImageRegistry(registry) => image_job(&meta, &registry),
        };
        if jobs.contains_key(&name) {
            return Err(Error::DuplicateJob { job: name });
        }
        tracing::debug!(job = %name, "Assembled publish job");
        jobs.insert(name, job);
    }

    Ok(jobs)
}

fn publish_job(meta: &MetadataExpr<Downstream>, name: String, runs_on: String) -> Job {
    Job::new(name, runs_on)
        .with_if(TAG_REF_CONDITION)
        .with_need(meta.source_job())
}

fn download(artifact_name: String, dir: &str) -> Step {
    Step::uses("actions/download-artifact@v4")
        .with_input("name", artifact_name)
        .with_input("path", dir)
}

fn release_job(meta: &MetadataExpr<Downstream>, release: &ReleaseChannel) -> (String, Job) {
    let token = expr::secret("GITHUB_TOKEN");

    let attach = |kind: ArtifactKind| -> Vec<Step> {
        let (dir, artifact_name, file_name) = match kind {
            ArtifactKind::LanguagePackage => {
                let pkg = meta.node_pkg();
                (NODEPKG_DIR, pkg.artifact_name(), pkg.file_name())
            }
            ArtifactKind::ContainerImage => {
                let image = meta.image();
                (IMAGE_DIR, image.artifact_name(), image.file_name())
            }
        };
        let label = match kind {
            ArtifactKind::LanguagePackage => "Node.js pkg",
            ArtifactKind::ContainerImage => "image",
        };
        vec![
            mkdir(dir),
            download(artifact_name, dir).with_name(format!("Download {label}")),
            Step::uses(RELEASE_ACTION)
                .with_name(format!("Attach {label}"))
                .with_env("GITHUB_TOKEN", token.clone())
                .with_input("files", format!("{dir}/{file_name}")),
        ]
    };

    let steps = [
        vec![
            Step::uses(RELEASE_ACTION)
                .with_name("Create")
                .with_env("GITHUB_TOKEN", token.clone()),
        ],
        if release.includes_package {
            attach(ArtifactKind::LanguagePackage)
        } else {
            Vec::new()
        },
        if release.includes_image {
            attach(ArtifactKind::ContainerImage)
        } else {
            Vec::new()
        },
    ]
    .concat();

    let job = publish_job(
        meta,
        format!("Publish release in {}", release.registry.display_name()),
        PUBLISH_RUNNER.to_string(),
    )
    .with_steps(steps);
    (format!("publish-{}-release", release.registry.slug()), job)
}

fn package_job(
    meta: &MetadataExpr<Downstream>,
    registry: &PackageRegistry,
    runtime_versioned: bool,
) -> (String, Job) {
    let pkg = meta.node_pkg();
    let (registry_url, token) = match registry.registry {
        Registry::Hosted => ("https://npm.pkg.github.com", "GITHUB_TOKEN"),
        Registry::Public => ("https://registry.npmjs.org", "NPM_TOKEN"),
    };

    let mut setup = Step::uses("actions/setup-node@v4")
        .with_name("Set up Node.js")
        .with_input("scope", format!("@{}", pkg.owner()));
    if runtime_versioned {
        setup = setup.with_input("node-version", meta.target_node());
    }
    setup = setup.with_input("registry-url", registry_url);

    let mut command = format!("npm publish {}", pkg.file_name());
    if registry.public_access {
        command.push_str(" --access public");
    }

    let steps = vec![
        download(pkg.artifact_name(), ".").with_name("Download"),
        setup,
        bash(command)
            .with_name("Publish")
            .with_env("NODE_AUTH_TOKEN", expr::secret(token)),
    ];

    let job = publish_job(
        meta,
        format!("Publish Node.js pkg in {}", registry.registry.display_name()),
        meta.target_os(),
    )
    .with_steps(steps);
    (format!("publish-{}-nodepkg", registry.registry.slug()), job)
}

fn image_job(meta: &MetadataExpr<Downstream>, registry: &ImageRegistry) -> (String, Job) {
    let image = meta.image();
    let steps = vec![
        mkdir(IMAGE_DIR),
        download(image.artifact_name(), IMAGE_DIR).with_name("Download"),
        bash(format!("docker load --input {IMAGE_DIR}/{}", image.file_name())).with_name("Load"),
        Step::uses("docker/login-action@v3")
            .with_name("Login")
            .with_input("registry", "ghcr.io")
            .with_input("username", expr::github("actor"))
            .with_input("password", expr::secret("GITHUB_TOKEN")),
        Step::uses("docker/build-push-action@v6")
            .with_name("Publish")
            .with_input(
                "tags",
                expr::job_output(meta.source_job(), PUBLISH_IMAGE_TAGS_OUTPUT),
            )
            .with_input(
                "labels",
                expr::job_output(meta.source_job(), PUBLISH_IMAGE_LABELS_OUTPUT),
            )
            .with_input("push", Value::Bool(true)),
    ];

    let job = publish_job(
        meta,
        format!("Publish image in {}", registry.registry.display_name()),
        PUBLISH_RUNNER.to_string(),
    )
    .with_steps(steps);
    (format!("publish-{}-image", registry.registry.slug()), job)
}
