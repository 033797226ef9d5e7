//! Integration tests for workflow generation.
//!
//! These tests drive [`WorkflowGenerator`] end to end, from a
//! [`GeneratorConfig`] to the assembled job graph and its YAML rendering.

use cigen_core::{
    ArtifactKinds, BuildConfig, BuildTarget, Error, GeneratorConfig, Manifest, PublishConfig,
    ReleaseChannel,
};
use cigen_github::WorkflowGenerator;

fn manifest() -> Manifest {
    Manifest {
        name: "@acme/widget".to_string(),
        version: "1.4.0".to_string(),
        minimum_runtime_version: Some("18.0.0".to_string()),
    }
}

fn config(
    target: BuildTarget,
    artifacts: ArtifactKinds,
    publish: PublishConfig,
) -> GeneratorConfig {
    GeneratorConfig {
        build: BuildConfig { target, artifacts },
        publish,
        manifest: Some(manifest()),
    }
}

const PACKAGE: ArtifactKinds = ArtifactKinds {
    language_package: true,
    container_image: false,
};

const IMAGE: ArtifactKinds = ArtifactKinds {
    language_package: false,
    container_image: true,
};

/// Single-cell package build published to the hosted registry.
mod package_scenario {
    use super::*;

    fn scenario() -> GeneratorConfig {
        config(
            BuildTarget::new(["linux"], ["x64"]),
            PACKAGE,
            PublishConfig {
                packages: vec!["hosted:public".parse().unwrap()],
                ..Default::default()
            },
        )
    }

    /// Exactly the build job and one publish job.
    #[test]
    fn builds_two_jobs() {
        let workflow = WorkflowGenerator::new().build(&scenario()).unwrap();
        let names: Vec<_> = workflow.jobs.keys().map(String::as_str).collect();
        assert_eq!(names, ["build", "publish-github-nodepkg"]);

        let cells = &workflow.jobs["build"].strategy.as_ref().unwrap().matrix.include;
        assert_eq!(cells.len(), 1);
        assert!(cells[0].publish);
    }

    /// The publish job is tag-gated, needs build and publishes with public access.
    #[test]
    fn publish_job_is_tag_gated() {
        let workflow = WorkflowGenerator::new().build(&scenario()).unwrap();
        let job = &workflow.jobs["publish-github-nodepkg"];
        assert_eq!(
            job.if_condition.as_deref(),
            Some("startsWith(github.ref, 'refs/tags/')")
        );
        assert_eq!(job.needs, ["build"]);

        let publish = job
            .steps
            .iter()
            .find_map(|s| s.run.as_deref())
            .unwrap();
        assert!(publish.starts_with("npm publish "));
        assert!(publish.ends_with(" --access public"));
    }
}

/// Two-OS image build pushed to the hosted container registry.
mod image_scenario {
    use super::*;

    fn scenario() -> GeneratorConfig {
        let mut cfg = config(
            BuildTarget::new(["linux", "mac"], ["x64"]),
            IMAGE,
            PublishConfig {
                images: vec!["hosted".parse().unwrap()],
                ..Default::default()
            },
        );
        cfg.manifest = None;
        cfg
    }

    /// Two cells, linux/x64 is the only publishing cell.
    #[test]
    fn only_first_os_publishes() {
        let workflow = WorkflowGenerator::new().build(&scenario()).unwrap();
        let cells = &workflow.jobs["build"].strategy.as_ref().unwrap().matrix.include;
        assert_eq!(cells.len(), 2);

        let publishing: Vec<_> = cells.iter().filter(|c| c.publish).collect();
        assert_eq!(publishing.len(), 1);
        assert_eq!(publishing[0].os, "ubuntu-latest");
        assert_eq!(publishing[0].arch, "x64");
    }

    /// Exactly one image publish job, fed by the build job's image metadata.
    #[test]
    fn one_image_publish_job() {
        let workflow = WorkflowGenerator::new().build(&scenario()).unwrap();
        let image_jobs: Vec<_> = workflow
            .jobs
            .keys()
            .filter(|name| name.ends_with("-image"))
            .collect();
        assert_eq!(image_jobs, ["publish-github-image"]);

        let outputs = &workflow.jobs["build"].outputs;
        assert!(outputs.contains_key("publish_image_tags"));
        assert!(outputs.contains_key("publish_image_labels"));
    }
}

/// Configuration errors stop generation before any document exists.
mod failures {
    use super::*;

    #[test]
    fn unknown_os_is_rejected() {
        let cfg = config(
            BuildTarget::new(["plan9"], ["x64"]),
            ArtifactKinds::default(),
            PublishConfig::default(),
        );
        assert_eq!(
            WorkflowGenerator::new().render(&cfg),
            Err(Error::UnrecognizedOs {
                os: "plan9".to_string()
            })
        );
    }

    #[test]
    fn unscoped_package_name_is_rejected() {
        let mut cfg = config(
            BuildTarget::new(["linux"], ["x64"]),
            PACKAGE,
            PublishConfig::default(),
        );
        cfg.manifest = Some(Manifest {
            name: "widget".to_string(),
            ..manifest()
        });
        assert!(matches!(
            WorkflowGenerator::new().render(&cfg),
            Err(Error::InvalidPackageName { .. })
        ));
    }

    #[test]
    fn duplicate_release_is_rejected() {
        let release = ReleaseChannel::parse("hosted", true, false).unwrap();
        let cfg = config(
            BuildTarget::new(["linux"], ["x64"]),
            PACKAGE,
            PublishConfig {
                releases: vec![release, release],
                ..Default::default()
            },
        );
        assert_eq!(
            WorkflowGenerator::new().render(&cfg),
            Err(Error::DuplicateJob {
                job: "publish-github-release".to_string()
            })
        );
    }
}

/// Properties of the rendered document.
mod rendering {
    use super::*;

    fn everything() -> GeneratorConfig {
        config(
            BuildTarget::new(["linux", "windows"], ["x64", "arm64"])
                .with_runtime_versions(["18", "20"]),
            ArtifactKinds {
                language_package: true,
                container_image: true,
            },
            PublishConfig {
                releases: vec![ReleaseChannel::parse("hosted", true, true).unwrap()],
                packages: vec![
                    "hosted:public".parse().unwrap(),
                    "public:public".parse().unwrap(),
                ],
                images: vec!["hosted".parse().unwrap()],
            },
        )
    }

    /// Same configuration, same bytes.
    #[test]
    fn rendering_is_idempotent() {
        let generator = WorkflowGenerator::new();
        let first = generator.render(&everything()).unwrap();
        let second = generator.render(&everything()).unwrap();
        assert_eq!(first, second);
    }

    /// Every job other than build needs build.
    #[test]
    fn publish_jobs_need_build() {
        let workflow = WorkflowGenerator::new().build(&everything()).unwrap();
        assert_eq!(workflow.jobs.len(), 5);
        for (name, job) in &workflow.jobs {
            if name == "build" {
                assert!(job.needs.is_empty());
            } else {
                assert_eq!(job.needs, ["build"], "job {name}");
            }
        }
    }

    /// The metadata script survives serialization line for line.
    #[test]
    fn script_round_trips_through_yaml() {
        let generator = WorkflowGenerator::new();
        let workflow = generator.build(&everything()).unwrap();
        let script = workflow.jobs["build"].steps[1].with_inputs["script"]
            .as_str()
            .unwrap()
            .to_string();

        let yaml = generator.serialize(&workflow).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let reparsed = parsed["jobs"]["build"]["steps"][1]["with"]["script"]
            .as_str()
            .unwrap();
        assert_eq!(reparsed, script);
        assert!(reparsed.lines().count() > 10);
    }

    /// Matrix values are written out as explicit include entries.
    #[test]
    fn matrix_is_explicit_include_list() {
        let yaml = WorkflowGenerator::new().render(&everything()).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        let include = parsed["jobs"]["build"]["strategy"]["matrix"]["include"]
            .as_sequence()
            .unwrap();
        assert_eq!(include.len(), 8);
        assert_eq!(include[0]["os"].as_str(), Some("ubuntu-latest"));
        assert_eq!(include[0]["node"].as_str(), Some("18"));
        assert_eq!(include[0]["publish"].as_bool(), Some(true));
        assert_eq!(include[4]["platform"].as_str(), Some("windows"));
        assert_eq!(parsed["jobs"]["build"]["strategy"]["fail-fast"].as_bool(), Some(false));
    }
}
