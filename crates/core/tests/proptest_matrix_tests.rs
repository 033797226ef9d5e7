//! Property-based tests for matrix expansion and platform resolution.
//!
//! - Cell count is the product of the target dimensions
//! - Exactly one publishing cell, always built from the first OS
//! - Runner/platform resolution round-trips for logical names

use cigen_core::{BuildTarget, Error, Platform, expand, resolve_platform_tag, resolve_runner};
use proptest::prelude::*;

/// Any OS identifier the resolver accepts.
fn os_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("linux".to_string()),
        Just("mac".to_string()),
        Just("windows".to_string()),
        "ubuntu-[0-9]{2}\\.04".prop_map(String::from),
        "macos-1[3-5]".prop_map(String::from),
        "windows-20[12][0-9]".prop_map(String::from),
    ]
}

fn target_strategy() -> impl Strategy<Value = BuildTarget> {
    (
        proptest::collection::vec(os_strategy(), 1..4),
        proptest::collection::vec("[a-z0-9]{2,6}", 1..4),
        proptest::collection::vec("[0-9]{2}", 0..4),
    )
        .prop_map(|(os, arch, runtimes)| {
            BuildTarget::new(os, arch).with_runtime_versions(runtimes)
        })
}

proptest! {
    #[test]
    fn cell_count_is_product_of_dimensions(target in target_strategy()) {
        let cells = expand(&target).unwrap();
        let runtimes = target.runtime_versions.len().max(1);
        prop_assert_eq!(
            cells.len(),
            target.operating_systems.len() * target.architectures.len() * runtimes
        );
    }

    #[test]
    fn exactly_one_publishing_cell_from_first_os(target in target_strategy()) {
        let cells = expand(&target).unwrap();
        let publishing: Vec<_> = cells.iter().filter(|c| c.publish).collect();
        prop_assert_eq!(publishing.len(), 1);

        let first_os = &target.operating_systems[0];
        prop_assert_eq!(&publishing[0].os, &resolve_runner(first_os));
        prop_assert_eq!(&publishing[0].arch, &target.architectures[0]);
        prop_assert_eq!(
            publishing[0].runtime_version.as_ref(),
            target.runtime_versions.first()
        );
    }

    #[test]
    fn expansion_is_deterministic(target in target_strategy()) {
        prop_assert_eq!(expand(&target).unwrap(), expand(&target).unwrap());
    }

    #[test]
    fn unknown_os_is_rejected(os in "[a-z]{3,8}[0-9]?") {
        prop_assume!(!["linux", "mac", "windows", "win"].contains(&os.as_str()));
        prop_assert_eq!(resolve_platform_tag(&os), Err(Error::unrecognized_os(os.clone())));
        prop_assert!(expand(&BuildTarget::new([os.as_str()], ["x64"])).is_err());
    }
}

#[test]
fn logical_names_round_trip() {
    for platform in Platform::ALL {
        let tag = resolve_platform_tag(&resolve_runner(platform.as_str())).unwrap();
        assert_eq!(tag, platform);
    }
}
