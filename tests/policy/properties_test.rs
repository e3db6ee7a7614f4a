/*!
 * Property Tests
 * Invariants that hold for arbitrary stores, contexts and frames
 */

use crate::frames::FrameBuilder;
use cgroup_guard::core::limits::MAX_CONTAINER_SLOTS;
use cgroup_guard::events::NullSink;
use cgroup_guard::maps::{ConfigKey, LookupMode, PolicyMaps};
use cgroup_guard::policy::{
    ConfidentialFileEvaluator, ContainerScopeEvaluator, FileEvaluator, IpRangeEvaluator, PacketEvaluator,
    PortPairEvaluator,
};
use cgroup_guard::{AccessMask, ContainerId, FileOperationContext, PacketContext, Verdict};
use proptest::collection::{hash_map, vec};
use proptest::prelude::*;
use std::collections::HashMap;
use std::net::Ipv4Addr;

fn populated(members: &HashMap<usize, u64>) -> PolicyMaps {
    let maps = PolicyMaps::detached();
    for (&slot, &id) in members {
        maps.membership.set(slot, ContainerId(id)).unwrap();
    }
    maps
}

fn lookup_mode() -> impl Strategy<Value = LookupMode> {
    prop_oneof![Just(LookupMode::Indexed), Just(LookupMode::Scan)]
}

fn members() -> impl Strategy<Value = HashMap<usize, u64>> {
    hash_map(0..MAX_CONTAINER_SLOTS, 1u64.., 0..=MAX_CONTAINER_SLOTS)
}

proptest! {
    #[test]
    fn prop_non_members_allowed(members in members(), id in 1u64.., lookup in lookup_mode()) {
        prop_assume!(!members.values().any(|&m| m == id));
        let maps = populated(&members);
        let ctx = FileOperationContext::new(ContainerId(id));

        for evaluator in [ContainerScopeEvaluator::chmod(), ContainerScopeEvaluator::rmdir()] {
            prop_assert_eq!(evaluator.with_lookup(lookup).evaluate(&ctx, &maps, &NullSink), Verdict::Allow);
        }
    }

    #[test]
    fn prop_members_denied_in_any_slot(
        members in members(),
        slot in 0..MAX_CONTAINER_SLOTS,
        id in 1u64..,
        lookup in lookup_mode()
    ) {
        let maps = populated(&members);
        maps.membership.set(slot, ContainerId(id)).unwrap();
        let ctx = FileOperationContext::new(ContainerId(id));

        for evaluator in [ContainerScopeEvaluator::chmod(), ContainerScopeEvaluator::rmdir()] {
            prop_assert_eq!(evaluator.with_lookup(lookup).evaluate(&ctx, &maps, &NullSink), Verdict::Deny);
        }
    }

    #[test]
    fn prop_lookup_modes_agree(members in members(), id in any::<u64>()) {
        let maps = populated(&members);
        let indexed = maps.membership.lookup(ContainerId(id), LookupMode::Indexed).is_some();
        let scanned = maps.membership.lookup(ContainerId(id), LookupMode::Scan).is_some();
        prop_assert_eq!(indexed, scanned);
    }

    #[test]
    fn prop_scan_probes_every_slot(members in members(), id in any::<u64>()) {
        let maps = populated(&members);
        prop_assert_eq!(maps.membership.scan(ContainerId(id)).probes, MAX_CONTAINER_SLOTS);
    }

    #[test]
    fn prop_confidential_non_member_always_allowed(
        id in 1u64..,
        name in vec(any::<u8>(), 0..300),
        mask in any::<u32>()
    ) {
        let maps = PolicyMaps::detached();
        maps.membership.set(0, ContainerId(id.wrapping_add(1).max(1))).unwrap();
        prop_assume!(!maps.membership.is_member(ContainerId(id)));

        let ctx = FileOperationContext::permission(ContainerId(id), &name, AccessMask::from_bits_retain(mask));
        prop_assert_eq!(ConfidentialFileEvaluator::new().evaluate(&ctx, &maps, &NullSink), Verdict::Allow);
    }

    #[test]
    fn prop_confidential_member_denied_iff_write_or_exec(
        stem in vec(1u8..=255, 0..200),
        mask in any::<u32>()
    ) {
        let maps = PolicyMaps::detached();
        maps.membership.set(5, ContainerId(9)).unwrap();

        let mut name = stem;
        name.extend_from_slice(b"confidential");
        let access = AccessMask::from_bits_retain(mask);
        let ctx = FileOperationContext::permission(ContainerId(9), &name, access);

        let expected = if access.writes_or_executes() { Verdict::Deny } else { Verdict::Allow };
        prop_assert_eq!(ConfidentialFileEvaluator::new().evaluate(&ctx, &maps, &NullSink), expected);
    }

    #[test]
    fn prop_evaluation_is_idempotent(
        members in members(),
        id in any::<u64>(),
        frame in vec(any::<u8>(), 0..96)
    ) {
        let maps = populated(&members);
        let ctx = FileOperationContext::permission(ContainerId(id), b"x.confidential", AccessMask::WRITE);
        let packet = PacketContext::new(&frame);

        let chmod = ContainerScopeEvaluator::chmod();
        let confidential = ConfidentialFileEvaluator::new();
        let ports = PortPairEvaluator::default();

        let first = (
            chmod.evaluate(&ctx, &maps, &NullSink),
            confidential.evaluate(&ctx, &maps, &NullSink),
            ports.evaluate(&packet, &maps, &NullSink),
        );
        for _ in 0..3 {
            let again = (
                chmod.evaluate(&ctx, &maps, &NullSink),
                confidential.evaluate(&ctx, &maps, &NullSink),
                ports.evaluate(&packet, &maps, &NullSink),
            );
            prop_assert_eq!(again, first);
        }
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(frame in vec(any::<u8>(), 0..128)) {
        let maps = PolicyMaps::detached();
        maps.config.set_filter_enabled(true);
        let packet = PacketContext::new(&frame);

        let _ = PortPairEvaluator::default().evaluate(&packet, &maps, &NullSink);
        let _ = IpRangeEvaluator::default().evaluate(&packet, &maps, &NullSink);
    }

    #[test]
    fn prop_disabled_filter_allows_any_address(
        source in any::<u32>(),
        lower in any::<u32>(),
        upper in any::<u32>(),
        flag_present in any::<bool>()
    ) {
        let maps = PolicyMaps::detached();
        maps.config.set_ip_range(Ipv4Addr::from(lower), Ipv4Addr::from(upper));
        if flag_present {
            maps.config.set(ConfigKey::FilterEnabled, 0);
        }

        let frame = FrameBuilder::tcp(1, 2).source(Ipv4Addr::from(source)).build();
        prop_assert_eq!(
            IpRangeEvaluator::default().evaluate(&PacketContext::new(&frame), &maps, &NullSink),
            Verdict::Allow
        );
    }

    #[test]
    fn prop_port_pair_allows_exactly_the_pair(source in any::<u16>(), destination in any::<u16>()) {
        let frame = FrameBuilder::tcp(source, destination).build();
        let verdict = PortPairEvaluator::default().evaluate(&PacketContext::new(&frame), &PolicyMaps::detached(), &NullSink);

        let allowed = (source, destination) == (1234, 80) || (source, destination) == (80, 1234);
        prop_assert_eq!(verdict.is_allowed(), allowed);
    }
}
