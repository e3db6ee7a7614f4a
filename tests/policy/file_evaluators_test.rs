/*!
 * Filesystem Evaluator Tests
 * chmod/rmdir container scope and confidential file permission checks
 */

use cgroup_guard::events::{DecisionReason, EventCollector, NullSink};
use cgroup_guard::maps::{LookupMode, PolicyMaps};
use cgroup_guard::policy::{ConfidentialFileEvaluator, ContainerScopeEvaluator, FileEvaluator};
use cgroup_guard::{AccessMask, ContainerId, FileOperationContext, Hook, Verdict};
use pretty_assertions::assert_eq;

fn maps_with(members: &[(usize, u64)]) -> PolicyMaps {
    let maps = PolicyMaps::detached();
    for &(slot, id) in members {
        maps.membership.set(slot, ContainerId(id)).unwrap();
    }
    maps
}

#[test]
fn test_chmod_denies_monitored_container() {
    let maps = maps_with(&[(0, 4242)]);
    let chmod = ContainerScopeEvaluator::chmod();

    let verdict = chmod.evaluate(&FileOperationContext::new(ContainerId(4242)), &maps, &NullSink);
    assert_eq!(verdict, Verdict::Deny);
    assert_eq!(verdict.as_lsm_return(), -1);
}

#[test]
fn test_chmod_allows_unmonitored_container() {
    let maps = maps_with(&[(0, 4242)]);
    let chmod = ContainerScopeEvaluator::chmod();

    let verdict = chmod.evaluate(&FileOperationContext::new(ContainerId(7)), &maps, &NullSink);
    assert_eq!(verdict, Verdict::Allow);
    assert_eq!(verdict.as_lsm_return(), 0);
}

#[test]
fn test_member_in_last_slot_is_found_by_both_lookups() {
    let maps = maps_with(&[(63, 900)]);
    let ctx = FileOperationContext::new(ContainerId(900));

    for lookup in [LookupMode::Indexed, LookupMode::Scan] {
        let rmdir = ContainerScopeEvaluator::rmdir().with_lookup(lookup);
        assert_eq!(rmdir.evaluate(&ctx, &maps, &NullSink), Verdict::Deny);
    }
}

#[test]
fn test_empty_table_allows_every_caller() {
    let maps = PolicyMaps::detached();
    let rmdir = ContainerScopeEvaluator::rmdir();

    for id in [1u64, 42, u64::MAX] {
        let ctx = FileOperationContext::new(ContainerId(id));
        assert_eq!(rmdir.evaluate(&ctx, &maps, &NullSink), Verdict::Allow);
    }
}

#[test]
fn test_zero_id_never_matches_empty_slots() {
    let maps = maps_with(&[(3, 55)]);
    let chmod = ContainerScopeEvaluator::chmod().with_lookup(LookupMode::Scan);

    let ctx = FileOperationContext::new(ContainerId::EMPTY);
    assert_eq!(chmod.evaluate(&ctx, &maps, &NullSink), Verdict::Allow);
}

#[test]
fn test_chmod_and_rmdir_share_semantics() {
    let maps = maps_with(&[(10, 1), (20, 2)]);
    let chmod = ContainerScopeEvaluator::chmod();
    let rmdir = ContainerScopeEvaluator::rmdir();

    for id in 0..5u64 {
        let ctx = FileOperationContext::new(ContainerId(id));
        assert_eq!(
            chmod.evaluate(&ctx, &maps, &NullSink),
            rmdir.evaluate(&ctx, &maps, &NullSink)
        );
    }
    assert_eq!(chmod.hook(), Hook::Chmod);
    assert_eq!(rmdir.hook(), Hook::Rmdir);
    assert_eq!(chmod.name(), "path_chmod");
    assert_eq!(rmdir.name(), "path_rmdir");
}

#[test]
fn test_membership_change_takes_effect_on_next_call() {
    let maps = PolicyMaps::detached();
    let chmod = ContainerScopeEvaluator::chmod();
    let ctx = FileOperationContext::new(ContainerId(77));

    assert_eq!(chmod.evaluate(&ctx, &maps, &NullSink), Verdict::Allow);
    maps.membership.set(12, ContainerId(77)).unwrap();
    assert_eq!(chmod.evaluate(&ctx, &maps, &NullSink), Verdict::Deny);
    maps.membership.clear(12).unwrap();
    assert_eq!(chmod.evaluate(&ctx, &maps, &NullSink), Verdict::Allow);
}

#[test]
fn test_chmod_records_allows_rmdir_does_not() {
    let maps = PolicyMaps::detached();
    let events = EventCollector::new();
    let ctx = FileOperationContext::new(ContainerId(5));

    ContainerScopeEvaluator::chmod().evaluate(&ctx, &maps, &events);
    ContainerScopeEvaluator::rmdir().evaluate(&ctx, &maps, &events);

    let recorded = events.recent(10);
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].hook, Hook::Chmod);
    assert_eq!(recorded[0].reason, DecisionReason::UnmonitoredContainer);
}

#[test]
fn test_denial_event_carries_matching_slot() {
    let maps = maps_with(&[(33, 808)]);
    let events = EventCollector::new();

    ContainerScopeEvaluator::rmdir().evaluate(&FileOperationContext::new(ContainerId(808)), &maps, &events);

    let recorded = events.by_container(ContainerId(808), 1);
    assert_eq!(recorded[0].verdict, Verdict::Deny);
    assert_eq!(recorded[0].slot, Some(33));
    assert_eq!(recorded[0].reason, DecisionReason::MonitoredContainer);
}

// Confidential file evaluator

fn permission(id: u64, name: &str, mask: AccessMask) -> FileOperationContext {
    FileOperationContext::permission(ContainerId(id), name.as_bytes(), mask)
}

#[test]
fn test_confidential_write_denied_for_member() {
    let maps = maps_with(&[(0, 1)]);
    let evaluator = ConfidentialFileEvaluator::new();

    let ctx = permission(1, "report.confidential", AccessMask::WRITE);
    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Deny);
}

#[test]
fn test_confidential_exec_denied_for_member() {
    let maps = maps_with(&[(0, 1)]);
    let evaluator = ConfidentialFileEvaluator::new();

    let ctx = permission(1, "run.confidential", AccessMask::EXEC | AccessMask::READ);
    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Deny);
}

#[test]
fn test_confidential_read_allowed_for_member() {
    let maps = maps_with(&[(0, 1)]);
    let evaluator = ConfidentialFileEvaluator::new();

    let ctx = permission(1, "report.confidential", AccessMask::READ);
    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Allow);

    let ctx = permission(1, "report.confidential", AccessMask::APPEND);
    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Allow);
}

#[test]
fn test_confidential_write_allowed_for_non_member() {
    let maps = maps_with(&[(0, 1)]);
    let evaluator = ConfidentialFileEvaluator::new();

    let ctx = permission(2, "report.confidential", AccessMask::WRITE);
    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Allow);
}

#[test]
fn test_suffix_must_match_exactly() {
    let maps = maps_with(&[(0, 1)]);
    let evaluator = ConfidentialFileEvaluator::new();

    let cases = [
        ("confidential", Verdict::Deny),
        ("xconfidential", Verdict::Deny),
        ("onfidential", Verdict::Allow),
        ("report.Confidential", Verdict::Allow),
        ("confidential.txt", Verdict::Allow),
        ("confidential ", Verdict::Allow),
        ("", Verdict::Allow),
    ];
    for (name, expected) in cases {
        let ctx = permission(1, name, AccessMask::WRITE);
        assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), expected, "name {:?}", name);
    }
}

#[test]
fn test_name_stops_at_first_nul() {
    let maps = maps_with(&[(0, 1)]);
    let evaluator = ConfidentialFileEvaluator::new();

    let ctx = FileOperationContext::permission(ContainerId(1), b"plain\0.confidential", AccessMask::WRITE);
    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Allow);

    let ctx = FileOperationContext::permission(ContainerId(1), b"a.confidential\0junk", AccessMask::WRITE);
    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Deny);
}

#[test]
fn test_truncated_name_tests_captured_prefix_only() {
    let maps = maps_with(&[(0, 1)]);
    let evaluator = ConfidentialFileEvaluator::new();

    // real suffix lies past the capture buffer
    let mut long = "a".repeat(300);
    long.push_str(".confidential");
    let ctx = permission(1, &long, AccessMask::WRITE);
    assert!(ctx.name.unwrap().is_truncated());
    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Allow);

    // suffix ends exactly at the last captured byte
    let mut fits = "b".repeat(255 - "confidential".len());
    fits.push_str("confidential");
    let ctx = permission(1, &fits, AccessMask::WRITE);
    assert!(!ctx.name.unwrap().is_truncated());
    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Deny);
}

#[test]
fn test_missing_name_or_mask() {
    let maps = maps_with(&[(0, 1)]);
    let evaluator = ConfidentialFileEvaluator::new();

    let no_name = FileOperationContext::new(ContainerId(1)).with_mask(AccessMask::WRITE);
    assert_eq!(evaluator.evaluate(&no_name, &maps, &NullSink), Verdict::Allow);

    let no_mask = FileOperationContext::new(ContainerId(1)).with_name(b"x.confidential");
    assert_eq!(evaluator.evaluate(&no_mask, &maps, &NullSink), Verdict::Allow);
}

#[test]
fn test_membership_cleared_between_calls() {
    let maps = maps_with(&[(4, 1)]);
    let evaluator = ConfidentialFileEvaluator::new().with_lookup(LookupMode::Scan);
    let ctx = permission(1, "db.confidential", AccessMask::WRITE);

    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Deny);
    maps.membership.clear(4).unwrap();
    assert_eq!(evaluator.evaluate(&ctx, &maps, &NullSink), Verdict::Allow);
}

#[test]
fn test_confidential_events() {
    let maps = maps_with(&[(2, 1)]);
    let evaluator = ConfidentialFileEvaluator::new();
    let events = EventCollector::new();

    evaluator.evaluate(&permission(1, "a.confidential", AccessMask::READ), &maps, &events);
    evaluator.evaluate(&permission(1, "a.confidential", AccessMask::WRITE), &maps, &events);
    evaluator.evaluate(&permission(1, "a.txt", AccessMask::WRITE), &maps, &events);

    let recorded = events.recent(10);
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].reason, DecisionReason::ConfidentialReadOnly);
    assert_eq!(recorded[0].verdict, Verdict::Allow);
    assert_eq!(recorded[1].reason, DecisionReason::ConfidentialWriteOrExec);
    assert_eq!(recorded[1].slot, Some(2));
    assert_eq!(recorded[1].filename.as_ref().map(|n| n.to_string()).as_deref(), Some("a.confidential"));
    assert_eq!(recorded[1].mask, Some(AccessMask::WRITE));
}
