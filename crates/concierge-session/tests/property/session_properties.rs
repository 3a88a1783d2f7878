use concierge_core::config::SessionConfig;
use concierge_core::intent::UtteranceIntent;
use concierge_core::models::{DialoguePhase, TurnDelta, TurnRecord};
use concierge_session::ContextManager;
use proptest::prelude::*;
use test_fixtures::{place, ranked};

#[derive(Debug, Clone)]
enum Op {
    /// A valid commit against the current version.
    Commit { results: usize, phase: DialoguePhase },
    /// A commit built against an older version.
    Stale { lag: u64 },
    /// A commit that tries to store a transient phase.
    Transient,
    /// A bookkeeping cursor update.
    Present { upto: usize },
}

fn arb_phase() -> impl Strategy<Value = DialoguePhase> {
    prop_oneof![
        Just(DialoguePhase::Idle),
        Just(DialoguePhase::Presenting),
        Just(DialoguePhase::AwaitingDisambiguation),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0usize..8, arb_phase()).prop_map(|(results, phase)| Op::Commit { results, phase }),
        2 => (1u64..4).prop_map(|lag| Op::Stale { lag }),
        1 => Just(Op::Transient),
        2 => (0usize..10).prop_map(|upto| Op::Present { upto }),
    ]
}

fn delta_with_results(base_version: u64, n: usize, phase: DialoguePhase) -> TurnDelta {
    let results = ranked((0..n).map(|i| place(&format!("p{i}")).build()).collect());
    TurnDelta {
        base_version,
        ..TurnDelta::default()
    }
    .with_turn(TurnRecord::new("query", UtteranceIntent::NewTopic, n))
    .with_results(results)
    .with_phase(phase)
}

proptest! {
    #[test]
    fn rejected_commits_leave_state_untouched(ops in proptest::collection::vec(arb_op(), 1..30)) {
        let manager = ContextManager::in_memory(SessionConfig::default());
        let key = "prop";

        for op in ops {
            let before = manager.get_state(key).unwrap();
            let result = match op {
                Op::Commit { results, phase } => {
                    manager.commit_turn(key, delta_with_results(before.version, results, phase))
                }
                Op::Stale { lag } if before.version >= lag => manager.commit_turn(
                    key,
                    delta_with_results(before.version - lag, 1, DialoguePhase::Presenting),
                ),
                Op::Stale { .. } => continue,
                Op::Transient => manager.commit_turn(
                    key,
                    TurnDelta::against(&before).with_phase(DialoguePhase::Searching),
                ),
                Op::Present { upto } => manager.mark_presented(key, upto),
            };
            let after = manager.get_state(key).unwrap();

            match result {
                Ok(committed) => {
                    prop_assert_eq!(committed.version, before.version + 1);
                    prop_assert_eq!(&committed, &after);
                    prop_assert_eq!(after.references.len(), after.last_results.len());
                    prop_assert!(after.presentation_cursor <= after.last_results.len());
                    prop_assert!(after.turns.len() <= SessionConfig::default().history_depth);
                    prop_assert!(after.phase.is_committable());
                }
                Err(_) => prop_assert_eq!(&before, &after),
            }
        }
    }

    #[test]
    fn versions_increase_by_one_per_commit(n in 1usize..20) {
        let manager = ContextManager::in_memory(SessionConfig::default());
        for expected in 1..=n as u64 {
            let state = manager.get_state("v").unwrap();
            let next = manager
                .commit_turn("v", TurnDelta::against(&state).with_cursor(0))
                .unwrap();
            prop_assert_eq!(next.version, expected);
        }
    }
}
