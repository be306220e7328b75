// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Foreman contributors

use super::*;
use proptest::prelude::*;
use yare::parameterized;

#[parameterized(
    idle_to_implementing = { Phase::Idle, Phase::Implementing },
    idle_to_reviewing = { Phase::Idle, Phase::Reviewing },
    implementing_to_idle = { Phase::Implementing, Phase::Idle },
    implementing_to_awaiting = { Phase::Implementing, Phase::AwaitingReview },
    awaiting_to_committing = { Phase::AwaitingReview, Phase::Committing },
    awaiting_to_feedback = { Phase::AwaitingReview, Phase::AddressingFeedback },
    awaiting_to_idle = { Phase::AwaitingReview, Phase::Idle },
    reviewing_to_idle = { Phase::Reviewing, Phase::Idle },
    feedback_to_awaiting = { Phase::AddressingFeedback, Phase::AwaitingReview },
    feedback_to_idle = { Phase::AddressingFeedback, Phase::Idle },
    committing_to_idle = { Phase::Committing, Phase::Idle },
)]
fn valid_transitions(from: Phase, to: Phase) {
    assert!(from.can_transition_to(to), "{} -> {} should be valid", from, to);
}

#[parameterized(
    idle_to_awaiting = { Phase::Idle, Phase::AwaitingReview },
    idle_to_committing = { Phase::Idle, Phase::Committing },
    implementing_to_reviewing = { Phase::Implementing, Phase::Reviewing },
    implementing_to_committing = { Phase::Implementing, Phase::Committing },
    reviewing_to_implementing = { Phase::Reviewing, Phase::Implementing },
    committing_to_implementing = { Phase::Committing, Phase::Implementing },
    awaiting_to_reviewing = { Phase::AwaitingReview, Phase::Reviewing },
)]
fn invalid_transitions(from: Phase, to: Phase) {
    assert!(!from.can_transition_to(to), "{} -> {} should be invalid", from, to);
}

#[test]
fn no_self_transitions() {
    for phase in Phase::ALL {
        assert!(!phase.can_transition_to(phase));
    }
}

#[test]
fn only_idle_is_taskless() {
    for phase in Phase::ALL {
        assert_eq!(phase.requires_task(), phase != Phase::Idle);
    }
}

#[test]
fn serde_uses_snake_case() {
    let json = serde_json::to_string(&Phase::AwaitingReview).unwrap();
    assert_eq!(json, "\"awaiting_review\"");
    let back: Phase = serde_json::from_str("\"addressing_feedback\"").unwrap();
    assert_eq!(back, Phase::AddressingFeedback);
}

fn any_phase() -> impl Strategy<Value = Phase> {
    proptest::sample::select(Phase::ALL.to_vec())
}

proptest! {
    // The table is the single source of truth: every pair is either in the
    // table (and valid) or rejected, and validity matches Display-level
    // expectations (reachable phases never jump the review gate).
    #[test]
    fn transition_table_is_total(from in any_phase(), to in any_phase()) {
        let allowed = from.can_transition_to(to);
        // Self-loops are never allowed.
        if from == to {
            prop_assert!(!allowed);
        }
        // Committing is only reachable from awaiting_review.
        if to == Phase::Committing {
            prop_assert_eq!(allowed, from == Phase::AwaitingReview);
        }
        // Reviewing is only reachable from idle.
        if to == Phase::Reviewing {
            prop_assert_eq!(allowed, from == Phase::Idle);
        }
        // Idle is reachable from every non-idle phase.
        if to == Phase::Idle {
            prop_assert_eq!(allowed, from != Phase::Idle);
        }
    }
}
