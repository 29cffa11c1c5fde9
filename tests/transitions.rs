pub mod common;

use common::{applicant, approver, assigned, designer, ticket};
use reqsys::{
    db::ticket::Status,
    gateway::{Gateway, Request, Session},
    policy::{self, Actor},
};

const ALL: [Status; 5] = [
    Status::Pending,
    Status::InProgress,
    Status::Proofing,
    Status::WaitingReply,
    Status::Done,
];

const WORKING: [Status; 4] = [
    Status::InProgress,
    Status::Proofing,
    Status::WaitingReply,
    Status::Done,
];

#[test]
fn approver_decides_pending_tickets_only() {
    let actor = approver("護理部");

    assert!(policy::may_transition(
        &actor,
        Status::Pending,
        Status::InProgress
    ));
    assert!(policy::may_transition(
        &actor,
        Status::Pending,
        Status::WaitingReply
    ));
    assert!(!policy::may_transition(
        &actor,
        Status::Pending,
        Status::Done
    ));

    // Once decided, the ticket is out of the approver's hands.
    for from in WORKING {
        for to in ALL {
            assert!(!policy::may_transition(&actor, from, to));
        }
    }
}

#[test]
fn applicant_may_only_resubmit_a_returned_ticket() {
    let actor = applicant("護理部");

    assert!(policy::may_transition(
        &actor,
        Status::WaitingReply,
        Status::Pending
    ));
    for from in ALL {
        for to in ALL {
            let resubmission =
                from == Status::WaitingReply && to == Status::Pending;
            assert_eq!(
                policy::may_transition(&actor, from, to),
                resubmission,
            );
        }
    }
}

#[test]
fn production_roles_move_freely_between_working_statuses() {
    for actor in [designer("設計師 蔡OO"), Actor::Lead] {
        for from in WORKING {
            for to in WORKING {
                assert!(policy::may_transition(&actor, from, to));
            }
        }
        // Neither side of a pending ticket is theirs to touch.
        for status in ALL {
            assert!(!policy::may_transition(
                &actor,
                Status::Pending,
                status
            ));
            assert!(!policy::may_transition(
                &actor,
                status,
                Status::Pending
            ));
        }
    }
}

#[test]
fn assignment_is_lead_only_and_never_while_pending() {
    for status in WORKING {
        assert!(policy::may_assign(&Actor::Lead, status));
        assert!(!policy::may_assign(&approver("護理部"), status));
        assert!(!policy::may_assign(&designer("設計師 蔡OO"), status));
        assert!(!policy::may_assign(&applicant("護理部"), status));
    }
    assert!(!policy::may_assign(&Actor::Lead, Status::Pending));
}

#[tokio::test]
async fn repeating_a_transition_changes_nothing_further() {
    let t = assigned(
        ticket("E170-2025-0301", "護理部", Status::InProgress),
        "設計師 蔡OO",
    );
    let id = t.id;
    let gateway = Gateway::new(common::MemStore::with_tickets(vec![t]));
    let actor = designer("設計師 蔡OO");
    let mut session = Session::new();

    let first = gateway
        .apply(
            &mut session,
            &actor,
            Request::ChangeStatus {
                id,
                status: Status::Proofing,
            },
        )
        .await
        .unwrap();
    let first = first.ticket.unwrap();

    let second = gateway
        .apply(
            &mut session,
            &actor,
            Request::ChangeStatus {
                id,
                status: Status::Proofing,
            },
        )
        .await
        .unwrap();
    let second = second.ticket.unwrap();

    assert_eq!(second.status, Status::Proofing);
    assert_eq!(second.assigned_to_name, first.assigned_to_name);
    assert_eq!(second.code, first.code);

    // Only the real change made it into the history.
    let history = gateway.store().history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from, Status::InProgress);
    assert_eq!(history[0].to, Status::Proofing);
}
