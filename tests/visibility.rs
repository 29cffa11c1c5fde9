pub mod common;

use common::{applicant, approver, assigned, designer, ticket};
use reqsys::{
    db::ticket::Status,
    demo,
    policy::{self, Actor, Queue},
};

#[test]
fn every_role_sees_a_subset_of_the_full_set() {
    let tickets = demo::demo_tickets();
    let actors = [
        applicant("護理部"),
        approver("內科"),
        designer("設計師 蔡OO"),
        Actor::Lead,
    ];

    assert_eq!(tickets.len(), 40);
    for actor in &actors {
        let visible = tickets
            .iter()
            .filter(|t| policy::visible(actor, t))
            .count();
        assert!(visible <= tickets.len());
    }
}

#[test]
fn applicant_sees_only_their_unit() {
    let actor = applicant("護理部");
    assert!(policy::visible(
        &actor,
        &ticket("E170-2025-0001", "護理部", Status::Pending)
    ));
    assert!(!policy::visible(
        &actor,
        &ticket("E170-2025-0002", "內科", Status::Pending)
    ));
}

#[test]
fn approver_sees_only_their_unit() {
    let actor = approver("內科");
    assert!(policy::visible(
        &actor,
        &ticket("E170-2025-0003", "內科", Status::Done)
    ));
    assert!(!policy::visible(
        &actor,
        &ticket("E170-2025-0004", "護理部", Status::Done)
    ));
}

#[test]
fn designer_sees_assigned_tickets_until_done() {
    let actor = designer("設計師 蔡OO");
    let mine = assigned(
        ticket("E170-2025-0005", "護理部", Status::InProgress),
        "設計師 蔡OO",
    );
    assert!(policy::visible(&actor, &mine));

    let someone_elses = assigned(
        ticket("E170-2025-0006", "護理部", Status::InProgress),
        "設計師 李OO",
    );
    assert!(!policy::visible(&actor, &someone_elses));

    let finished = assigned(
        ticket("E170-2025-0007", "護理部", Status::Done),
        "設計師 蔡OO",
    );
    assert!(!policy::visible(&actor, &finished));

    let unassigned = ticket("E170-2025-0008", "護理部", Status::InProgress);
    assert!(!policy::visible(&actor, &unassigned));
}

#[test]
fn lead_sees_everything() {
    for t in demo::demo_tickets() {
        assert!(policy::visible(&Actor::Lead, &t));
    }
}

#[test]
fn applicant_queues_split_by_who_must_act() {
    let active = [Status::InProgress, Status::Proofing];
    let needs_attention = [Status::WaitingReply, Status::Pending];

    for status in active {
        let t = ticket("E170-2025-0010", "護理部", status);
        assert!(policy::in_queue(Queue::ApplicantActive, &t));
        assert!(!policy::in_queue(Queue::ApplicantNeedsAttention, &t));
    }
    for status in needs_attention {
        let t = ticket("E170-2025-0011", "護理部", status);
        assert!(policy::in_queue(Queue::ApplicantNeedsAttention, &t));
        assert!(!policy::in_queue(Queue::ApplicantActive, &t));
    }

    let done = ticket("E170-2025-0012", "護理部", Status::Done);
    assert!(!policy::in_queue(Queue::ApplicantActive, &done));
    assert!(!policy::in_queue(Queue::ApplicantNeedsAttention, &done));
}

#[test]
fn approver_pending_queue_holds_only_pending() {
    for status in [
        Status::Pending,
        Status::InProgress,
        Status::Proofing,
        Status::WaitingReply,
        Status::Done,
    ] {
        let t = ticket("E170-2025-0013", "內科", status);
        assert_eq!(
            policy::in_queue(Queue::ApproverPending, &t),
            status == Status::Pending,
        );
    }
}

#[test]
fn approver_active_queue_excludes_pending_and_done() {
    for status in
        [Status::InProgress, Status::Proofing, Status::WaitingReply]
    {
        let t = ticket("E170-2025-0014", "內科", status);
        assert!(policy::in_queue(Queue::ApproverActive, &t));
    }
    for status in [Status::Pending, Status::Done] {
        let t = ticket("E170-2025-0015", "內科", status);
        assert!(!policy::in_queue(Queue::ApproverActive, &t));
    }
}

#[test]
fn lead_to_assign_includes_unassigned_in_progress() {
    let pending = ticket("E170-2025-0016", "護理部", Status::Pending);
    assert!(policy::in_queue(Queue::LeadToAssign, &pending));

    let approved = ticket("E170-2025-0017", "護理部", Status::InProgress);
    assert!(policy::in_queue(Queue::LeadToAssign, &approved));

    let staffed = assigned(
        ticket("E170-2025-0018", "護理部", Status::InProgress),
        "設計師 黃OO",
    );
    assert!(!policy::in_queue(Queue::LeadToAssign, &staffed));

    let proofing = ticket("E170-2025-0019", "護理部", Status::Proofing);
    assert!(!policy::in_queue(Queue::LeadToAssign, &proofing));
}

#[test]
fn lead_in_flight_requires_an_assignee() {
    let staffed = assigned(
        ticket("E170-2025-0020", "護理部", Status::Proofing),
        "設計師 黃OO",
    );
    assert!(policy::in_queue(Queue::LeadInFlight, &staffed));

    let unstaffed = ticket("E170-2025-0021", "護理部", Status::Proofing);
    assert!(!policy::in_queue(Queue::LeadInFlight, &unstaffed));

    let done = assigned(
        ticket("E170-2025-0022", "護理部", Status::Done),
        "設計師 黃OO",
    );
    assert!(!policy::in_queue(Queue::LeadInFlight, &done));

    let pending = assigned(
        ticket("E170-2025-0023", "護理部", Status::Pending),
        "設計師 黃OO",
    );
    assert!(!policy::in_queue(Queue::LeadInFlight, &pending));
}
