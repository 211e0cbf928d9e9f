//! End-to-end governance flows through the service entry point.

use std::sync::Arc;

use repdao_governance::{
    Address, GovernanceError, GovernanceParams, GovernanceService, ManualClock, Role, VoteOption,
};

fn account(i: u32) -> Address {
    Address::dev_account(i)
}

fn service() -> GovernanceService {
    GovernanceService::with_clock(
        GovernanceParams::default(),
        Arc::new(ManualClock::new(1_700_000_000)),
    )
    .unwrap()
}

/// Service with accounts 0..n joined (account 0 is Admin).
fn service_with_members(n: u32) -> GovernanceService {
    let svc = service();
    for i in 0..n {
        svc.join(account(i), None).unwrap();
    }
    svc
}

fn balance(svc: &GovernanceService, i: u32) -> u64 {
    svc.member_info(&account(i)).token_balance
}

#[test]
fn test_literal_scenario() {
    let svc = service();
    let (a, b, c, d) = (account(0), account(1), account(2), account(3));
    for m in [a, b, c, d] {
        svc.join(m, None).unwrap();
    }
    assert_eq!(svc.member_info(&a).role, Role::Admin);

    let id = svc.submit(a, "http://x").unwrap();
    assert_eq!(id, 0);

    svc.vote(b, 0, VoteOption::Scam as u8).unwrap();
    svc.vote(c, 0, VoteOption::Scam as u8).unwrap();
    svc.vote(d, 0, VoteOption::HighRisk as u8).unwrap();

    let fin = svc.process(a, 0).unwrap();
    assert_eq!(fin.outcome, VoteOption::Scam);

    let info = svc.proposal_info(0).unwrap();
    assert!(info.processed);
    assert_eq!(info.final_status, Some(VoteOption::Scam));

    assert_eq!(svc.member_info(&a).token_balance, 120);
    assert_eq!(svc.member_info(&b).token_balance, 110);
    assert_eq!(svc.member_info(&c).token_balance, 110);
    assert_eq!(svc.member_info(&d).token_balance, 100);
    assert_eq!(svc.proposal_votes(0).unwrap(), [2, 1, 0, 0]);
}

#[test]
fn test_join_grants_exactly_initial_tokens() {
    let svc = service();
    for i in 0..5 {
        let member = svc.join(account(i), None).unwrap();
        assert!(member.is_member);
        assert_eq!(member.token_balance, 100);
    }

    let err = svc.join(account(3), Some("again")).unwrap_err();
    assert_eq!(err, GovernanceError::AlreadyMember(account(3)));
    assert_eq!(balance(&svc, 3), 100);
    assert_eq!(svc.member_count(), 5);
}

#[test]
fn test_submit_increments_count_and_stores_fields() {
    let svc = service_with_members(2);
    let before = svc.proposal_count();

    let id = svc.submit(account(1), "http://test.com").unwrap();
    assert_eq!(id, before);
    assert_eq!(svc.proposal_count(), before + 1);

    let p = svc.proposal_info(id).unwrap();
    assert_eq!(p.url, "http://test.com");
    assert_eq!(p.proposer, account(1));
    assert_eq!(svc.member_info(&account(1)).proposals_submitted, 1);
}

#[test]
fn test_non_member_cannot_submit() {
    let svc = service_with_members(1);
    let err = svc.submit(account(9), "http://spam").unwrap_err();
    assert_eq!(err, GovernanceError::NotMember(account(9)));
    assert_eq!(svc.proposal_count(), 0);
}

#[test]
fn test_voting_issues_no_immediate_rewards() {
    let svc = service_with_members(5);
    let id = svc.submit(account(1), "http://no-reward-test.com").unwrap();

    let before: Vec<u64> = (0..5).map(|i| balance(&svc, i)).collect();
    svc.vote(account(2), id, 0).unwrap();
    svc.vote(account(3), id, 1).unwrap();
    let after: Vec<u64> = (0..5).map(|i| balance(&svc, i)).collect();

    assert_eq!(before, after);
    assert_eq!(svc.member_info(&account(2)).votes_count, 1);
}

#[test]
fn test_majority_voters_rewarded_minority_not() {
    let svc = service_with_members(8);
    let id = svc.submit(account(1), "http://majority-test.com").unwrap();

    svc.vote(account(5), id, 0).unwrap();
    svc.vote(account(6), id, 0).unwrap();
    svc.vote(account(7), id, 3).unwrap();

    svc.process(account(1), id).unwrap();

    assert_eq!(balance(&svc, 5), 110);
    assert_eq!(balance(&svc, 6), 110);
    assert_eq!(balance(&svc, 7), 100);
    assert_eq!(balance(&svc, 1), 120);
}

#[test]
fn test_duplicate_vote_prevention() {
    let svc = service_with_members(3);
    let id = svc.submit(account(1), "http://duplicate-vote-test.com").unwrap();

    svc.vote(account(2), id, 0).unwrap();
    let err = svc.vote(account(2), id, 1).unwrap_err();
    assert!(err.to_string().contains("Already voted"));
    assert_eq!(
        err,
        GovernanceError::AlreadyVoted {
            proposal_id: id,
            voter: account(2)
        }
    );

    assert_eq!(svc.proposal_votes(id).unwrap(), [1, 0, 0, 0]);
    assert_eq!(svc.voter_choice(id, &account(2)).unwrap(), VoteOption::Scam);
}

#[test]
fn test_vote_threshold_enforcement() {
    let svc = service_with_members(3);
    let id = svc.submit(account(1), "http://threshold-test.com").unwrap();
    svc.vote(account(2), id, 0).unwrap();

    let err = svc.process(account(1), id).unwrap_err();
    assert!(err.to_string().contains("Not enough votes"));
    assert!(!svc.proposal_info(id).unwrap().processed);
    assert_eq!(balance(&svc, 1), 100);
}

#[test]
fn test_non_member_cannot_vote() {
    let svc = service_with_members(2);
    let id = svc.submit(account(1), "http://non-member-test.com").unwrap();

    let err = svc.vote(account(9), id, 0).unwrap_err();
    assert!(err.to_string().contains("Not a member"));
    assert!(svc.proposal_voters(id).unwrap().is_empty());
    assert_eq!(svc.proposal_votes(id).unwrap(), [0, 0, 0, 0]);
}

#[test]
fn test_proposal_voters_exact_set() {
    let svc = service_with_members(6);
    let id = svc.submit(account(1), "http://voter-list-test.com").unwrap();

    for i in 2..5 {
        svc.vote(account(i), id, 0).unwrap();
    }
    // Rejected attempts must not appear
    let _ = svc.vote(account(2), id, 1);
    let _ = svc.vote(account(42), id, 1);
    let _ = svc.vote(account(5), id, 7);

    let voters = svc.proposal_voters(id).unwrap();
    assert_eq!(voters, vec![account(2), account(3), account(4)]);
}

#[test]
fn test_processed_is_terminal() {
    let svc = service_with_members(5);
    let id = svc.submit(account(0), "http://final").unwrap();
    for i in 1..4 {
        svc.vote(account(i), id, 3).unwrap();
    }
    svc.process(account(4), id).unwrap();

    assert_eq!(
        svc.vote(account(4), id, 3).unwrap_err(),
        GovernanceError::AlreadyProcessed(id)
    );
    assert_eq!(
        svc.process(account(0), id).unwrap_err(),
        GovernanceError::AlreadyProcessed(id)
    );

    let info = svc.proposal_info(id).unwrap();
    assert!(info.processed);
    assert_eq!(info.final_status, Some(VoteOption::Safe));
    assert_eq!(svc.proposal_votes(id).unwrap(), [0, 0, 0, 3]);
}

#[test]
fn test_tie_resolves_to_lowest_option() {
    let svc = service_with_members(6);
    let id = svc.submit(account(0), "http://tie").unwrap();
    svc.vote(account(1), id, 3).unwrap();
    svc.vote(account(2), id, 1).unwrap();
    svc.vote(account(3), id, 3).unwrap();
    svc.vote(account(4), id, 1).unwrap();

    let fin = svc.process(account(5), id).unwrap();
    assert_eq!(fin.outcome, VoteOption::HighRisk);
    assert_eq!(balance(&svc, 2), 110);
    assert_eq!(balance(&svc, 4), 110);
    assert_eq!(balance(&svc, 1), 100);
    assert_eq!(balance(&svc, 3), 100);
}

#[test]
fn test_non_member_may_trigger_processing() {
    let svc = service_with_members(4);
    let id = svc.submit(account(0), "http://anyone").unwrap();
    for i in 1..4 {
        svc.vote(account(i), id, 2).unwrap();
    }
    let fin = svc.process(account(77), id).unwrap();
    assert_eq!(fin.outcome, VoteOption::Normal);
    assert!(!svc.is_member(&account(77)));
}

#[test]
fn test_proposals_are_independent() {
    let svc = service_with_members(4);
    let p0 = svc.submit(account(0), "http://a").unwrap();
    let p1 = svc.submit(account(1), "http://b").unwrap();

    svc.vote(account(2), p0, 0).unwrap();
    svc.vote(account(2), p1, 3).unwrap();

    assert_eq!(svc.voter_choice(p0, &account(2)).unwrap(), VoteOption::Scam);
    assert_eq!(svc.voter_choice(p1, &account(2)).unwrap(), VoteOption::Safe);
    assert_eq!(svc.member_info(&account(2)).votes_count, 2);
}

#[test]
fn test_custom_params() {
    let params = GovernanceParams {
        initial_tokens: 50,
        proposer_reward: 5,
        voter_reward: 1,
        finalization_threshold: 1,
    };
    let svc =
        GovernanceService::with_clock(params, Arc::new(ManualClock::new(0))).unwrap();
    svc.join(account(0), None).unwrap();
    svc.join(account(1), None).unwrap();
    let id = svc.submit(account(0), "http://cheap").unwrap();
    svc.vote(account(1), id, 1).unwrap();
    svc.process(account(1), id).unwrap();

    assert_eq!(balance(&svc, 0), 55);
    assert_eq!(balance(&svc, 1), 51);
}
