//! Tests for the confirmation gate
//!
//! These tests drive the gate with a manual clock and verify that:
//! 1. A request without a token is never authorized
//! 2. A token authorizes only the exact request it was minted for
//! 3. Tokens expire after the validity window
//! 4. Garbage, forged or future-dated tokens are rejected as malformed

use gitguard_mcp::confirmation::{
    ConfirmationGate, ConfirmationParams, ConfirmationRequest, ConfirmationState,
    DestructiveOperation, GateDecision, InvalidConfirmation, ManualClock, ParamValue, TOKEN_VERSION,
    TokenClaims, TokenSigner,
};

const START: i64 = 1_700_000_000;

fn test_gate() -> (ConfirmationGate<ManualClock>, ManualClock) {
    let clock = ManualClock::new(START);
    let gate = ConfirmationGate::new(TokenSigner::new("test-secret"), 300, clock.clone());
    (gate, clock)
}

fn mint(gate: &ConfirmationGate<ManualClock>, request: &ConfirmationRequest) -> String {
    match gate.evaluate(request, None) {
        GateDecision::AwaitingConfirmation { token, .. } => token,
        other => panic!("Expected a minted token, got {:?}", other),
    }
}

#[test]
fn test_first_call_asks_for_confirmation() {
    let (gate, _) = test_gate();
    let request = ConfirmationRequest::delete_branch("octocat/hello", "feat");

    let decision = gate.evaluate(&request, None);
    assert_eq!(decision.state(), ConfirmationState::Requested);
    assert!(!decision.is_authorized());

    match decision {
        GateDecision::AwaitingConfirmation { token, summary } => {
            assert!(!token.is_empty());
            assert!(summary.contains("delete branch 'feat'"));
            assert!(summary.contains("octocat/hello"));
        }
        other => panic!("Expected AwaitingConfirmation, got {:?}", other),
    }
}

#[test]
fn test_empty_token_counts_as_absent() {
    let (gate, _) = test_gate();
    let request = ConfirmationRequest::delete_repository("octocat/hello");

    for supplied in ["", "   "] {
        assert_eq!(
            gate.evaluate(&request, Some(supplied)).state(),
            ConfirmationState::Requested,
            "token {:?} should mint a new one",
            supplied
        );
    }
}

#[test]
fn test_each_mint_is_unique() {
    let (gate, _) = test_gate();
    let request = ConfirmationRequest::delete_repository("octocat/hello");

    assert_ne!(mint(&gate, &request), mint(&gate, &request));
}

#[test]
fn test_confirmation_within_window_is_authorized() {
    let (gate, clock) = test_gate();
    let request = ConfirmationRequest::delete_branch("octocat/hello", "feat");
    let token = mint(&gate, &request);

    clock.advance(60);
    let decision = gate.evaluate(&request, Some(&token));
    assert_eq!(decision.state(), ConfirmationState::Confirmed);

    match decision {
        GateDecision::Authorized(confirmed) => assert_eq!(confirmed.issued_at, START),
        other => panic!("Expected Authorized, got {:?}", other),
    }
}

#[test]
fn test_token_is_valid_up_to_the_last_second() {
    let (gate, clock) = test_gate();
    let request = ConfirmationRequest::delete_branch("octocat/hello", "feat");
    let token = mint(&gate, &request);

    clock.advance(300);
    assert!(gate.evaluate(&request, Some(&token)).is_authorized());

    clock.advance(1);
    match gate.evaluate(&request, Some(&token)) {
        GateDecision::Invalid(InvalidConfirmation::Expired {
            issued_at,
            age_secs,
        }) => {
            assert_eq!(issued_at, START);
            assert_eq!(age_secs, 301);
        }
        other => panic!("Expected Expired, got {:?}", other),
    }
}

#[test]
fn test_expired_decision_is_terminal() {
    let (gate, clock) = test_gate();
    let request = ConfirmationRequest::delete_repository("octocat/hello");
    let token = mint(&gate, &request);

    clock.advance(3_600);
    let decision = gate.evaluate(&request, Some(&token));
    assert_eq!(decision.state(), ConfirmationState::Expired);
    assert!(decision.state().is_terminal());

    match decision {
        GateDecision::Invalid(invalid) => assert_eq!(
            invalid.to_string(),
            "Confirmation token has expired. Please request a new token."
        ),
        other => panic!("Expected Invalid, got {:?}", other),
    }
}

#[test]
fn test_different_branch_is_a_mismatch() {
    let (gate, _) = test_gate();
    let token = mint(
        &gate,
        &ConfirmationRequest::delete_branch("octocat/hello", "feat"),
    );

    let other = ConfirmationRequest::delete_branch("octocat/hello", "other");
    match gate.evaluate(&other, Some(&token)) {
        GateDecision::Invalid(InvalidConfirmation::ParameterMismatch {
            token_operation,
            request_operation,
            token_params,
            request_params,
        }) => {
            assert_eq!(token_operation, DestructiveOperation::DeleteBranch);
            assert_eq!(request_operation, DestructiveOperation::DeleteBranch);
            assert_eq!(
                token_params.get("branch"),
                Some(&ParamValue::Scalar("feat".to_string()))
            );
            assert_eq!(
                request_params.get("branch"),
                Some(&ParamValue::Scalar("other".to_string()))
            );
        }
        other => panic!("Expected ParameterMismatch, got {:?}", other),
    }
}

#[test]
fn test_token_carries_the_bound_target() {
    let signer = TokenSigner::new("test-secret");
    let gate = ConfirmationGate::new(signer.clone(), 300, ManualClock::new(START));
    let request = ConfirmationRequest::delete_branch("o/r", "feat");
    let token = mint(&gate, &request);

    let claims = signer.decode(&token).expect("token decodes with its own secret");
    assert_eq!(claims.operation, DestructiveOperation::DeleteBranch);
    assert_eq!(claims.issued_at, START);
    assert_eq!(&claims.params, request.params());

    let payload = serde_json::to_string(&claims.params).unwrap();
    assert!(payload.contains("\"feat\""));
    assert!(payload.contains("\"o/r\""));
}

#[test]
fn test_token_for_another_operation_is_a_mismatch() {
    let (gate, _) = test_gate();
    let token = mint(&gate, &ConfirmationRequest::delete_repository("octocat/hello"));

    let request = ConfirmationRequest::delete_issue_comment("octocat/hello", 42);
    let decision = gate.evaluate(&request, Some(&token));
    assert_eq!(decision.state(), ConfirmationState::Rejected);
    assert!(matches!(
        decision,
        GateDecision::Invalid(InvalidConfirmation::ParameterMismatch {
            token_operation: DestructiveOperation::DeleteRepository,
            request_operation: DestructiveOperation::DeleteIssueComment,
            ..
        })
    ));
}

#[test]
fn test_different_repository_is_a_mismatch() {
    let (gate, _) = test_gate();
    let token = mint(&gate, &ConfirmationRequest::delete_repository("octocat/hello"));

    let request = ConfirmationRequest::delete_repository("octocat/world");
    assert!(matches!(
        gate.evaluate(&request, Some(&token)),
        GateDecision::Invalid(InvalidConfirmation::ParameterMismatch { .. })
    ));
}

#[test]
fn test_file_order_does_not_matter() {
    let (gate, _) = test_gate();
    let token = mint(
        &gate,
        &ConfirmationRequest::delete_files("octocat/hello", "main", ["a.txt", "docs/b.md"]),
    );

    let reordered =
        ConfirmationRequest::delete_files("octocat/hello", "main", ["docs/b.md", "a.txt"]);
    assert!(gate.evaluate(&reordered, Some(&token)).is_authorized());
}

#[test]
fn test_file_subset_is_a_mismatch() {
    let (gate, _) = test_gate();
    let token = mint(
        &gate,
        &ConfirmationRequest::delete_files("octocat/hello", "main", ["a.txt", "docs/b.md"]),
    );

    for paths in [vec!["a.txt"], vec!["a.txt", "docs/b.md", "c.txt"]] {
        let request = ConfirmationRequest::delete_files("octocat/hello", "main", paths.clone());
        assert!(
            matches!(
                gate.evaluate(&request, Some(&token)),
                GateDecision::Invalid(InvalidConfirmation::ParameterMismatch { .. })
            ),
            "{:?} must not match the confirmed set",
            paths
        );
    }
}

#[test]
fn test_different_files_branch_is_a_mismatch() {
    let (gate, _) = test_gate();
    let token = mint(
        &gate,
        &ConfirmationRequest::delete_files("octocat/hello", "main", ["a.txt"]),
    );

    let request = ConfirmationRequest::delete_files("octocat/hello", "dev", ["a.txt"]);
    match gate.evaluate(&request, Some(&token)) {
        GateDecision::Invalid(InvalidConfirmation::ParameterMismatch {
            token_params,
            request_params,
            ..
        }) => {
            assert_eq!(
                token_params.get("branch"),
                Some(&ParamValue::Scalar("main".to_string()))
            );
            assert_eq!(
                request_params.get("branch"),
                Some(&ParamValue::Scalar("dev".to_string()))
            );
            assert_eq!(token_params.get("file_paths"), request_params.get("file_paths"));
        }
        other => panic!("Expected ParameterMismatch, got {:?}", other),
    }
}

#[test]
fn test_different_comment_id_is_a_mismatch() {
    let (gate, _) = test_gate();
    let token = mint(
        &gate,
        &ConfirmationRequest::delete_issue_comment("octocat/hello", 42),
    );

    let request = ConfirmationRequest::delete_issue_comment("octocat/hello", 43);
    match gate.evaluate(&request, Some(&token)) {
        GateDecision::Invalid(InvalidConfirmation::ParameterMismatch {
            token_operation,
            token_params,
            request_params,
            ..
        }) => {
            assert_eq!(token_operation, DestructiveOperation::DeleteIssueComment);
            assert_eq!(
                token_params.get("comment_id"),
                Some(&ParamValue::Scalar("42".to_string()))
            );
            assert_eq!(
                request_params.get("comment_id"),
                Some(&ParamValue::Scalar("43".to_string()))
            );
        }
        other => panic!("Expected ParameterMismatch, got {:?}", other),
    }

    assert!(
        gate.evaluate(
            &ConfirmationRequest::delete_issue_comment("octocat/hello", 42),
            Some(&token)
        )
        .is_authorized()
    );
}

#[test]
fn test_delimiters_in_values_cannot_collide() {
    let (gate, _) = test_gate();
    let token = mint(&gate, &ConfirmationRequest::delete_branch("o/r", "a:b"));

    let shifted = ConfirmationRequest::delete_branch("o/r:a", "b");
    assert!(!gate.evaluate(&shifted, Some(&token)).is_authorized());
}

#[test]
fn test_garbage_token_is_malformed() {
    let (gate, _) = test_gate();
    let request = ConfirmationRequest::delete_branch("octocat/hello", "feat");

    for supplied in ["garbage", "a.b", "not base64!.sig", "...."] {
        let decision = gate.evaluate(&request, Some(supplied));
        assert_eq!(
            decision,
            GateDecision::Invalid(InvalidConfirmation::MalformedToken),
            "{:?} should be malformed",
            supplied
        );
        assert_eq!(decision.state(), ConfirmationState::Rejected);
    }
}

#[test]
fn test_token_from_another_secret_is_malformed() {
    let (gate, _) = test_gate();
    let request = ConfirmationRequest::delete_branch("octocat/hello", "feat");

    let foreign = ConfirmationGate::new(
        TokenSigner::new("another-secret"),
        300,
        ManualClock::new(START),
    );
    let token = mint(&foreign, &request);

    assert_eq!(
        gate.evaluate(&request, Some(&token)),
        GateDecision::Invalid(InvalidConfirmation::MalformedToken)
    );
}

#[test]
fn test_tampered_token_is_malformed() {
    let (gate, _) = test_gate();
    let request = ConfirmationRequest::delete_branch("octocat/hello", "feat");
    let token = mint(&gate, &request);

    let (payload, signature) = token.split_once('.').expect("token has two parts");
    let mut chars: Vec<char> = payload.chars().collect();
    let last = chars.len() - 1;
    chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
    let tampered = format!("{}.{}", chars.into_iter().collect::<String>(), signature);

    assert_eq!(
        gate.evaluate(&request, Some(&tampered)),
        GateDecision::Invalid(InvalidConfirmation::MalformedToken)
    );
}

#[test]
fn test_signed_token_with_wrong_fields_is_malformed() {
    let signer = TokenSigner::new("test-secret");
    let gate = ConfirmationGate::new(signer.clone(), 300, ManualClock::new(START));
    let request = ConfirmationRequest::delete_branch("octocat/hello", "feat");

    // Correctly signed, but the branch field is missing or has the wrong kind
    let shapes = [
        ConfirmationParams::new().with("repo", "octocat/hello"),
        ConfirmationParams::new()
            .with("repo", "octocat/hello")
            .with("branch", ParamValue::set(["feat"])),
        ConfirmationParams::new()
            .with("repo", "octocat/hello")
            .with("branch", "feat")
            .with("file_paths", ParamValue::set(["a.txt"])),
    ];

    for params in shapes {
        let token = signer.encode(&TokenClaims {
            version: TOKEN_VERSION,
            operation: DestructiveOperation::DeleteBranch,
            params: params.clone(),
            issued_at: START,
            nonce: "fixed-nonce".to_string(),
        });

        assert_eq!(
            gate.evaluate(&request, Some(&token)),
            GateDecision::Invalid(InvalidConfirmation::MalformedToken),
            "{:?} should be malformed",
            params
        );
    }
}

#[test]
fn test_future_dated_token_is_malformed() {
    let (gate, clock) = test_gate();
    let request = ConfirmationRequest::delete_branch("octocat/hello", "feat");

    // Minted by an instance whose clock runs ahead
    let ahead = ConfirmationGate::new(
        TokenSigner::new("test-secret"),
        300,
        ManualClock::new(START + 120),
    );
    let token = mint(&ahead, &request);

    assert_eq!(
        gate.evaluate(&request, Some(&token)),
        GateDecision::Invalid(InvalidConfirmation::MalformedToken)
    );

    // Small skew is tolerated
    clock.set(START + 100);
    assert!(gate.evaluate(&request, Some(&token)).is_authorized());
}

#[test]
fn test_gate_is_stateless_across_instances() {
    let request = ConfirmationRequest::delete_issue_comment("octocat/hello", 7);
    let clock = ManualClock::new(START);
    let first = ConfirmationGate::new(TokenSigner::new("shared"), 300, clock.clone());
    let second = ConfirmationGate::new(TokenSigner::new("shared"), 300, clock);

    let token = mint(&first, &request);
    assert!(second.evaluate(&request, Some(&token)).is_authorized());
    // Validation does not consume the token
    assert!(second.evaluate(&request, Some(&token)).is_authorized());
}

#[test]
fn test_evaluate_at_uses_explicit_time() {
    let (gate, _) = test_gate();
    let request = ConfirmationRequest::delete_repository("octocat/hello");

    let token = match gate.evaluate_at(&request, None, START + 1_000) {
        GateDecision::AwaitingConfirmation { token, .. } => token,
        other => panic!("Expected AwaitingConfirmation, got {:?}", other),
    };

    assert!(gate.evaluate_at(&request, Some(&token), START + 1_200).is_authorized());
    assert!(matches!(
        gate.evaluate_at(&request, Some(&token), START + 1_301),
        GateDecision::Invalid(InvalidConfirmation::Expired { .. })
    ));
}
