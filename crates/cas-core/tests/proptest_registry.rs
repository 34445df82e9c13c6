//! Property-based tests for the ticket registry
//!
//! These tests verify:
//! - Every issued ticket validates for its own service and no other
//! - Revocation removes exactly one principal's tickets
//! - Lookups by principal always return the first ticket issued

use cas_core::TicketRegistry;
use proptest::prelude::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

/// Generate (username, service index) issuance requests
fn arb_issuances() -> impl Strategy<Value = Vec<(String, usize)>> {
    prop::collection::vec(
        (prop::sample::select(vec!["alice", "bob", "carol"]).prop_map(String::from), 0usize..4),
        1..40,
    )
}

fn service(i: usize) -> String {
    format!("http://svc{i}.example/cb")
}

proptest! {
    /// Property: tickets resolve to their username, only for their service
    #[test]
    fn prop_issued_ticket_resolves(issuances in arb_issuances()) {
        block_on(async {
            let registry = TicketRegistry::new();
            let mut issued = Vec::new();
            for (user, svc) in &issuances {
                let ticket = registry.issue(user, &service(*svc)).await;
                issued.push((ticket, user.clone(), *svc));
            }

            for (ticket, user, svc) in &issued {
                let record = registry.find_by_ticket(ticket.as_str(), &service(*svc)).await;
                prop_assert_eq!(record.map(|r| r.username), Some(user.clone()));

                let wrong = registry.find_by_ticket(ticket.as_str(), &service(svc + 10)).await;
                prop_assert!(wrong.is_none());
            }
            Ok(())
        })?;
    }

    /// Property: revoking one user leaves everyone else's tickets intact
    #[test]
    fn prop_revoke_is_scoped(issuances in arb_issuances()) {
        block_on(async {
            let registry = TicketRegistry::new();
            let mut issued = Vec::new();
            for (user, svc) in &issuances {
                let ticket = registry.issue(user, &service(*svc)).await;
                issued.push((ticket, user.clone(), *svc));
            }

            let alice_count = issued.iter().filter(|(_, u, _)| u == "alice").count();
            prop_assert_eq!(registry.revoke_by_principal("alice").await, alice_count);
            prop_assert_eq!(registry.len().await, issued.len() - alice_count);

            for (ticket, user, svc) in &issued {
                let found = registry.find_by_ticket(ticket.as_str(), &service(*svc)).await;
                prop_assert_eq!(found.is_some(), user != "alice");
            }
            Ok(())
        })?;
    }

    /// Property: find_by_principal returns the earliest ticket for the pair
    #[test]
    fn prop_first_match_wins(issuances in arb_issuances()) {
        block_on(async {
            let registry = TicketRegistry::new();
            let mut first = std::collections::HashMap::new();
            for (user, svc) in &issuances {
                let ticket = registry.issue(user, &service(*svc)).await;
                first.entry((user.clone(), *svc)).or_insert(ticket);
            }

            for ((user, svc), ticket) in &first {
                let found = registry.find_by_principal(user, &service(*svc)).await.unwrap();
                prop_assert_eq!(&found.ticket, ticket);
            }
            Ok(())
        })?;
    }
}
