// tests/property/clock_test.rs

//! Property-based tests for session boundary arbitration.

use crate::test_helpers::{MockFactory, WhoAmI};
use proptest::prelude::*;
use sessioned_client::SessionedClient;
use sessioned_client::core::session::clock::SessionClock;
use std::time::Duration;
use tokio::time::Instant;

/// Replays call times against the documented rotation rule.
fn expected_rotations(offsets_ms: &[u64], session_ms: u64) -> Vec<bool> {
    let mut last: Option<u64> = None;
    offsets_ms
        .iter()
        .map(|&t| {
            let rotate = last.is_none_or(|last| t - last >= session_ms);
            if rotate {
                last = Some(t);
            }
            rotate
        })
        .collect()
}

fn offsets(gaps_ms: &[u64]) -> Vec<u64> {
    gaps_ms
        .iter()
        .scan(0u64, |t, gap| {
            *t += gap;
            Some(*t)
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    #[test]
    fn test_clock_rotates_exactly_at_session_boundaries(
        gaps_ms in prop::collection::vec(0u64..300, 1..=60),
        session_ms in 0u64..200
    ) {
        let clock = SessionClock::new();
        let base = Instant::now();
        let session = Duration::from_millis(session_ms);
        let offsets = offsets(&gaps_ms);

        let mut previous = None;
        for (&t, expected) in offsets.iter().zip(expected_rotations(&offsets, session_ms)) {
            let rotated = clock.try_rotate(base + Duration::from_millis(t), session);
            prop_assert_eq!(rotated, expected);

            let last = clock.last_reconnect();
            prop_assert!(last.is_some());
            prop_assert!(previous <= last, "reconnect timestamp moved backwards");
            previous = last;
        }
    }

    #[test]
    fn test_racing_callers_elect_one_winner(
        racers in 2usize..16,
        session_ms in 1u64..1000
    ) {
        let clock = SessionClock::new();
        let session = Duration::from_millis(session_ms);
        let t0 = Instant::now();
        prop_assert!(clock.try_rotate(t0, session));

        let boundary = t0 + session;
        let winners = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..racers)
                .map(|_| scope.spawn(|| clock.try_rotate(boundary, session)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .filter(|won| *won)
                .count()
        });
        prop_assert_eq!(winners, 1);
    }

    #[test]
    fn test_one_client_per_session(
        gaps_ms in prop::collection::vec(0u64..300, 1..=40),
        session_ms in 1u64..200
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .start_paused(true)
            .build()
            .unwrap();
        rt.block_on(async {
            let factory = MockFactory::new();
            let client = SessionedClient::new(
                "prop",
                factory.clone(),
                Duration::from_millis(session_ms),
            );

            let mut now = 0;
            for &t in &offsets(&gaps_ms) {
                tokio::time::advance(Duration::from_millis(t - now)).await;
                now = t;
                client.execute(WhoAmI).await.unwrap();
            }

            let rotations = expected_rotations(&offsets(&gaps_ms), session_ms)
                .into_iter()
                .filter(|r| *r)
                .count();
            assert_eq!(factory.ledger.created().len(), rotations);
            assert_eq!(factory.ledger.shut_down().len(), rotations - 1);
        });
    }
}
