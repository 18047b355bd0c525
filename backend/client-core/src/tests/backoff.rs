// Unit tests for the reconnect delay table

use crate::connection::TableBackoff;

use std::time::Duration;

use backoff::backoff::Backoff;

fn table() -> Vec<Duration> {
    vec![
        Duration::from_secs(1),
        Duration::from_secs(3),
        Duration::from_secs(5),
        Duration::from_secs(10),
    ]
}

/// **VALUE**: Verifies delays walk the table and then stay on the last entry.
///
/// **WHY THIS MATTERS**: A server that stays down must be polled every 10s,
/// not at an ever-growing or wrapping interval.
///
/// **BUG THIS CATCHES**: Would catch an out-of-bounds index or a table that
/// wraps back to the first entry.
#[test]
fn given_uncapped_table_when_next_backoff_repeatedly_then_clamps_to_last_delay() {
    // GIVEN: The default table without a cap
    let mut backoff = TableBackoff::new(table(), None);

    // WHEN: Six delays are requested
    let delays: Vec<Duration> = (0..6).filter_map(|_| backoff.next_backoff()).collect();

    // THEN: The last entry repeats
    assert_eq!(
        delays,
        vec![
            Duration::from_secs(1),
            Duration::from_secs(3),
            Duration::from_secs(5),
            Duration::from_secs(10),
            Duration::from_secs(10),
            Duration::from_secs(10),
        ]
    );
    assert_eq!(backoff.attempt(), 6);
}

/// **VALUE**: Verifies the authenticated path gives up after its cap.
///
/// **WHY THIS MATTERS**: Retrying rejected credentials forever can lock the
/// operator's account on the backend.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one in the cap check.
#[test]
fn given_capped_table_when_attempts_exhausted_then_returns_none() {
    // GIVEN: A cap of two attempts
    let mut backoff = TableBackoff::new(table(), Some(2));

    // WHEN/THEN: Two delays, then nothing
    assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
    assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(3)));
    assert!(backoff.is_exhausted());
    assert_eq!(backoff.next_backoff(), None);
}

/// **VALUE**: Verifies a reset restarts the table from the first delay.
///
/// **BUG THIS CATCHES**: Would catch a successful connection that leaves the
/// next outage waiting 10s instead of 1s.
#[test]
fn given_used_backoff_when_reset_then_starts_from_first_delay() {
    // GIVEN: A backoff that already handed out three delays
    let mut backoff = TableBackoff::new(table(), Some(5));
    for _ in 0..3 {
        backoff.next_backoff();
    }

    // WHEN: Reset
    backoff.reset();

    // THEN: Back to the first delay
    assert_eq!(backoff.attempt(), 0);
    assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
}

#[test]
fn given_empty_table_when_next_backoff_then_uses_one_second() {
    let mut backoff = TableBackoff::new(Vec::new(), None);
    assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
}
