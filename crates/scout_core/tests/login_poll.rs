use std::time::Duration;

use scout_core::{LoginPoll, LoginState};

const SEC: Duration = Duration::from_secs(1);

#[test]
fn never_authenticated_times_out_on_the_deadline() {
    let mut poll = LoginPoll::new(5 * SEC, 10 * SEC);
    let mut elapsed = Duration::ZERO;
    let mut checks = 0;
    loop {
        checks += 1;
        match poll.observe(false, elapsed) {
            LoginState::Waiting => elapsed += poll.next_delay(elapsed).unwrap(),
            LoginState::TimedOut => break,
            LoginState::Authenticated => panic!("never authenticated"),
        }
    }
    assert_eq!(elapsed, 10 * SEC);
    assert_eq!(checks, 3);
    assert_eq!(poll.next_delay(elapsed), None);
}

#[test]
fn last_delay_is_clipped_to_the_deadline() {
    let mut poll = LoginPoll::new(4 * SEC, 10 * SEC);
    assert_eq!(poll.observe(false, 8 * SEC), LoginState::Waiting);
    assert_eq!(poll.next_delay(8 * SEC), Some(2 * SEC));
}

#[test]
fn authentication_wins_and_is_sticky() {
    let mut poll = LoginPoll::new(5 * SEC, 10 * SEC);
    assert_eq!(poll.observe(true, 3 * SEC), LoginState::Authenticated);
    assert_eq!(poll.observe(false, 30 * SEC), LoginState::Authenticated);
}
