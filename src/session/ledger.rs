//! Earnings ledger arithmetic.
//!
//! Pure functions over the teacher fields of a [`User`] record. The
//! invariant they maintain: `earnings_balance >= 0` after every call, for
//! any call sequence. Persisting the mutated record is the caller's job,
//! inside the per-identity critical section.

use crate::core::config::Policy;
use crate::session::User;

/// Credits the per-video reward and bumps the video counter.
///
/// Returns the new balance. Saturating adds: a balance near `i64::MAX`
/// cannot wrap negative.
pub fn credit_video(user: &mut User, policy: &Policy) -> i64 {
    user.videos_count = user.videos_count.saturating_add(1);
    user.earnings_balance = user.earnings_balance.saturating_add(policy.video_reward);
    user.earnings_balance
}

/// How much is missing before a withdrawal may start.
///
/// `None` once the threshold is met, `Some(threshold - balance)` below it.
pub fn withdrawal_shortfall(user: &User, policy: &Policy) -> Option<i64> {
    if user.earnings_balance >= policy.withdrawal_threshold {
        None
    } else {
        Some(policy.withdrawal_threshold - user.earnings_balance)
    }
}

/// Withdrawal capture: records the payout account and zeroes the balance
/// in one step on the record. Returns the captured amount.
pub fn capture_withdrawal(user: &mut User, account: &str) -> i64 {
    let amount = user.earnings_balance;
    user.withdrawal_account = Some(account.to_string());
    user.earnings_balance = 0;
    amount
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use pretty_assertions::assert_eq;

    fn teacher(balance: i64) -> User {
        let mut user = User::new(9, "Sara", Role::Teacher, "2026-01-01T00:00:00Z".to_string());
        user.earnings_balance = balance;
        user
    }

    #[test]
    fn credit_accumulates_reward_and_counter() {
        let policy = Policy::default();
        let mut user = teacher(0);
        assert_eq!(credit_video(&mut user, &policy), 50);
        assert_eq!(credit_video(&mut user, &policy), 100);
        assert_eq!(user.videos_count, 2);
    }

    #[test]
    fn credit_saturates_instead_of_wrapping() {
        let policy = Policy::default();
        let mut user = teacher(i64::MAX - 10);
        let balance = credit_video(&mut user, &policy);
        assert_eq!(balance, i64::MAX);
        assert!(user.earnings_balance >= 0);
    }

    #[test]
    fn shortfall_is_exact_below_threshold_and_absent_at_it() {
        let policy = Policy::default();
        assert_eq!(withdrawal_shortfall(&teacher(0), &policy), Some(1000));
        assert_eq!(withdrawal_shortfall(&teacher(950), &policy), Some(50));
        assert_eq!(withdrawal_shortfall(&teacher(1000), &policy), None);
        assert_eq!(withdrawal_shortfall(&teacher(1050), &policy), None);
    }

    #[test]
    fn capture_zeroes_balance_and_records_account_together() {
        let mut user = teacher(1050);
        let amount = capture_withdrawal(&mut user, "CCP00123");
        assert_eq!(amount, 1050);
        assert_eq!(user.earnings_balance, 0);
        assert_eq!(user.withdrawal_account.as_deref(), Some("CCP00123"));
    }

    #[test]
    fn capture_on_zero_balance_stays_non_negative() {
        let mut user = teacher(0);
        assert_eq!(capture_withdrawal(&mut user, "CCP1"), 0);
        assert_eq!(user.earnings_balance, 0);
    }

    #[test]
    fn custom_policy_values_flow_through() {
        let policy = Policy { video_reward: 75, withdrawal_threshold: 500 };
        let mut user = teacher(450);
        assert_eq!(withdrawal_shortfall(&user, &policy), Some(50));
        credit_video(&mut user, &policy);
        assert_eq!(user.earnings_balance, 525);
        assert_eq!(withdrawal_shortfall(&user, &policy), None);
    }
}
