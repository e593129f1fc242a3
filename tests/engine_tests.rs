//! Integration tests for the task/lottery engine.
//!
//! These tests verify the core engine operations using an in-memory SQLite
//! database. Tests are organized by component.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rusqlite::params;
use taskloot::db::{Database, now_ms};
use taskloot::error::ErrorCode;
use taskloot::payout::TextScanPayout;
use taskloot::types::{TaskStatus, TransactionKind};

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

/// Back-date a task's started_at so completion sees the given elapsed time.
fn backdate_started(db: &Database, task_id: i64, millis_ago: i64) {
    let started = now_ms() - millis_ago;
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE tasks SET started_at = ?1 WHERE id = ?2",
            params![started, task_id],
        )?;
        Ok(())
    })
    .unwrap();
}

mod task_tests {
    use super::*;

    #[test]
    fn create_task_starts_pending() {
        let db = setup_db();

        let task = db.create_task("Write report", Some("quarterly"), 2).unwrap();

        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.title, "Write report");
        assert_eq!(task.description.as_deref(), Some("quarterly"));
        assert_eq!(task.weight, 2);
        assert!(task.created_at > 0);
        assert!(task.started_at.is_none());
        assert!(task.time_limit.is_none());
    }

    #[test]
    fn create_task_rejects_blank_title() {
        let db = setup_db();

        let err = db.create_task("   ", None, 1).unwrap_err();

        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn create_task_rejects_nonpositive_weight() {
        let db = setup_db();

        let err = db.create_task("Walk the dog", None, 0).unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidFieldValue);
    }

    #[test]
    fn list_tasks_filters_by_status() {
        let db = setup_db();
        let a = db.create_task("a", None, 1).unwrap();
        db.create_task("b", None, 1).unwrap();
        db.start_task(a.id, 30).unwrap();

        let pending = db.list_tasks(Some(TaskStatus::Pending)).unwrap();
        let in_progress = db.list_tasks(Some(TaskStatus::InProgress)).unwrap();
        let all = db.list_tasks(None).unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(in_progress.len(), 1);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn update_task_changes_fields() {
        let db = setup_db();
        let task = db.create_task("old", Some("desc"), 1).unwrap();

        let updated = db
            .update_task(task.id, Some("new"), None, Some(5))
            .unwrap();

        assert_eq!(updated.title, "new");
        assert_eq!(updated.description.as_deref(), Some("desc"));
        assert_eq!(updated.weight, 5);
    }

    #[test]
    fn update_task_requires_some_field() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();

        let err = db.update_task(task.id, None, None, None).unwrap_err();

        assert_eq!(err.code, ErrorCode::MissingRequiredField);
    }

    #[test]
    fn delete_task_removes_row() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();

        db.delete_task(task.id).unwrap();

        assert!(db.get_task(task.id).unwrap().is_none());
        let err = db.delete_task(task.id).unwrap_err();
        assert_eq!(err.code, ErrorCode::TaskNotFound);
    }
}

mod lifecycle_tests {
    use super::*;

    #[test]
    fn start_sets_timing_fields() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();

        let started = db.start_task(task.id, 45).unwrap();

        assert_eq!(started.status, TaskStatus::InProgress);
        assert_eq!(started.time_limit, Some(45));
        assert!(started.started_at.is_some());
    }

    #[test]
    fn start_rejects_nonpositive_time_limit() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();

        let err = db.start_task(task.id, 0).unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidFieldValue);
        assert_eq!(
            db.get_task(task.id).unwrap().unwrap().status,
            TaskStatus::Pending
        );
    }

    #[test]
    fn start_twice_is_a_state_conflict() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        db.start_task(task.id, 30).unwrap();

        let err = db.start_task(task.id, 30).unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn complete_within_limit_has_zero_hours_exceeded() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        db.start_task(task.id, 60).unwrap();

        let outcome = db.complete_task(task.id).unwrap();

        assert_eq!(outcome.hours_exceeded, 0);
        assert!(outcome.lottery_eligible);
        assert_eq!(outcome.task.status, TaskStatus::Completed);
        assert!(outcome.task.completed_at.is_some());
    }

    #[test]
    fn one_minute_over_counts_as_one_hour() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        db.start_task(task.id, 60).unwrap();
        backdate_started(&db, task.id, 61 * 60_000);

        let outcome = db.complete_task(task.id).unwrap();

        assert_eq!(outcome.hours_exceeded, 1);
    }

    #[test]
    fn a_full_hour_over_still_counts_as_one_hour() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        db.start_task(task.id, 60).unwrap();
        // Just shy of 120 elapsed minutes so clock drift cannot tip the ceil.
        backdate_started(&db, task.id, 120 * 60_000 - 5_000);

        let outcome = db.complete_task(task.id).unwrap();

        assert_eq!(outcome.hours_exceeded, 1);
    }

    #[test]
    fn past_one_hour_over_counts_as_two() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        db.start_task(task.id, 60).unwrap();
        backdate_started(&db, task.id, 121 * 60_000);

        let outcome = db.complete_task(task.id).unwrap();

        assert_eq!(outcome.hours_exceeded, 2);
    }

    #[test]
    fn complete_requires_in_progress() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();

        let err = db.complete_task(task.id).unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn complete_twice_is_a_state_conflict() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        db.start_task(task.id, 30).unwrap();
        db.complete_task(task.id).unwrap();

        let err = db.complete_task(task.id).unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn archive_allowed_from_any_live_status() {
        let db = setup_db();
        let pending = db.create_task("p", None, 1).unwrap();
        let started = db.create_task("s", None, 1).unwrap();
        db.start_task(started.id, 30).unwrap();

        let archived_pending = db.archive_task(pending.id).unwrap();
        let archived_started = db.archive_task(started.id).unwrap();

        assert_eq!(archived_pending.status, TaskStatus::Archived);
        assert!(archived_pending.archived_at.is_some());
        assert_eq!(archived_started.status, TaskStatus::Archived);
    }

    #[test]
    fn archive_twice_is_a_state_conflict() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        db.archive_task(task.id).unwrap();

        let err = db.archive_task(task.id).unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn reactivate_clears_all_timing_fields() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        db.start_task(task.id, 30).unwrap();
        db.complete_task(task.id).unwrap();
        db.archive_task(task.id).unwrap();

        let reactivated = db.reactivate_task(task.id).unwrap();

        assert_eq!(reactivated.status, TaskStatus::Pending);
        assert!(reactivated.started_at.is_none());
        assert!(reactivated.completed_at.is_none());
        assert!(reactivated.time_limit.is_none());
        assert!(reactivated.archived_at.is_none());
    }

    #[test]
    fn reactivate_works_from_completed() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        db.start_task(task.id, 30).unwrap();
        db.complete_task(task.id).unwrap();

        let reactivated = db.reactivate_task(task.id).unwrap();

        assert_eq!(reactivated.status, TaskStatus::Pending);
    }

    #[test]
    fn reactivate_pending_is_a_state_conflict() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();

        let err = db.reactivate_task(task.id).unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidState);
    }

    #[test]
    fn lifecycle_ops_on_unknown_task_are_not_found() {
        let db = setup_db();

        assert_eq!(
            db.start_task(999, 30).unwrap_err().code,
            ErrorCode::TaskNotFound
        );
        assert_eq!(
            db.complete_task(999).unwrap_err().code,
            ErrorCode::TaskNotFound
        );
        assert_eq!(
            db.archive_task(999).unwrap_err().code,
            ErrorCode::TaskNotFound
        );
        assert_eq!(
            db.reactivate_task(999).unwrap_err().code,
            ErrorCode::TaskNotFound
        );
    }
}

mod draw_tests {
    use super::*;

    #[test]
    fn draw_from_empty_pool_fails_without_mutation() {
        let db = setup_db();
        let mut rng = StdRng::seed_from_u64(1);

        let err = db.draw_task(&mut rng).unwrap_err();

        assert_eq!(err.code, ErrorCode::NoTasksAvailable);
        assert!(db.list_tasks(None).unwrap().is_empty());
        assert!(db.lottery_history(10).unwrap().is_empty());
    }

    #[test]
    fn draw_distinguishes_all_zero_weights_from_empty() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        // Zero weights cannot enter through the API; simulate a legacy row.
        db.with_conn(|conn| {
            conn.execute(
                "UPDATE tasks SET weight = 0 WHERE id = ?1",
                params![task.id],
            )?;
            Ok(())
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let err = db.draw_task(&mut rng).unwrap_err();

        assert_eq!(err.code, ErrorCode::ZeroTotalWeight);
    }

    #[test]
    fn draw_only_considers_pending_tasks() {
        let db = setup_db();
        let active = db.create_task("active", None, 1).unwrap();
        let done = db.create_task("done", None, 100).unwrap();
        db.start_task(done.id, 30).unwrap();
        db.complete_task(done.id).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..20 {
            assert_eq!(db.draw_task(&mut rng).unwrap().id, active.id);
        }
    }

    #[test]
    fn draw_does_not_change_task_state() {
        let db = setup_db();
        let task = db.create_task("t", None, 1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        db.draw_task(&mut rng).unwrap();

        assert_eq!(
            db.get_task(task.id).unwrap().unwrap().status,
            TaskStatus::Pending
        );
    }

    #[test]
    fn draw_frequency_tracks_weight() {
        let db = setup_db();
        let light = db.create_task("light", None, 1).unwrap();
        let heavy = db.create_task("heavy", None, 3).unwrap();
        let mut rng = StdRng::seed_from_u64(99);

        let mut heavy_count = 0usize;
        let n = 10_000;
        for _ in 0..n {
            let drawn = db.draw_task(&mut rng).unwrap();
            if drawn.id == heavy.id {
                heavy_count += 1;
            } else {
                assert_eq!(drawn.id, light.id);
            }
        }

        let freq = heavy_count as f64 / n as f64;
        assert!(freq > 0.72 && freq < 0.78, "heavy frequency was {}", freq);
    }
}

mod wallet_tests {
    use super::*;

    #[test]
    fn balance_starts_at_zero() {
        let db = setup_db();
        assert_eq!(db.wallet_balance().unwrap(), 0.0);
    }

    #[test]
    fn credit_and_debit_move_the_balance() {
        let db = setup_db();

        assert_eq!(db.wallet_credit(100.0, "seed", None).unwrap(), 100.0);
        assert_eq!(db.wallet_debit(30.0, "coffee").unwrap(), 70.0);
        assert_eq!(db.wallet_balance().unwrap(), 70.0);
    }

    #[test]
    fn nonpositive_amounts_are_rejected() {
        let db = setup_db();

        assert_eq!(
            db.wallet_credit(0.0, "", None).unwrap_err().code,
            ErrorCode::InvalidFieldValue
        );
        assert_eq!(
            db.wallet_credit(-5.0, "", None).unwrap_err().code,
            ErrorCode::InvalidFieldValue
        );
        assert_eq!(
            db.wallet_debit(0.0, "").unwrap_err().code,
            ErrorCode::InvalidFieldValue
        );
    }

    #[test]
    fn overdraft_fails_and_changes_nothing() {
        let db = setup_db();
        db.wallet_credit(10.0, "seed", None).unwrap();

        let err = db.wallet_debit(10.01, "too much").unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientBalance);
        assert_eq!(db.wallet_balance().unwrap(), 10.0);
        assert_eq!(db.wallet_transactions(10).unwrap().len(), 1);
    }

    #[test]
    fn balance_equals_signed_sum_of_transactions() {
        let db = setup_db();
        db.wallet_credit(50.0, "a", None).unwrap();
        db.wallet_credit(12.5, "b", None).unwrap();
        db.wallet_debit(20.0, "c").unwrap();
        db.wallet_credit(7.25, "d", None).unwrap();
        db.wallet_debit(0.75, "e").unwrap();

        let signed_sum: f64 = db
            .wallet_transactions(100)
            .unwrap()
            .iter()
            .map(|t| match t.kind {
                TransactionKind::Income => t.amount,
                TransactionKind::Expense => -t.amount,
            })
            .sum();

        assert!((db.wallet_balance().unwrap() - signed_sum).abs() < 1e-9);
    }

    #[test]
    fn transactions_are_newest_first_and_bounded() {
        let db = setup_db();
        db.wallet_credit(1.0, "first", None).unwrap();
        db.wallet_credit(2.0, "second", None).unwrap();
        db.wallet_credit(3.0, "third", None).unwrap();

        let recent = db.wallet_transactions(2).unwrap();

        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].description, "third");
        assert_eq!(recent[1].description, "second");
    }
}

mod prize_tests {
    use super::*;

    #[test]
    fn create_prize_validates_inputs() {
        let db = setup_db();

        assert_eq!(
            db.create_prize(" ", None, 1, false, None).unwrap_err().code,
            ErrorCode::MissingRequiredField
        );
        assert_eq!(
            db.create_prize("p", None, 0, false, None).unwrap_err().code,
            ErrorCode::InvalidFieldValue
        );
        assert_eq!(
            db.create_prize("p", None, 1, true, Some(0.0))
                .unwrap_err()
                .code,
            ErrorCode::InvalidFieldValue
        );
    }

    #[test]
    fn deactivate_hides_prize_from_active_listing() {
        let db = setup_db();
        let prize = db.create_prize("Movie night", None, 1, false, None).unwrap();

        let removed = db.deactivate_prize(prize.id).unwrap();

        assert!(!removed.is_active);
        assert!(db.active_prizes().unwrap().is_empty());
        assert_eq!(db.list_prizes(false).unwrap().len(), 1);
    }

    #[test]
    fn update_prize_can_flag_money() {
        let db = setup_db();
        let prize = db.create_prize("Bonus", None, 1, false, None).unwrap();

        let updated = db
            .update_prize(prize.id, None, None, None, Some(true), Some(Some(25.0)))
            .unwrap();

        assert!(updated.is_money);
        assert_eq!(updated.money_amount, Some(25.0));
    }
}

mod lottery_tests {
    use super::*;

    fn completed_task(db: &Database) -> i64 {
        let task = db.create_task("worked", None, 1).unwrap();
        db.start_task(task.id, 60).unwrap();
        db.complete_task(task.id).unwrap();
        task.id
    }

    #[test]
    fn zero_overtime_always_wins_a_prize() {
        let db = setup_db();
        let task_id = completed_task(&db);
        db.create_prize("A", None, 1, false, None).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..100 {
            let outcome = db
                .draw_lottery(task_id, 0, &mut rng, &TextScanPayout)
                .unwrap();
            assert_eq!(outcome.no_prize_probability, 0.0);
            assert!(outcome.prize.is_some());
        }
    }

    #[test]
    fn ten_hours_over_never_wins() {
        let db = setup_db();
        let task_id = completed_task(&db);
        db.create_prize("A", None, 1, false, None).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..100 {
            let outcome = db
                .draw_lottery(task_id, 10, &mut rng, &TextScanPayout)
                .unwrap();
            assert_eq!(outcome.no_prize_probability, 1.0);
            assert!(outcome.prize.is_none());
            assert!(!outcome.wallet_credited);
        }
    }

    #[test]
    fn every_draw_persists_an_audit_record() {
        let db = setup_db();
        let task_id = completed_task(&db);
        let mut rng = StdRng::seed_from_u64(5);

        db.draw_lottery(task_id, 3, &mut rng, &TextScanPayout)
            .unwrap();

        let history = db.lottery_history(10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].task_id, task_id);
        assert_eq!(history[0].hours_exceeded, 3);
        assert!((history[0].no_prize_probability - 0.3).abs() < f64::EPSILON);
        assert_eq!(history[0].task_title.as_deref(), Some("worked"));
    }

    #[test]
    fn empty_prize_pool_is_a_normal_no_prize_outcome() {
        let db = setup_db();
        let task_id = completed_task(&db);
        let mut rng = StdRng::seed_from_u64(5);

        let outcome = db
            .draw_lottery(task_id, 0, &mut rng, &TextScanPayout)
            .unwrap();

        assert!(outcome.prize.is_none());
        assert_eq!(outcome.message.as_deref(), Some("no prizes available"));
        assert_eq!(db.lottery_history(10).unwrap().len(), 1);
    }

    #[test]
    fn deactivated_prizes_are_never_drawn() {
        let db = setup_db();
        let task_id = completed_task(&db);
        let retired = db.create_prize("Retired", None, 100, false, None).unwrap();
        db.create_prize("Live", None, 1, false, None).unwrap();
        db.deactivate_prize(retired.id).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..50 {
            let outcome = db
                .draw_lottery(task_id, 0, &mut rng, &TextScanPayout)
                .unwrap();
            assert_eq!(outcome.prize.unwrap().name, "Live");
        }
    }

    #[test]
    fn prize_frequency_tracks_weight() {
        let db = setup_db();
        let task_id = completed_task(&db);
        db.create_prize("A", None, 1, false, None).unwrap();
        db.create_prize("B", None, 3, false, None).unwrap();
        let mut rng = StdRng::seed_from_u64(4242);

        let mut b_count = 0usize;
        let n = 10_000;
        for _ in 0..n {
            let outcome = db
                .draw_lottery(task_id, 0, &mut rng, &TextScanPayout)
                .unwrap();
            if outcome.prize.unwrap().name == "B" {
                b_count += 1;
            }
        }

        let freq = b_count as f64 / n as f64;
        assert!(freq > 0.72 && freq < 0.78, "B frequency was {}", freq);
    }

    #[test]
    fn money_prize_credits_wallet_atomically_with_record() {
        let db = setup_db();
        let task_id = completed_task(&db);
        db.create_prize("Payday", None, 1, true, Some(25.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let outcome = db
            .draw_lottery(task_id, 0, &mut rng, &TextScanPayout)
            .unwrap();

        assert!(outcome.wallet_credited);
        assert_eq!(db.wallet_balance().unwrap(), 25.0);

        let transactions = db.wallet_transactions(10).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].kind, TransactionKind::Income);
        assert_eq!(transactions[0].description, "lottery payout: Payday");

        let history = db.lottery_history(10).unwrap();
        assert_eq!(transactions[0].lottery_record_id, Some(history[0].id));
    }

    #[test]
    fn unflagged_money_text_still_pays_out() {
        let db = setup_db();
        let task_id = completed_task(&db);
        db.create_prize("¥50 red envelope", None, 1, false, None)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let outcome = db
            .draw_lottery(task_id, 0, &mut rng, &TextScanPayout)
            .unwrap();

        assert!(outcome.wallet_credited);
        assert_eq!(db.wallet_balance().unwrap(), 50.0);
    }

    #[test]
    fn non_money_prize_leaves_wallet_untouched() {
        let db = setup_db();
        let task_id = completed_task(&db);
        db.create_prize("Movie night", None, 1, false, None).unwrap();
        let mut rng = StdRng::seed_from_u64(5);

        let outcome = db
            .draw_lottery(task_id, 0, &mut rng, &TextScanPayout)
            .unwrap();

        assert!(!outcome.wallet_credited);
        assert_eq!(db.wallet_balance().unwrap(), 0.0);
        assert!(db.wallet_transactions(10).unwrap().is_empty());
    }

    #[test]
    fn draw_for_unknown_task_is_not_found() {
        let db = setup_db();
        let mut rng = StdRng::seed_from_u64(5);

        let err = db
            .draw_lottery(999, 0, &mut rng, &TextScanPayout)
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::TaskNotFound);
        assert!(db.lottery_history(10).unwrap().is_empty());
    }

    #[test]
    fn negative_overtime_is_rejected() {
        let db = setup_db();
        let task_id = completed_task(&db);
        let mut rng = StdRng::seed_from_u64(5);

        let err = db
            .draw_lottery(task_id, -1, &mut rng, &TextScanPayout)
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidFieldValue);
    }

    #[test]
    fn records_for_task_keep_the_audit_probability() {
        let db = setup_db();
        let task_id = completed_task(&db);
        let mut rng = StdRng::seed_from_u64(5);

        db.draw_lottery(task_id, 2, &mut rng, &TextScanPayout)
            .unwrap();
        db.draw_lottery(task_id, 7, &mut rng, &TextScanPayout)
            .unwrap();

        let records = db.lottery_records_for_task(task_id).unwrap();

        assert_eq!(records.len(), 2);
        assert!((records[0].no_prize_probability - 0.2).abs() < f64::EPSILON);
        assert!((records[1].no_prize_probability - 0.7).abs() < f64::EPSILON);
        assert!(records.iter().all(|r| r.draw_time > 0));
    }

    #[test]
    fn history_is_newest_first_and_bounded() {
        let db = setup_db();
        let task_id = completed_task(&db);
        let mut rng = StdRng::seed_from_u64(5);

        for hours in 0..5 {
            db.draw_lottery(task_id, hours, &mut rng, &TextScanPayout)
                .unwrap();
        }

        let history = db.lottery_history(3).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].hours_exceeded, 4);
    }
}

mod maintenance_tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;

    fn backdate_archived(db: &Database, task_id: i64, days_ago: i64) {
        let archived = now_ms() - days_ago * DAY_MS;
        db.with_conn(|conn| {
            conn.execute(
                "UPDATE tasks SET archived_at = ?1 WHERE id = ?2",
                params![archived, task_id],
            )?;
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn purge_removes_only_expired_archived_tasks() {
        let db = setup_db();
        let old = db.create_task("old", None, 1).unwrap();
        let fresh = db.create_task("fresh", None, 1).unwrap();
        let live = db.create_task("live", None, 1).unwrap();
        db.archive_task(old.id).unwrap();
        db.archive_task(fresh.id).unwrap();
        backdate_archived(&db, old.id, 31);

        let purged = db.purge_archived_tasks(30).unwrap();

        assert_eq!(purged, 1);
        assert!(db.get_task(old.id).unwrap().is_none());
        assert!(db.get_task(fresh.id).unwrap().is_some());
        assert!(db.get_task(live.id).unwrap().is_some());
    }

    #[test]
    fn expiring_lists_tasks_inside_the_warn_window() {
        let db = setup_db();
        let soon = db.create_task("soon", None, 1).unwrap();
        let later = db.create_task("later", None, 1).unwrap();
        db.archive_task(soon.id).unwrap();
        db.archive_task(later.id).unwrap();
        backdate_archived(&db, soon.id, 25);
        backdate_archived(&db, later.id, 10);

        let expiring = db.expiring_archived_tasks(30, 7).unwrap();

        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].id, soon.id);
    }

    #[test]
    fn purge_rejects_nonpositive_retention() {
        let db = setup_db();

        let err = db.purge_archived_tasks(0).unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidFieldValue);
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn data_survives_reopen_of_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taskloot.db");

        {
            let db = Database::open(&path).unwrap();
            db.create_task("persisted", None, 1).unwrap();
            db.wallet_credit(5.0, "seed", None).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_tasks(None).unwrap().len(), 1);
        assert_eq!(db.wallet_balance().unwrap(), 5.0);
    }
}
