//! Background reminder scheduler with explicit thread lifecycle ownership.
//!
//! The worker thread wakes on a fixed interval, scans the store under the
//! engine lock, then delivers due-soon announcements through the speech and
//! notification collaborators after the lock is released. Overdue reminders
//! are completed silently; reminders inside the due-soon window are announced
//! on every tick until they fall due.

use chrono::{Local, NaiveDateTime};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

use crate::memory::context;
use crate::memory::store::MemoryStore;
use crate::memory::types::Reminder;
use crate::session::Engine;
use crate::speech::{Notification, Notifier, Speaker};

/// How often the worker thread scans the store.
pub const TICK_INTERVAL: Duration = Duration::from_secs(30);
/// Reminders due within this many seconds get announced each tick.
pub const DUE_SOON_WINDOW_SECS: i64 = 300;

const DUE_SOON_NOTIFICATION_TIMEOUT_SECS: u64 = 10;

/// What one scan of the store produced.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Messages of reminders completed silently this tick.
    pub completed: Vec<String>,
    /// Active reminders falling due within the announcement window.
    pub due_soon: Vec<Reminder>,
    /// Whether the scan changed the store and a flush is needed.
    pub mutated: bool,
}

/// One scheduler pass over the store. Completes every overdue active
/// reminder without announcing it and collects the still-active reminders
/// inside the due-soon window. Refreshes the contextual view when anything
/// transitioned.
pub fn scan(store: &mut MemoryStore, now: NaiveDateTime) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    for reminder in &mut store.long_term.reminders {
        if !reminder.is_active() {
            continue;
        }
        if reminder.due_at <= now {
            if reminder.complete(now) {
                outcome.completed.push(reminder.message.clone());
                outcome.mutated = true;
            }
            continue;
        }
        let lead = (reminder.due_at - now).num_seconds();
        if lead <= DUE_SOON_WINDOW_SECS {
            outcome.due_soon.push(reminder.clone());
        }
    }
    if outcome.mutated {
        context::refresh(store, now);
        debug!(
            completed = outcome.completed.len(),
            "scheduler completed overdue reminders"
        );
    }
    outcome
}

/// Build the spoken line and notification for one due-soon reminder.
pub fn due_soon_effect(reminder: &Reminder) -> (String, Notification) {
    let line = format!("Reminder: {}", reminder.message);
    let notification = Notification::new(
        "Upcoming Reminder",
        &reminder.message,
        DUE_SOON_NOTIFICATION_TIMEOUT_SECS,
    );
    (line, notification)
}

/// Runtime owner for the scheduler thread.
pub struct ReminderScheduler {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ReminderScheduler {
    /// Spawn the worker thread. It scans immediately, then on every tick.
    pub fn spawn(
        engine: Arc<Engine>,
        speaker: Arc<dyn Speaker + Send + Sync>,
        notifier: Arc<dyn Notifier + Send + Sync>,
        tick: Duration,
    ) -> Self {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("reminder-scheduler".into())
            .spawn(move || {
                run_scheduler_loop(&engine, speaker.as_ref(), notifier.as_ref(), tick, &stop_rx);
            })
            .map_err(|err| warn!(error = %err, "failed to spawn scheduler thread"))
            .ok();
        Self {
            stop_tx: Some(stop_tx),
            handle,
        }
    }

    /// Signal the worker to stop and wait for it to exit.
    pub fn stop(&mut self) {
        // Dropping the sender disconnects the wait in the worker loop.
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
            drop(stop_tx);
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("scheduler thread panicked before shutdown");
            }
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_scheduler_loop(
    engine: &Engine,
    speaker: &(dyn Speaker + Send + Sync),
    notifier: &(dyn Notifier + Send + Sync),
    tick: Duration,
    stop_rx: &Receiver<()>,
) {
    loop {
        let now = Local::now().naive_local();
        let outcome = engine.scheduler_tick(now);
        for reminder in &outcome.due_soon {
            let (line, notification) = due_soon_effect(reminder);
            speaker.speak(&line);
            notifier.notify(&notification);
        }
        match stop_rx.recv_timeout(tick) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("reminder scheduler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::types::ReminderStatus;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 2)
            .expect("date")
            .and_hms_opt(h, m, 0)
            .expect("time")
    }

    fn store_with_reminders(due_times: &[NaiveDateTime]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for (i, due) in due_times.iter().enumerate() {
            store.upsert_reminder(&format!("reminder {i}"), *due, ts(0, 0));
        }
        store
    }

    #[test]
    fn overdue_reminders_complete_silently() {
        let mut store = store_with_reminders(&[ts(8, 0), ts(8, 30)]);
        let outcome = scan(&mut store, ts(9, 0));

        assert_eq!(outcome.completed.len(), 2);
        assert!(outcome.due_soon.is_empty());
        assert!(outcome.mutated);
        for reminder in &store.long_term.reminders {
            assert_eq!(reminder.status, ReminderStatus::Completed);
            assert_eq!(reminder.completed_at, Some(ts(9, 0)));
        }
        assert!(store.contextual.active_reminders.is_empty());
    }

    #[test]
    fn due_soon_window_is_five_minutes_inclusive() {
        let mut store = store_with_reminders(&[ts(9, 4), ts(9, 5), ts(9, 6)]);
        let outcome = scan(&mut store, ts(9, 0));

        let due: Vec<&str> = outcome.due_soon.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(due, ["reminder 0", "reminder 1"]);
        assert!(!outcome.mutated, "announcements alone do not dirty the store");
    }

    #[test]
    fn due_soon_reminder_repeats_until_it_falls_due() {
        let mut store = store_with_reminders(&[ts(9, 4)]);

        assert_eq!(scan(&mut store, ts(9, 0)).due_soon.len(), 1);
        assert_eq!(scan(&mut store, ts(9, 1)).due_soon.len(), 1);

        let final_tick = scan(&mut store, ts(9, 4));
        assert!(final_tick.due_soon.is_empty());
        assert_eq!(final_tick.completed, ["reminder 0"]);
    }

    #[test]
    fn completed_reminders_are_never_rescanned() {
        let mut store = store_with_reminders(&[ts(8, 0)]);
        assert!(scan(&mut store, ts(9, 0)).mutated);

        let second = scan(&mut store, ts(9, 1));
        assert!(second.completed.is_empty());
        assert!(!second.mutated);
        assert_eq!(
            store.long_term.reminders[0].completed_at,
            Some(ts(9, 0)),
            "completion stamp keeps its original value"
        );
    }

    #[test]
    fn due_soon_effect_uses_reminder_message() {
        let store = store_with_reminders(&[ts(9, 3)]);
        let (line, notification) = due_soon_effect(&store.long_term.reminders[0]);
        assert_eq!(line, "Reminder: reminder 0");
        assert_eq!(notification.title, "Upcoming Reminder");
        assert_eq!(notification.message, "reminder 0");
    }
}
