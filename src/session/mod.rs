//! Session state machine: per-user role registration and the multi-step
//! teacher flows (video upload capture, withdrawal capture).
//!
//! Every operation here is a read-modify-write on a single user record
//! behind the [`UserStore`] seam. The functions do no I/O of their own
//! beyond the store calls and never suspend; callers serialize same-id
//! access with `storage::locks::UserLocks` before invoking them.

pub mod ledger;

use chrono::Utc;
use strum::{Display, EnumString};

use crate::core::config::Policy;
use crate::core::error::{AppError, AppResult};

/// Account type, chosen exactly once at registration. There is no
/// role-change flow; the record keeps its role for life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

/// The single in-flight multi-step flow a teacher is currently in.
///
/// One explicit, persisted field instead of scattered per-flow booleans.
/// `None` for every student, always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum PendingAction {
    #[default]
    None,
    AwaitingVideoUpload,
    AwaitingWithdrawalAccount,
}

/// One user record, the single point of truth for role and commerce state.
///
/// Student-only and teacher-only fields coexist on the record (the store
/// is a flat row); the state machine only ever touches the fields that
/// belong to the record's role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub telegram_id: i64,
    pub display_name: String,
    pub role: Role,
    /// RFC 3339 timestamp, set at registration, never mutated
    pub registered_at: String,
    pub pending_action: PendingAction,
    // Student fields
    pub selected_level: Option<String>,
    pub subscription_plan: Option<String>,
    pub videos_watched: i64,
    // Teacher fields
    pub specialization: Option<String>,
    pub videos_count: i64,
    /// Non-negative DZD balance; mutated only by the ledger
    pub earnings_balance: i64,
    pub withdrawal_account: Option<String>,
}

impl User {
    /// Fresh record with role-appropriate defaults.
    pub fn new(telegram_id: i64, display_name: impl Into<String>, role: Role, registered_at: String) -> Self {
        Self {
            telegram_id,
            display_name: display_name.into(),
            role,
            registered_at,
            pending_action: PendingAction::None,
            selected_level: None,
            subscription_plan: None,
            videos_watched: 0,
            specialization: None,
            videos_count: 0,
            earnings_balance: 0,
            withdrawal_account: None,
        }
    }
}

/// Append-only record of an accepted lesson upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    pub teacher_id: i64,
    /// Opaque Telegram file id; fetching the media is the gateway's job
    pub media_ref: String,
    pub caption: String,
    pub uploaded_at: String,
}

/// Keyed repository of user records.
///
/// `put` replaces the whole record atomically — callers read-modify-write,
/// never patch. Backed by SQLite in production and by an in-memory map in
/// tests.
pub trait UserStore {
    fn get(&self, telegram_id: i64) -> AppResult<Option<User>>;
    fn put(&self, user: &User) -> AppResult<()>;
}

/// Append-only video log. Records are never mutated or deleted here;
/// review and publishing happen outside this bot.
pub trait VideoLog {
    fn append(&self, video: &NewVideo) -> AppResult<()>;
}

/// What a state transition produced, for the gateway to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Fresh registration completed
    Registered { role: Role },
    /// Re-registration attempt on an existing record; nothing was touched
    AlreadyRegistered { role: Role },
    /// Teacher is now awaiting a video message
    UploadPromptRequested,
    /// Video captured, reward credited
    VideoAccepted { caption: String, reward: i64, balance: i64, videos_count: i64 },
    /// Event arrived outside the flow that consumes it; no effect
    NotHandled,
    /// Teacher is now awaiting an account identifier
    WithdrawalPromptRequested { balance: i64 },
    /// Balance below the threshold; reported condition, not an error
    WithdrawalBelowThreshold { balance: i64, shortfall: i64 },
    /// Account recorded and balance zeroed in one step
    WithdrawalCaptured { amount: i64, account: String },
    /// Student picked a level to browse
    LevelSelected { level: String },
    /// Teacher picked a specialization subject
    SpecializationSet { subject: String },
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn require_user(store: &impl UserStore, telegram_id: i64) -> AppResult<User> {
    store.get(telegram_id)?.ok_or(AppError::NotRegistered)
}

fn require_teacher(store: &impl UserStore, telegram_id: i64) -> AppResult<User> {
    let user = require_user(store, telegram_id)?;
    if user.role != Role::Teacher {
        return Err(AppError::RoleMismatch { required: Role::Teacher });
    }
    Ok(user)
}

/// `register(role)`: Unregistered → Idle(role).
///
/// Re-registration policy: an existing record is left untouched and the
/// caller is told the account already exists. No partial record is ever
/// created on any failure path.
pub fn register(
    store: &impl UserStore,
    telegram_id: i64,
    display_name: &str,
    role: Role,
) -> AppResult<Outcome> {
    if let Some(existing) = store.get(telegram_id)? {
        log::info!(
            "Re-registration attempt for {} (existing role: {})",
            telegram_id,
            existing.role
        );
        return Ok(Outcome::AlreadyRegistered { role: existing.role });
    }

    let user = User::new(telegram_id, display_name, role, now_rfc3339());
    store.put(&user)?;
    log::info!("Registered {} as {}", telegram_id, role);
    Ok(Outcome::Registered { role })
}

/// `requestVideoUpload`: Idle(Teacher) → AwaitingVideoUpload.
pub fn request_video_upload(store: &impl UserStore, telegram_id: i64) -> AppResult<Outcome> {
    let mut user = require_teacher(store, telegram_id)?;
    user.pending_action = PendingAction::AwaitingVideoUpload;
    store.put(&user)?;
    Ok(Outcome::UploadPromptRequested)
}

/// `videoReceived`: AwaitingVideoUpload → Idle(Teacher), appending the
/// video and crediting the per-video reward in the same logical step.
///
/// A media event outside `AwaitingVideoUpload` — or from an unregistered
/// or student identity — is not handled: no ledger effect, no state
/// change.
pub fn video_received(
    store: &(impl UserStore + VideoLog),
    telegram_id: i64,
    media_ref: &str,
    caption: &str,
    policy: &Policy,
) -> AppResult<Outcome> {
    let mut user = match store.get(telegram_id)? {
        Some(u) if u.role == Role::Teacher && u.pending_action == PendingAction::AwaitingVideoUpload => u,
        _ => return Ok(Outcome::NotHandled),
    };

    store.append(&NewVideo {
        teacher_id: telegram_id,
        media_ref: media_ref.to_string(),
        caption: caption.to_string(),
        uploaded_at: now_rfc3339(),
    })?;

    let balance = ledger::credit_video(&mut user, policy);
    user.pending_action = PendingAction::None;
    store.put(&user)?;

    log::info!(
        "Video accepted from teacher {}: +{} DZD, balance {}",
        telegram_id,
        policy.video_reward,
        balance
    );
    Ok(Outcome::VideoAccepted {
        caption: caption.to_string(),
        reward: policy.video_reward,
        balance,
        videos_count: user.videos_count,
    })
}

/// `requestWithdrawal`: threshold-gated entry into withdrawal capture.
///
/// Below the threshold the exact shortfall is reported and the state is
/// left unchanged.
pub fn request_withdrawal(store: &impl UserStore, telegram_id: i64, policy: &Policy) -> AppResult<Outcome> {
    let mut user = require_teacher(store, telegram_id)?;

    if let Some(shortfall) = ledger::withdrawal_shortfall(&user, policy) {
        return Ok(Outcome::WithdrawalBelowThreshold {
            balance: user.earnings_balance,
            shortfall,
        });
    }

    let balance = user.earnings_balance;
    user.pending_action = PendingAction::AwaitingWithdrawalAccount;
    store.put(&user)?;
    Ok(Outcome::WithdrawalPromptRequested { balance })
}

/// `accountReceived`: AwaitingWithdrawalAccount → Idle(Teacher).
///
/// Withdrawal capture is atomic: the account is recorded and the balance
/// zeroed in a single `put`, so no observable state has one without the
/// other. Only a withdrawal *request* is recorded; no transfer runs here.
pub fn account_received(store: &impl UserStore, telegram_id: i64, account: &str) -> AppResult<Outcome> {
    let mut user = require_teacher(store, telegram_id)?;
    if user.pending_action != PendingAction::AwaitingWithdrawalAccount {
        return Ok(Outcome::NotHandled);
    }

    let account = account.trim().to_string();
    let amount = ledger::capture_withdrawal(&mut user, &account);
    user.pending_action = PendingAction::None;
    store.put(&user)?;

    log::info!("Withdrawal captured for teacher {}: {} DZD", telegram_id, amount);
    Ok(Outcome::WithdrawalCaptured { amount, account })
}

/// Records the level a student is browsing. The level key must already be
/// catalog-validated by the callback router.
pub fn select_level(store: &impl UserStore, telegram_id: i64, level: &str) -> AppResult<Outcome> {
    let mut user = require_user(store, telegram_id)?;
    if user.role != Role::Student {
        return Err(AppError::RoleMismatch { required: Role::Student });
    }
    user.selected_level = Some(level.to_string());
    store.put(&user)?;
    Ok(Outcome::LevelSelected { level: level.to_string() })
}

/// Records a teacher's specialization subject (catalog-validated key).
pub fn set_specialization(store: &impl UserStore, telegram_id: i64, subject: &str) -> AppResult<Outcome> {
    let mut user = require_teacher(store, telegram_id)?;
    user.specialization = Some(subject.to_string());
    store.put(&user)?;
    Ok(Outcome::SpecializationSet { subject: subject.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory store, same contract as the SQLite one.
    #[derive(Default)]
    struct MemStore {
        users: Mutex<HashMap<i64, User>>,
        videos: Mutex<Vec<NewVideo>>,
    }

    impl UserStore for MemStore {
        fn get(&self, telegram_id: i64) -> AppResult<Option<User>> {
            Ok(self.users.lock().unwrap().get(&telegram_id).cloned())
        }

        fn put(&self, user: &User) -> AppResult<()> {
            self.users.lock().unwrap().insert(user.telegram_id, user.clone());
            Ok(())
        }
    }

    impl VideoLog for MemStore {
        fn append(&self, video: &NewVideo) -> AppResult<()> {
            self.videos.lock().unwrap().push(video.clone());
            Ok(())
        }
    }

    fn teacher_with_balance(store: &MemStore, id: i64, balance: i64) {
        let mut user = User::new(id, "Sara", Role::Teacher, "2026-01-01T00:00:00Z".to_string());
        user.earnings_balance = balance;
        store.put(&user).unwrap();
    }

    #[test]
    fn registration_creates_record_with_role_defaults() {
        let store = MemStore::default();
        let outcome = register(&store, 7, "Amine", Role::Student).unwrap();
        assert_eq!(outcome, Outcome::Registered { role: Role::Student });

        let user = store.get(7).unwrap().unwrap();
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.pending_action, PendingAction::None);
        assert_eq!(user.earnings_balance, 0);
    }

    #[test]
    fn second_registration_is_rejected_and_keeps_the_record() {
        let store = MemStore::default();
        register(&store, 7, "Amine", Role::Student).unwrap();
        let before = store.get(7).unwrap().unwrap();

        let outcome = register(&store, 7, "Amine again", Role::Teacher).unwrap();
        assert_eq!(outcome, Outcome::AlreadyRegistered { role: Role::Student });
        assert_eq!(store.get(7).unwrap().unwrap(), before);
        assert_eq!(store.users.lock().unwrap().len(), 1);
    }

    #[test]
    fn unregistered_commands_fail_without_creating_a_record() {
        let store = MemStore::default();
        assert!(matches!(
            request_video_upload(&store, 42),
            Err(AppError::NotRegistered)
        ));
        assert!(store.users.lock().unwrap().is_empty());
    }

    #[test]
    fn student_cannot_start_a_video_upload() {
        let store = MemStore::default();
        register(&store, 7, "Amine", Role::Student).unwrap();
        let before = store.get(7).unwrap().unwrap();

        let err = request_video_upload(&store, 7).unwrap_err();
        assert!(matches!(err, AppError::RoleMismatch { required: Role::Teacher }));
        assert_eq!(store.get(7).unwrap().unwrap(), before);
    }

    #[test]
    fn video_reward_credited_only_while_awaiting_upload() {
        let store = MemStore::default();
        let policy = Policy::default();
        register(&store, 9, "Sara", Role::Teacher).unwrap();

        // Media outside AwaitingVideoUpload: no ledger effect
        let outcome = video_received(&store, 9, "file-1", "Percentages", &policy).unwrap();
        assert_eq!(outcome, Outcome::NotHandled);
        assert_eq!(store.get(9).unwrap().unwrap().earnings_balance, 0);
        assert!(store.videos.lock().unwrap().is_empty());

        request_video_upload(&store, 9).unwrap();
        let outcome = video_received(&store, 9, "file-1", "Percentages", &policy).unwrap();
        assert_eq!(
            outcome,
            Outcome::VideoAccepted {
                caption: "Percentages".to_string(),
                reward: 50,
                balance: 50,
                videos_count: 1,
            }
        );

        let user = store.get(9).unwrap().unwrap();
        assert_eq!(user.pending_action, PendingAction::None);
        assert_eq!(user.videos_count, 1);
        assert_eq!(store.videos.lock().unwrap().len(), 1);

        // Pending cleared: a duplicate media notification is ignored
        let outcome = video_received(&store, 9, "file-1", "Percentages", &policy).unwrap();
        assert_eq!(outcome, Outcome::NotHandled);
        assert_eq!(store.get(9).unwrap().unwrap().earnings_balance, 50);
    }

    #[test]
    fn withdrawal_below_threshold_reports_exact_shortfall() {
        let store = MemStore::default();
        let policy = Policy::default();
        teacher_with_balance(&store, 9, 950);

        let outcome = request_withdrawal(&store, 9, &policy).unwrap();
        assert_eq!(
            outcome,
            Outcome::WithdrawalBelowThreshold { balance: 950, shortfall: 50 }
        );
        // Balance unchanged, no pending flow started
        let user = store.get(9).unwrap().unwrap();
        assert_eq!(user.earnings_balance, 950);
        assert_eq!(user.pending_action, PendingAction::None);
    }

    #[test]
    fn shortfall_then_two_uploads_then_withdrawal_capture() {
        let store = MemStore::default();
        let policy = Policy::default();
        teacher_with_balance(&store, 9, 950);

        assert_eq!(
            request_withdrawal(&store, 9, &policy).unwrap(),
            Outcome::WithdrawalBelowThreshold { balance: 950, shortfall: 50 }
        );

        for n in 0..2 {
            request_video_upload(&store, 9).unwrap();
            video_received(&store, 9, &format!("file-{}", n), "Lesson", &policy).unwrap();
        }
        assert_eq!(store.get(9).unwrap().unwrap().earnings_balance, 1050);

        assert_eq!(
            request_withdrawal(&store, 9, &policy).unwrap(),
            Outcome::WithdrawalPromptRequested { balance: 1050 }
        );

        let outcome = account_received(&store, 9, "CCP00123").unwrap();
        assert_eq!(
            outcome,
            Outcome::WithdrawalCaptured { amount: 1050, account: "CCP00123".to_string() }
        );

        let user = store.get(9).unwrap().unwrap();
        assert_eq!(user.earnings_balance, 0);
        assert_eq!(user.withdrawal_account.as_deref(), Some("CCP00123"));
        assert_eq!(user.pending_action, PendingAction::None);
    }

    #[test]
    fn balance_never_goes_negative_across_event_sequences() {
        let store = MemStore::default();
        let policy = Policy::default();
        teacher_with_balance(&store, 9, 1000);

        // Capture, then immediately try to capture again
        request_withdrawal(&store, 9, &policy).unwrap();
        account_received(&store, 9, "CCP1").unwrap();
        assert_eq!(
            account_received(&store, 9, "CCP2").unwrap(),
            Outcome::NotHandled
        );

        let user = store.get(9).unwrap().unwrap();
        assert_eq!(user.earnings_balance, 0);
        assert_eq!(user.withdrawal_account.as_deref(), Some("CCP1"));
    }

    #[test]
    fn student_text_never_captures_a_withdrawal() {
        let store = MemStore::default();
        register(&store, 7, "Amine", Role::Student).unwrap();
        let err = account_received(&store, 7, "CCP00123").unwrap_err();
        assert!(matches!(err, AppError::RoleMismatch { required: Role::Teacher }));
    }

    #[test]
    fn level_selection_sticks_to_the_student_record() {
        let store = MemStore::default();
        register(&store, 7, "Amine", Role::Student).unwrap();
        select_level(&store, 7, "middle").unwrap();
        assert_eq!(store.get(7).unwrap().unwrap().selected_level.as_deref(), Some("middle"));
    }
}
