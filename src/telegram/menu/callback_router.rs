//! Callback token parsing and routing.
//!
//! Inbound callback tokens follow a fixed grammar:
//! `<verb>` or `<verb>_<arg1>[_<arg2>[_<arg3>]]`. The split uses the
//! verb's expected arity (arguments never contain the delimiter) and every
//! argument is validated against the catalog *before* use — an unknown
//! verb or key fails with `InvalidCallback` instead of an unhandled
//! lookup panic. A valid token resolves to either a state-machine event
//! (register, spec, level-for-students) or a pure menu request.

use std::str::FromStr;

use teloxide::prelude::*;
use teloxide::types::ParseMode;

use super::menus::{self, MenuItem};
use crate::catalog::Catalog;
use crate::core::error::{AppError, AppResult};
use crate::session::{self, Outcome, Role};
use crate::telegram::handlers::HandlerDeps;
use crate::telegram::text;
use crate::telegram::Bot;

/// A parsed, catalog-validated callback token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Register(Role),
    Info,
    Level(String),
    Spec(String),
    Year { level: String, year: String },
    Subject { level: String, year: String, subject: String },
    Back(String),
}

impl Callback {
    /// Parses a raw token, validating every argument against the catalog.
    pub fn parse(data: &str, catalog: &Catalog) -> AppResult<Self> {
        let invalid = || AppError::InvalidCallback(data.to_string());

        let (verb, rest) = match data.split_once('_') {
            Some((verb, rest)) => (verb, Some(rest)),
            None => (data, None),
        };

        match (verb, rest) {
            ("info", None) => Ok(Callback::Info),
            ("register", Some(arg)) => {
                let role = Role::from_str(arg).map_err(|_| invalid())?;
                Ok(Callback::Register(role))
            }
            ("level", Some(arg)) => {
                catalog.level(arg).ok_or_else(invalid)?;
                Ok(Callback::Level(arg.to_string()))
            }
            ("spec", Some(arg)) => {
                catalog.subject(arg).ok_or_else(invalid)?;
                Ok(Callback::Spec(arg.to_string()))
            }
            ("back", Some(arg)) => {
                catalog.level(arg).ok_or_else(invalid)?;
                Ok(Callback::Back(arg.to_string()))
            }
            ("year", Some(rest)) => {
                let (level, year) = rest.split_once('_').ok_or_else(invalid)?;
                catalog.year(level, year).ok_or_else(invalid)?;
                Ok(Callback::Year { level: level.to_string(), year: year.to_string() })
            }
            ("subject", Some(rest)) => {
                let mut parts = rest.splitn(3, '_');
                let level = parts.next().ok_or_else(invalid)?;
                let year = parts.next().ok_or_else(invalid)?;
                let subject = parts.next().ok_or_else(invalid)?;
                catalog.year(level, year).ok_or_else(invalid)?;
                catalog.subject(subject).ok_or_else(invalid)?;
                Ok(Callback::Subject {
                    level: level.to_string(),
                    year: year.to_string(),
                    subject: subject.to_string(),
                })
            }
            _ => Err(invalid()),
        }
    }
}

/// Handles callback queries from the inline menus.
///
/// Parses and validates the token, runs the resolved action, and edits the
/// originating message with the result. Every error is recovered here: the
/// user gets a descriptive reply and processing continues for everyone
/// else.
pub async fn handle_menu_callback(bot: Bot, q: CallbackQuery, deps: HandlerDeps) -> ResponseResult<()> {
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(data) = q.data else { return Ok(()) };
    let (Some(chat_id), Some(message_id)) = (
        q.message.as_ref().map(|m| m.chat().id),
        q.message.as_ref().map(|m| m.id()),
    ) else {
        return Ok(());
    };
    let user_id = chat_id.0;
    let display_name = q.from.first_name.clone();

    let reply = match Callback::parse(&data, &deps.catalog) {
        Ok(callback) => dispatch(&deps, user_id, &display_name, callback).await,
        Err(e) => Err(e),
    };

    match reply {
        Ok((reply_text, items)) => {
            let mut edit = bot
                .edit_message_text(chat_id, message_id, reply_text)
                .parse_mode(ParseMode::Markdown);
            if let Some(items) = items {
                edit = edit.reply_markup(menus::to_keyboard(&items));
            }
            let _ = edit.await;
        }
        Err(e) => {
            match e {
                AppError::NotRegistered | AppError::RoleMismatch { .. } | AppError::InvalidCallback(_) => {
                    log::warn!("Callback '{}' rejected for user {}: {}", data, user_id, e);
                }
                _ => log::error!("Callback '{}' failed for user {}: {}", data, user_id, e),
            }
            let _ = bot.send_message(chat_id, e.user_message()).await;
        }
    }

    Ok(())
}

/// Resolves a validated callback to reply text plus an optional menu.
async fn dispatch(
    deps: &HandlerDeps,
    user_id: i64,
    display_name: &str,
    callback: Callback,
) -> AppResult<(String, Option<Vec<MenuItem>>)> {
    let catalog = &deps.catalog;

    match callback {
        Callback::Register(role) => {
            let _guard = deps.user_locks.acquire(user_id).await;
            let outcome = session::register(&deps.store, user_id, display_name, role)?;
            match outcome {
                Outcome::Registered { role } => Ok((
                    text::registered(role),
                    Some(menus::main_menu(catalog, role)),
                )),
                Outcome::AlreadyRegistered { role } => Ok((
                    text::already_registered(role),
                    Some(menus::main_menu(catalog, role)),
                )),
                other => {
                    log::error!("Unexpected registration outcome for {}: {:?}", user_id, other);
                    Err(AppError::InvalidCallback(format!("register_{}", role)))
                }
            }
        }
        Callback::Info => Ok((text::academy_info(), Some(menus::start_menu()))),
        Callback::Level(level) => {
            // Menu rendering is state-independent; remembering the level is
            // best-effort for registered students only.
            {
                let _guard = deps.user_locks.acquire(user_id).await;
                match session::select_level(&deps.store, user_id, &level) {
                    Ok(_) | Err(AppError::NotRegistered) | Err(AppError::RoleMismatch { .. }) => {}
                    Err(e) => return Err(e),
                }
            }
            let name = catalog.level(&level).map(|l| l.name).unwrap_or_default();
            let items = menus::year_menu(catalog, &level).ok_or_else(|| AppError::InvalidCallback(level))?;
            Ok((text::pick_year(name), Some(items)))
        }
        Callback::Back(level) => {
            let name = catalog.level(&level).map(|l| l.name).unwrap_or_default();
            let items = menus::year_menu(catalog, &level).ok_or_else(|| AppError::InvalidCallback(level))?;
            Ok((text::pick_year(name), Some(items)))
        }
        Callback::Year { level, year } => {
            let year_name = catalog
                .year(&level, &year)
                .map(|y| y.name)
                .ok_or_else(|| AppError::InvalidCallback(format!("year_{}_{}", level, year)))?;
            let items = menus::subject_menu(catalog, &level, &year)
                .ok_or_else(|| AppError::InvalidCallback(format!("year_{}_{}", level, year)))?;
            Ok((text::pick_subject(year_name), Some(items)))
        }
        Callback::Subject { level, year, subject } => {
            let year_name = catalog
                .year(&level, &year)
                .map(|y| y.name)
                .ok_or_else(|| AppError::InvalidCallback(format!("subject_{}_{}_{}", level, year, subject)))?;
            let subject_name = catalog
                .subject(&subject)
                .map(|s| s.name)
                .ok_or_else(|| AppError::InvalidCallback(subject.clone()))?;
            Ok((text::subject_lessons(year_name, subject_name), None))
        }
        Callback::Spec(subject) => {
            let _guard = deps.user_locks.acquire(user_id).await;
            session::set_specialization(&deps.store, user_id, &subject)?;
            let subject_name = catalog.subject(&subject).map(|s| s.name).unwrap_or_default();
            Ok((text::specialization_set(subject_name), None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    use crate::core::config::Policy;
    use crate::storage::create_pool;

    fn catalog() -> Catalog {
        Catalog::algerian()
    }

    fn test_deps() -> (tempfile::TempDir, HandlerDeps) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sqlite");
        let pool = Arc::new(create_pool(path.to_str().unwrap()).unwrap());
        (dir, HandlerDeps::new(pool, Arc::new(Catalog::algerian()), Policy::default()))
    }

    #[test]
    fn parses_every_verb_of_the_grammar() {
        let c = catalog();
        assert_eq!(Callback::parse("info", &c).unwrap(), Callback::Info);
        assert_eq!(
            Callback::parse("register_student", &c).unwrap(),
            Callback::Register(Role::Student)
        );
        assert_eq!(
            Callback::parse("register_teacher", &c).unwrap(),
            Callback::Register(Role::Teacher)
        );
        assert_eq!(
            Callback::parse("level_primary", &c).unwrap(),
            Callback::Level("primary".to_string())
        );
        assert_eq!(
            Callback::parse("spec_math", &c).unwrap(),
            Callback::Spec("math".to_string())
        );
        assert_eq!(
            Callback::parse("year_primary_3", &c).unwrap(),
            Callback::Year { level: "primary".to_string(), year: "3".to_string() }
        );
        assert_eq!(
            Callback::parse("subject_primary_3_math", &c).unwrap(),
            Callback::Subject {
                level: "primary".to_string(),
                year: "3".to_string(),
                subject: "math".to_string(),
            }
        );
        assert_eq!(
            Callback::parse("back_high", &c).unwrap(),
            Callback::Back("high".to_string())
        );
    }

    #[test]
    fn unknown_verbs_are_invalid_not_panics() {
        let c = catalog();
        for token in ["", "frobnicate", "register", "register_admin", "level", "year_primary"] {
            assert!(
                matches!(Callback::parse(token, &c), Err(AppError::InvalidCallback(_))),
                "token {:?} should be invalid",
                token
            );
        }
    }

    #[tokio::test]
    async fn register_dispatch_covers_fresh_and_repeat_registration() {
        let (_dir, deps) = test_deps();

        let (first, menu) = dispatch(&deps, 9, "Sara", Callback::Register(Role::Teacher))
            .await
            .unwrap();
        assert!(menu.is_some());

        // Repeat registration keeps the record and says so, whatever role
        // the second button carried
        let (second, menu) = dispatch(&deps, 9, "Sara", Callback::Register(Role::Student))
            .await
            .unwrap();
        assert!(menu.is_some());
        assert_ne!(first, second);
        assert!(second.contains("already"));
    }

    #[test]
    fn arguments_absent_from_the_catalog_are_invalid() {
        let c = catalog();
        // Primary school has no year 9
        assert!(matches!(
            Callback::parse("subject_primary_9_math", &c),
            Err(AppError::InvalidCallback(_))
        ));
        assert!(matches!(
            Callback::parse("level_kindergarten", &c),
            Err(AppError::InvalidCallback(_))
        ));
        assert!(matches!(
            Callback::parse("year_primary_6", &c),
            Err(AppError::InvalidCallback(_))
        ));
        assert!(matches!(
            Callback::parse("subject_primary_3_chemistry", &c),
            Err(AppError::InvalidCallback(_))
        ));
        assert!(matches!(
            Callback::parse("spec_chemistry", &c),
            Err(AppError::InvalidCallback(_))
        ));
    }
}
