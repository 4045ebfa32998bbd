//! Menu generation: pure functions from catalog (and role) to ordered
//! (label, callback token) lists.
//!
//! Catalog order is presentation order; nothing here sorts. Rendering the
//! items to an `InlineKeyboardMarkup` is a thin helper kept separate so
//! the generation itself stays testable without Telegram types.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup};

use crate::catalog::Catalog;
use crate::session::Role;

const UPLOAD_VIDEO_LABEL: &str = "📹 Upload a lesson";
const MY_EARNINGS_LABEL: &str = "💰 My earnings";
const MARKETPLACE_LABEL: &str = "🛒 Marketplace";
const PAYMENT_INFO_LABEL: &str = "💳 Subscription";
const PROFILE_LABEL: &str = "⚙️ My profile";
const HELP_LABEL: &str = "ℹ️ Help";

/// One menu entry: human label plus the callback token it emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub token: String,
}

impl MenuItem {
    fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self { label: label.into(), token: token.into() }
    }
}

/// Registration menu shown to unregistered users on /start.
pub fn start_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("👨‍🎓 I am a student", "register_student"),
        MenuItem::new("👨‍🏫 I am a teacher", "register_teacher"),
        MenuItem::new("ℹ️ About the academy", "info"),
    ]
}

/// Role-specific main menu: students browse levels, teachers pick their
/// specialization subject.
pub fn main_menu(catalog: &Catalog, role: Role) -> Vec<MenuItem> {
    match role {
        Role::Student => level_menu(catalog),
        Role::Teacher => specialization_menu(catalog),
    }
}

/// One entry per education level, catalog order.
pub fn level_menu(catalog: &Catalog) -> Vec<MenuItem> {
    catalog
        .levels()
        .iter()
        .map(|level| MenuItem::new(level.name, format!("level_{}", level.key)))
        .collect()
}

/// Years of one level, catalog order. `None` for an unknown level key.
pub fn year_menu(catalog: &Catalog, level_key: &str) -> Option<Vec<MenuItem>> {
    let level = catalog.level(level_key)?;
    Some(
        level
            .years
            .iter()
            .map(|year| MenuItem::new(year.name, format!("year_{}_{}", level.key, year.key)))
            .collect(),
    )
}

/// Subjects for one (level, year), catalog order, plus a back entry.
/// `None` if the pair is not in the catalog.
pub fn subject_menu(catalog: &Catalog, level_key: &str, year_key: &str) -> Option<Vec<MenuItem>> {
    catalog.year(level_key, year_key)?;
    let mut items: Vec<MenuItem> = catalog
        .subjects()
        .iter()
        .map(|subject| {
            MenuItem::new(
                subject.name,
                format!("subject_{}_{}_{}", level_key, year_key, subject.key),
            )
        })
        .collect();
    items.push(MenuItem::new("🔙 Back", format!("back_{}", level_key)));
    Some(items)
}

/// One entry per subject a teacher can specialize in.
pub fn specialization_menu(catalog: &Catalog) -> Vec<MenuItem> {
    catalog
        .subjects()
        .iter()
        .map(|subject| MenuItem::new(subject.name, format!("spec_{}", subject.key)))
        .collect()
}

/// The action a persistent reply-keyboard button stands for.
///
/// Reply keyboards send their label back as plain text, so the gateway
/// resolves inbound free text through [`parse_label`] before falling back
/// to the generic hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuLabel {
    BrowseLevel(String),
    Marketplace,
    PaymentInfo,
    Profile,
    Help,
    UploadVideo,
    MyEarnings,
}

/// Rows of the persistent reply keyboard, role-specific like [`main_menu`].
/// Students get the levels up front; teachers get the commerce actions.
pub fn reply_menu(catalog: &Catalog, role: Role) -> Vec<Vec<String>> {
    match role {
        Role::Student => vec![
            catalog.levels().iter().map(|level| level.name.to_string()).collect(),
            vec![MARKETPLACE_LABEL.to_string(), PAYMENT_INFO_LABEL.to_string()],
            vec![PROFILE_LABEL.to_string(), HELP_LABEL.to_string()],
        ],
        Role::Teacher => vec![
            vec![UPLOAD_VIDEO_LABEL.to_string(), MY_EARNINGS_LABEL.to_string()],
            vec![MARKETPLACE_LABEL.to_string(), PROFILE_LABEL.to_string()],
            vec![HELP_LABEL.to_string()],
        ],
    }
}

/// Resolves free text back to the reply-keyboard action it names.
/// `None` for anything that is not a known label.
pub fn parse_label(text: &str, catalog: &Catalog) -> Option<MenuLabel> {
    if let Some(level) = catalog.levels().iter().find(|level| level.name == text) {
        return Some(MenuLabel::BrowseLevel(level.key.to_string()));
    }
    match text {
        UPLOAD_VIDEO_LABEL => Some(MenuLabel::UploadVideo),
        MY_EARNINGS_LABEL => Some(MenuLabel::MyEarnings),
        MARKETPLACE_LABEL => Some(MenuLabel::Marketplace),
        PAYMENT_INFO_LABEL => Some(MenuLabel::PaymentInfo),
        PROFILE_LABEL => Some(MenuLabel::Profile),
        HELP_LABEL => Some(MenuLabel::Help),
        _ => None,
    }
}

/// Renders reply-menu rows to the persistent bottom keyboard.
pub fn to_reply_keyboard(rows: &[Vec<String>]) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.iter()
            .map(|row| row.iter().map(|label| KeyboardButton::new(label.clone())).collect::<Vec<_>>()),
    )
    .resize_keyboard()
    .persistent()
}

/// Renders menu items one per row, the layout every menu here uses.
pub fn to_keyboard(items: &[MenuItem]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        items
            .iter()
            .map(|item| vec![InlineKeyboardButton::callback(item.label.clone(), item.token.clone())]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn start_menu_offers_both_roles_then_info() {
        let tokens: Vec<String> = start_menu().into_iter().map(|i| i.token).collect();
        assert_eq!(tokens, vec!["register_student", "register_teacher", "info"]);
    }

    #[test]
    fn level_menu_preserves_catalog_order() {
        let catalog = Catalog::algerian();
        let tokens: Vec<String> = level_menu(&catalog).into_iter().map(|i| i.token).collect();
        assert_eq!(tokens, vec!["level_primary", "level_middle", "level_high"]);
    }

    #[test]
    fn year_menu_tokens_carry_level_and_year() {
        let catalog = Catalog::algerian();
        let items = year_menu(&catalog, "middle").unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[3].token, "year_middle_4");
        assert_eq!(items[3].label, "Year 4 — Middle (BEM)");
        assert!(year_menu(&catalog, "college").is_none());
    }

    #[test]
    fn drill_down_reproduces_catalog_labels_in_order() {
        // level_primary -> year_primary_3 -> subject_primary_3_math
        let catalog = Catalog::algerian();

        let years = year_menu(&catalog, "primary").unwrap();
        assert_eq!(years[2].token, "year_primary_3");
        assert_eq!(years[2].label, catalog.year("primary", "3").unwrap().name);

        let subjects = subject_menu(&catalog, "primary", "3").unwrap();
        assert_eq!(subjects[0].token, "subject_primary_3_math");
        assert_eq!(subjects[0].label, catalog.subject("math").unwrap().name);
    }

    #[test]
    fn subject_menu_ends_with_back_and_rejects_bad_years() {
        let catalog = Catalog::algerian();
        let items = subject_menu(&catalog, "high", "2").unwrap();
        assert_eq!(items.last().unwrap().token, "back_high");
        // subjects + back entry
        assert_eq!(items.len(), catalog.subjects().len() + 1);
        assert!(subject_menu(&catalog, "primary", "9").is_none());
    }

    #[test]
    fn every_reply_keyboard_label_parses_back_to_its_action() {
        let catalog = Catalog::algerian();
        for role in [Role::Student, Role::Teacher] {
            for row in reply_menu(&catalog, role) {
                for label in row {
                    assert!(
                        parse_label(&label, &catalog).is_some(),
                        "label {:?} does not resolve",
                        label
                    );
                }
            }
        }
    }

    #[test]
    fn student_reply_keyboard_leads_with_the_levels() {
        let catalog = Catalog::algerian();
        let rows = reply_menu(&catalog, Role::Student);
        let level_names: Vec<String> = catalog.levels().iter().map(|l| l.name.to_string()).collect();
        assert_eq!(rows[0], level_names);
        assert_eq!(
            parse_label(&rows[0][0], &catalog),
            Some(MenuLabel::BrowseLevel("primary".to_string()))
        );
    }

    #[test]
    fn teacher_reply_keyboard_drives_the_commerce_handlers() {
        let catalog = Catalog::algerian();
        let labels: Vec<String> = reply_menu(&catalog, Role::Teacher).into_iter().flatten().collect();
        let actions: Vec<MenuLabel> = labels
            .iter()
            .map(|label| parse_label(label, &catalog).unwrap())
            .collect();
        assert!(actions.contains(&MenuLabel::UploadVideo));
        assert!(actions.contains(&MenuLabel::MyEarnings));
        assert!(actions.contains(&MenuLabel::Profile));
    }

    #[test]
    fn arbitrary_text_is_not_a_label() {
        let catalog = Catalog::algerian();
        assert_eq!(parse_label("CCP00123", &catalog), None);
        assert_eq!(parse_label("hello", &catalog), None);
        assert_eq!(parse_label("", &catalog), None);
    }

    #[test]
    fn main_menu_depends_on_role() {
        let catalog = Catalog::algerian();
        let student: Vec<String> = main_menu(&catalog, Role::Student).into_iter().map(|i| i.token).collect();
        let teacher: Vec<String> = main_menu(&catalog, Role::Teacher).into_iter().map(|i| i.token).collect();
        assert!(student.iter().all(|t| t.starts_with("level_")));
        assert!(teacher.iter().all(|t| t.starts_with("spec_")));
        assert_eq!(teacher.first().map(String::as_str), Some("spec_math"));
    }
}
