//! Recognition of system notices that look like `<sender>: <text>` lines.
//!
//! A notice such as `Alice changed the subject from "a" to "b: c"` contains a
//! colon, so the naive sender split produces a bogus sender. The sender
//! candidate is checked against known notice phrases instead.

/// Phrases that only appear in system notices.
const SYSTEM_INDICATORS: &[&str] = &[
    "messages and calls are end-to-end encrypted",
    "created group",
    "created this group",
    "changed the subject",
    "changed this group's icon",
    "changed the group description",
    "deleted this group's icon",
    "changed their phone number",
    "changed to",
    "joined using this group's invite link",
    "security code changed",
    "security code with",
    "you're now an admin",
    "is now an admin",
    "turned on disappearing messages",
    "turned off disappearing messages",
    " added ",
    " removed ",
    // Russian exports
    "сообщения и звонки защищены сквозным шифрованием",
    "создал(а) группу",
    "изменил тему",
    "изменил описание группы",
    "изменил номер телефона",
    "присоединился по ссылке",
];

/// Returns `true` if a sender candidate actually reads as a system notice.
///
/// Sender names never contain these phrases; anything that does is the
/// leading part of a notice whose text happens to include a colon.
pub fn looks_like_system_notice(sender_candidate: &str) -> bool {
    let candidate = sender_candidate.trim();
    if candidate.is_empty() {
        return true;
    }
    let lower = format!(" {} ", candidate.to_lowercase());
    SYSTEM_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator))
}
