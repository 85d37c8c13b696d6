//! Tokenization and emoji scanning shared by the analytics passes.

/// Returns `true` for pictographic code points commonly used as emoji.
pub fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1F2FF   // mahjong, cards, enclosed alphanumerics
            | 0x1F300..=0x1F5FF // symbols and pictographs
            | 0x1F600..=0x1F64F // emoticons
            | 0x1F680..=0x1F6FF // transport and map
            | 0x1F900..=0x1FAFF // supplemental symbols and pictographs
            | 0x2600..=0x27BF   // misc symbols, dingbats
            | 0x2300..=0x23FF   // misc technical (⌚, ⏰)
            | 0x2B50..=0x2B55   // stars, circles
    )
}

/// Emoji found in `text`, in order of appearance, duplicates included.
pub fn emojis(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().filter(|&c| is_emoji(c))
}

/// Lowercased word tokens. Apostrophes inside words are kept (`don't`).
pub fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '’'))
        .map(|w| w.trim_matches(|c| c == '\'' || c == '’'))
        .filter(|w| !w.is_empty())
        .map(|w| w.replace('’', "'"))
        .collect()
}
