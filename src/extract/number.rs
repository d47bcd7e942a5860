/// Characters treated as formatting noise around numbers: currency glyphs,
/// the yen word, and both plain and full-width digit separators.
const NOISE_CHARS: [char; 5] = ['¥', '￥', '円', ',', '、'];

/// Extracts the first number from free-form text.
///
/// Strips currency/locale noise and whitespace, then parses the first
/// maximal run of decimal digits. Returns `None` when the input is empty
/// or contains no digits; malformed input is never an error.
pub fn extract_number(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }

    let cleaned: String = text
        .chars()
        .filter(|c| !NOISE_CHARS.contains(c) && !c.is_whitespace())
        .collect();

    let digits: String = cleaned
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return None;
    }

    digits.parse().ok()
}
