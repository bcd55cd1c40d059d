/// Inserts `,` between groups of three integer digits of an already
/// formatted number (`"18064.70"` → `"18,064.70"`).
pub fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(formatted.len() + integer.len() / 3);
    grouped.push_str(sign);
    for (index, digit) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

pub fn format_currency(value: f64) -> String {
    format!("${}", group_thousands(&format!("{value:.2}")))
}

/// `0.154` → `"15%"` with `decimals = 0`.
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", fraction * 100.0)
}

/// Whole seconds as `MM:SS`; minutes are not wrapped at the hour.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.round().max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Splits a title into words before each capital that starts a lowercase
/// run, so `"ActionFigures"` wraps as `["Action", "Figures"]` while acronyms
/// such as `"DVD"` stay whole.
pub fn split_camel_words(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut words = Vec::new();
    let mut start = 0;

    for window in 1..chars.len() {
        let (offset, current) = chars[window];
        let next_is_lower = chars
            .get(window + 1)
            .is_some_and(|(_, next)| next.is_lowercase());
        if current.is_uppercase() && next_is_lower {
            let word = text[start..offset].trim();
            if !word.is_empty() {
                words.push(word);
            }
            start = offset;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        words.push(tail);
    }
    words
}
