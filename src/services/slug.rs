//! Slug generation for notes
//!
//! Russian titles are transliterated to Latin before the usual slug clean-up,
//! so "Новый заголовок" becomes `novyj-zagolovok`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::NOTE_SLUG_MAX_LEN;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").expect("valid regex"));

/// Latin spelling of a lower-case Russian letter.
///
/// `None` means the character is not Cyrillic; the hard and soft signs map
/// to an empty string.
fn transliterate_char(c: char) -> Option<&'static str> {
    let latin = match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(latin)
}

/// Transliterate Russian text to Latin, leaving other characters untouched
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match transliterate_char(c) {
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
    out
}

/// Build a URL slug from a note title.
///
/// The result only contains `[a-z0-9_-]`, never starts or ends with a
/// hyphen and is at most `NOTE_SLUG_MAX_LEN` characters long. It may be
/// empty when the title has nothing that can be transliterated.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase().replace('&', " and ");
    let joined = SEPARATORS.replace_all(&lowered, "-");

    let latin: String = transliterate(&joined)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    let slug = SEPARATORS.replace_all(&latin, "-");
    let trimmed: String = slug
        .trim_matches('-')
        .chars()
        .take(NOTE_SLUG_MAX_LEN)
        .collect();

    trimmed.trim_end_matches('-').to_string()
}
