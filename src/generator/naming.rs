//! Naming conventions for generated TypeScript.

/// Split `s` into words at `-`, `_` and lower-to-upper humps, lower-case
/// each word and upper-case the first letter of every word after the first.
///
/// `"FIRST_NAME"` becomes `"firstName"`, `"kebab-case"` becomes `"kebabCase"`.
/// A separator that follows a non-alphanumeric character is kept, so the
/// result always maps to itself.
pub fn camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for (index, word) in words(s).iter().enumerate() {
        let word = word.to_lowercase();
        if index == 0 {
            result.push_str(&word);
            continue;
        }
        if !result.ends_with(|c: char| c.is_ascii_alphanumeric()) {
            result.push('_');
            result.push_str(&word);
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.push(first.to_ascii_uppercase());
            result.push_str(chars.as_str());
        }
    }

    result
}

fn words(s: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start = None;
    let mut prev: Option<char> = None;

    for (i, c) in s.char_indices() {
        if matches!(c, '-' | '_') {
            if let Some(begin) = start.take() {
                words.push(&s[begin..i]);
            }
            prev = None;
            continue;
        }
        let hump = c.is_ascii_uppercase()
            && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
        if hump {
            if let Some(begin) = start.take() {
                words.push(&s[begin..i]);
            }
        }
        start.get_or_insert(i);
        prev = Some(c);
    }
    if let Some(begin) = start {
        words.push(&s[begin..]);
    }

    words
}

/// [`camel_case`] with the first character upper-cased.
pub fn pascal_case(s: &str) -> String {
    let camel = camel_case(s);
    let mut chars = camel.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => c.to_ascii_uppercase().to_string() + chars.as_str(),
        _ => camel,
    }
}

/// Whether `s` can be written as a bare TypeScript identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Render `name` as an object property key, quoting it when needed.
pub fn property_name(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}

/// Force `name` into a valid type identifier.
pub fn type_identifier(name: &str) -> String {
    let mut result: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if result.is_empty() || result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("snake_case"), "snakeCase");
        assert_eq!(camel_case("kebab-case"), "kebabCase");
        assert_eq!(camel_case("FIRST_NAME"), "firstName");
        assert_eq!(camel_case("DUMMY"), "dummy");
        assert_eq!(camel_case("address_line_2"), "addressLine2");
        assert_eq!(camel_case("EMP_2_ID"), "emp2Id");
        assert_eq!(camel_case("V$SESSION"), "v$session");
        assert_eq!(camel_case("ORDER#_ID"), "order#_id");
        assert_eq!(camel_case("a__b"), "aB");
        assert_eq!(camel_case("trailing_"), "trailing");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn test_camel_case_is_idempotent() {
        let inputs = [
            "snake_case",
            "kebab-case",
            "FIRST_NAME",
            "EMP_2_ID",
            "V$SESSION",
            "ORDER#_ID",
            "1_B",
            "__x",
            "a__b",
            "snakeCase",
        ];
        for input in inputs {
            let once = camel_case(input);
            assert_eq!(camel_case(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("snake_case"), "SnakeCase");
        assert_eq!(pascal_case("kebab-case"), "KebabCase");
        assert_eq!(pascal_case("DUAL"), "Dual");
        assert_eq!(pascal_case("2fa_codes"), "2faCodes");
        assert_eq!(pascal_case(""), "");
    }

    #[test]
    fn test_property_name() {
        assert_eq!(property_name("dummy"), "dummy");
        assert_eq!(property_name("$rowid"), "$rowid");
        assert_eq!(property_name("ORDER#"), "'ORDER#'");
        assert_eq!(property_name("1st"), "'1st'");
        assert_eq!(property_name("it's"), "'it\\'s'");
    }

    #[test]
    fn test_type_identifier() {
        assert_eq!(type_identifier("Dual"), "Dual");
        assert_eq!(type_identifier("Bin#x"), "Bin_x");
        assert_eq!(type_identifier("2faCodes"), "_2faCodes");
    }
}
