//! Identifier case conversion.
//!
//! IDL names arrive in a mix of `camelCase`, `PascalCase` and `snake_case`.
//! Every conversion here first splits the identifier into words by scanning
//! character classes, then re-joins them:
//! - separators (`_`, `-`, whitespace, any other non-alphanumeric) end a word
//! - a lower-case letter or digit followed by an upper-case letter starts a word
//! - an upper-case run followed by a lower-case letter starts a word at the
//!   last upper-case letter (`HTTPServer` -> `HTTP`, `Server`)
//! - digits stay attached to the word they follow (`initializeV2` -> `initialize`, `V2`)

/// Split an identifier into words.
pub fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// `setAuthority` -> `set_authority`.
pub fn snake_case(input: &str) -> String {
    split_words(input)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `set_authority` -> `setAuthority`.
pub fn camel_case(input: &str) -> String {
    let mut out = String::new();
    for (i, w) in split_words(input).iter().enumerate() {
        if i == 0 {
            out.push_str(&w.to_lowercase());
        } else {
            out.push_str(&capitalize(w));
        }
    }
    out
}

/// `set_authority` -> `SetAuthority`.
pub fn upper_camel_case(input: &str) -> String {
    split_words(input).iter().map(|w| capitalize(w)).collect()
}

/// `systemProgram` -> `System Program`.
pub fn title_words(input: &str) -> String {
    split_words(input)
        .iter()
        .map(|w| capitalize(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compare two identifiers ignoring case style.
pub fn same_ident(a: &str, b: &str) -> bool {
    a == b || camel_case(a) == camel_case(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_mixed_identifiers() {
        assert_eq!(split_words("systemProgram"), vec!["system", "Program"]);
        assert_eq!(split_words("system_program"), vec!["system", "program"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(split_words("initializeV2"), vec!["initialize", "V2"]);
        assert_eq!(split_words("__a--b  c"), vec!["a", "b", "c"]);
        assert!(split_words("").is_empty());
    }

    #[test]
    fn snake_and_camel() {
        assert_eq!(snake_case("setAuthority"), "set_authority");
        assert_eq!(snake_case("initializeV2"), "initialize_v2");
        assert_eq!(snake_case("initialize"), "initialize");
        assert_eq!(camel_case("set_authority"), "setAuthority");
        assert_eq!(camel_case("SetAuthority"), "setAuthority");
        assert_eq!(camel_case("setAuthority"), "setAuthority");
    }

    #[test]
    fn upper_camel_and_title() {
        assert_eq!(upper_camel_case("running"), "Running");
        assert_eq!(upper_camel_case("in_progress"), "InProgress");
        assert_eq!(title_words("systemProgram"), "System Program");
        assert_eq!(title_words("owner"), "Owner");
        assert_eq!(title_words("token_program"), "Token Program");
    }

    #[test]
    fn ident_comparison_ignores_style() {
        assert!(same_ident("set_authority", "setAuthority"));
        assert!(!same_ident("setAuthority", "setOwner"));
    }
}
