use std::borrow::Cow;

/// Returns a lowercase representation, reusing the original string if already lowercase.
pub fn lowercase(input: &str) -> Cow<'_, str> {
    if input.chars().all(|ch| !ch.is_uppercase()) {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(input.to_lowercase())
    }
}

pub fn trim(input: &str) -> Cow<'_, str> {
    Cow::Borrowed(input.trim())
}

// A word starts at any letter that follows a non-letter: `o'neil` -> `O'Neil`.
pub fn title_case(input: &str) -> Cow<'_, str> {
    let mut output = String::with_capacity(input.len());
    let mut in_word = false;
    for ch in input.chars() {
        if ch.is_alphabetic() {
            if in_word {
                output.extend(ch.to_lowercase());
            } else {
                output.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            output.push(ch);
            in_word = false;
        }
    }
    if output == input {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("john SMITH"), "John Smith");
        assert_eq!(title_case("o'neil"), "O'Neil");
        assert_eq!(title_case("north-east"), "North-East");
        assert!(matches!(title_case("East"), Cow::Borrowed(_)));
    }

    #[test]
    fn lowercase_borrows_when_unchanged() {
        assert!(matches!(lowercase("email"), Cow::Borrowed(_)));
        assert_eq!(lowercase("EMAIL"), "email");
    }

    #[test]
    fn trim_strips_padding() {
        assert_eq!(trim("  West "), "West");
    }
}
