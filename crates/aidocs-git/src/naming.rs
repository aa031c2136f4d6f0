//! Doc branch naming
//!
//! Renders the branch-name template and checks the result against git's
//! ref-format rules, so a bad template fails before any git command runs.

use crate::{Error, Result};

/// Placeholder substituted with the user name in branch templates.
pub const USER_NAME_PLACEHOLDER: &str = "{userName}";

/// Characters git refuses anywhere in a ref name.
const FORBIDDEN: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];

/// Make a user name safe to embed in a ref.
///
/// Whitespace, control characters, `/`, `{` and the characters git forbids
/// are replaced with `-`; runs of `-` collapse and leading/trailing `-` and
/// `.` are trimmed. `alice` is returned unchanged.
pub fn sanitize_ref_component(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut last_was_dash = true; // Start true to skip leading dashes

    for c in name.trim().chars() {
        let unsafe_char =
            c.is_whitespace() || c.is_control() || c == '/' || c == '{' || FORBIDDEN.contains(&c);
        if unsafe_char || c == '-' {
            if !last_was_dash {
                result.push('-');
                last_was_dash = true;
            }
        } else {
            result.push(c);
            last_was_dash = false;
        }
    }

    let mut cleaned = result.trim_matches(|c| c == '-' || c == '.').to_string();
    while cleaned.contains("..") {
        cleaned = cleaned.replace("..", ".");
    }
    if let Some(stem) = cleaned.strip_suffix(".lock") {
        cleaned = format!("{stem}-lock");
    }
    cleaned
}

/// Substitute the user name into a branch template.
pub fn render_branch_name(template: &str, user_name: &str) -> String {
    template.replace(USER_NAME_PLACEHOLDER, &sanitize_ref_component(user_name))
}

/// Validate a branch name using the rules of `git check-ref-format --branch`.
pub fn validate_branch_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(Error::InvalidBranchName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return invalid("name is empty");
    }
    if name == "@" {
        return invalid("'@' is reserved");
    }
    if name.starts_with('-') {
        return invalid("cannot start with '-'");
    }
    if name.ends_with('/') || name.ends_with('.') {
        return invalid("cannot end with '/' or '.'");
    }
    if name.contains("..") {
        return invalid("cannot contain '..'");
    }
    if name.contains("@{") {
        return invalid("cannot contain '@{'");
    }
    if name.contains("//") || name.starts_with('/') {
        return invalid("cannot contain empty path components");
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_control() || FORBIDDEN.contains(c))
    {
        return invalid(&format!("contains forbidden character {c:?}"));
    }
    if name
        .split('/')
        .any(|component| component.starts_with('.') || component.ends_with(".lock"))
    {
        return invalid("path components cannot start with '.' or end with '.lock'");
    }
    if name.contains(USER_NAME_PLACEHOLDER) {
        return invalid("template placeholder was not substituted");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_render_default_template() {
        assert_eq!(render_branch_name("@doc/{userName}", "alice"), "@doc/alice");
    }

    #[rstest]
    #[case("alice", "alice")]
    #[case("Alice Smith", "Alice-Smith")]
    #[case("  bob  ", "bob")]
    #[case("a/b", "a-b")]
    #[case("x~y^z:w", "x-y-z-w")]
    #[case("..hidden..", "hidden")]
    #[case("a..b", "a.b")]
    #[case("a...b", "a.b")]
    #[case("name.lock", "name-lock")]
    #[case("x@{1}", "x@-1}")]
    fn test_sanitize_ref_component(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_ref_component(input), expected);
    }

    #[rstest]
    #[case("@doc/alice")]
    #[case("@ai-docs/Alice-Smith")]
    #[case("docs/user.name")]
    fn test_valid_names(#[case] name: &str) {
        assert!(validate_branch_name(name).is_ok(), "{name} should be valid");
    }

    #[rstest]
    #[case("")]
    #[case("@")]
    #[case("-doc")]
    #[case("doc/")]
    #[case("doc.")]
    #[case("doc..x")]
    #[case("doc@{1}")]
    #[case("doc//x")]
    #[case("doc x")]
    #[case("doc/.hidden")]
    #[case("doc/x.lock")]
    #[case("doc/{userName}")]
    fn test_invalid_names(#[case] name: &str) {
        assert!(validate_branch_name(name).is_err(), "{name} should be invalid");
    }

    proptest::proptest! {
        #[test]
        fn prop_sanitized_name_fits_template(name in "\\PC{0,24}") {
            let component = sanitize_ref_component(&name);
            if !component.is_empty() {
                let branch = render_branch_name("@doc/{userName}", &name);
                proptest::prop_assert!(validate_branch_name(&branch).is_ok(), "{branch}");
            }
        }
    }
}
