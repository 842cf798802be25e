//! Text rendering for human-friendly resolver errors.
//!
//! Helpers to format resolution chains, shorten fully qualified type
//! names, and produce "did you mean?" suggestions in error output.

/// Renders a resolution chain as a single readable line.
///
/// # Examples
/// ```
/// use wasit_support::rendering::render_chain;
///
/// let chain = vec!["UserService", "UserRepo", "Database", "UserService"];
/// assert_eq!(render_chain(&chain), "UserService → UserRepo → Database → UserService");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Shortens a fully qualified type name for display.
///
/// Keeps only the last segment of every path component, so generic
/// arguments stay readable:
///
/// ```
/// use wasit_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("my_app::services::user::UserService"), "UserService");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>"),
///     "Arc<dyn Logger>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                // path prefix ends here, drop it
                segment.clear();
            }
            '<' | '>' | ',' | ' ' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Generates "did you mean?" suggestions for an unregistered key.
///
/// Compares the requested name against the names that ARE registered
/// and returns the closest matches, best first.
pub fn suggest_similar(
    requested: &str,
    available: &[&str],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let requested_short = shorten_type_name(requested).to_lowercase();

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter_map(|&name| {
            let name_lower = name.to_lowercase();
            let name_short = shorten_type_name(name).to_lowercase();

            // Substring match on the full name wins outright
            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            // Then a match on the shortened name
            if name_short.contains(&requested_short) || requested_short.contains(&name_short) {
                return Some((name, 80));
            }

            // Fall back to a common-prefix score
            let common = name_short
                .chars()
                .zip(requested_short.chars())
                .take_while(|(a, b)| a == b)
                .count();

            (common >= 3).then_some((name, common * 10))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_simple_chain() {
        assert_eq!(render_chain(&["A", "B", "C", "A"]), "A → B → C → A");
    }

    #[test]
    fn render_single_element_chain() {
        assert_eq!(render_chain(&["A"]), "A");
    }

    #[test]
    fn render_empty_chain() {
        let chain: Vec<&str> = vec![];
        assert_eq!(render_chain(&chain), "");
    }

    #[test]
    fn shorten_simple_path() {
        assert_eq!(
            shorten_type_name("my_app::services::UserService"),
            "UserService"
        );
    }

    #[test]
    fn shorten_with_generics() {
        assert_eq!(
            shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>"),
            "Arc<dyn Logger>"
        );
    }

    #[test]
    fn shorten_no_path() {
        assert_eq!(shorten_type_name("String"), "String");
    }

    #[test]
    fn suggest_similar_names() {
        let available = vec![
            "my_app::UserService",
            "my_app::UserRepository",
            "my_app::Logger",
            "my_app::Database",
        ];

        let suggestions = suggest_similar("UserServise", &available, 3);
        assert!(!suggestions.is_empty());
        assert!(suggestions[0].contains("UserService"));
    }

    #[test]
    fn suggest_no_match() {
        let available = vec!["my_app::Database"];
        assert!(suggest_similar("XyzAbcDef", &available, 3).is_empty());
    }

    #[test]
    fn suggest_respects_limit() {
        let available = vec!["app::CacheA", "app::CacheB", "app::CacheC"];
        assert_eq!(suggest_similar("Cache", &available, 2).len(), 2);
    }
}
