//! Naming rules between model names and the table keys used in URLs.

/// Table key for a model: the model name with its first character lower-cased.
/// e.g. "UserProfile" -> "userProfile", "post" -> "post"
pub fn database_name(model: &str) -> String {
    let mut chars = model.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::database_name;

    #[test]
    fn lowers_only_the_first_character() {
        assert_eq!(database_name("TestDatabase"), "testDatabase");
        assert_eq!(database_name("User"), "user");
        assert_eq!(database_name("user_profile"), "user_profile");
        assert_eq!(database_name("URLMap"), "uRLMap");
        assert_eq!(database_name(""), "");
    }
}
