//! Canonical collection naming.

/// Convert an agent name to the snake-case form used for collection names.
///
/// Spaces are dropped. An uppercase character gets an underscore before it
/// when the previous character is lowercase, and another when the next
/// character is lowercase, so `MyAgent` becomes `my__agent`. Leading and
/// trailing underscores are stripped.
pub fn camel_to_snake(value: &str) -> String {
    let chars: Vec<char> = value.chars().filter(|c| *c != ' ').collect();
    let mut snake = String::with_capacity(chars.len() + 4);
    for (idx, ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            if idx != 0 && chars[idx - 1].is_lowercase() {
                snake.push('_');
            }
            if idx != chars.len() - 1 && chars[idx + 1].is_lowercase() {
                snake.push('_');
            }
        }
        snake.extend(ch.to_lowercase());
    }
    snake.trim_matches('_').to_string()
}

/// Collection name for an agent partition; partition 0 has no suffix.
pub fn collection_name(agent_name: &str, collection_number: u32) -> String {
    let base = camel_to_snake(agent_name);
    if collection_number > 0 {
        format!("{base}_{collection_number}")
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn converts_agent_names() {
        assert_eq!(camel_to_snake("AGiXT"), "a_gi_xt");
        assert_eq!(camel_to_snake("HTTPServer"), "http_server");
        assert_eq!(camel_to_snake("MyAgent"), "my__agent");
        assert_eq!(camel_to_snake("agent"), "agent");
        assert_eq!(camel_to_snake("Open Assistant"), "open__assistant");
        assert_eq!(camel_to_snake(""), "");
    }

    #[test]
    fn keeps_other_characters() {
        assert_eq!(camel_to_snake("gpt-4"), "gpt-4");
        assert_eq!(camel_to_snake("_x_"), "x");
    }

    #[test]
    fn suffixes_partition_numbers() {
        assert_eq!(collection_name("AGiXT", 0), "a_gi_xt");
        assert_eq!(collection_name("AGiXT", 3), "a_gi_xt_3");
    }
}
