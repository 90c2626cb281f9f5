//! Parsing of list-encoded categorical cells
//!
//! Cells come in two shapes: a bracketed list literal such as
//! `['Action', 'Slice of Life']`, or a bare comma-separated string such as
//! `Action, Comedy`. Anything that cannot be tokenized yields an empty list.

/// Parse one cell into its ordered, trimmed tokens.
///
/// Missing, empty and malformed cells all produce an empty vector.
pub fn parse_list(cell: Option<&str>) -> Vec<String> {
    let Some(raw) = cell else {
        return Vec::new();
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let inner = match (trimmed.starts_with('['), trimmed.ends_with(']')) {
        (true, true) if trimmed.len() >= 2 => &trimmed[1..trimmed.len() - 1],
        (false, false) => trimmed,
        _ => return Vec::new(),
    };

    tokenize(inner).unwrap_or_default()
}

fn tokenize(input: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_whitespace()) {
            chars.next();
        }
        let Some(&first) = chars.peek() else {
            break;
        };

        if first == '\'' || first == '"' {
            chars.next();
            let mut token = String::new();
            let mut closed = false;
            while let Some(c) = chars.next() {
                match c {
                    '\\' => token.push(chars.next()?),
                    c if c == first => {
                        closed = true;
                        break;
                    }
                    c => token.push(c),
                }
            }
            if !closed {
                return None;
            }
            push_token(&mut tokens, &token);

            while chars.peek().is_some_and(|c| c.is_whitespace()) {
                chars.next();
            }
            match chars.next() {
                None => break,
                Some(',') => continue,
                Some(_) => return None,
            }
        } else {
            let mut token = String::new();
            let mut hit_comma = false;
            for c in chars.by_ref() {
                if c == ',' {
                    hit_comma = true;
                    break;
                }
                token.push(c);
            }
            push_token(&mut tokens, &token);
            if !hit_comma {
                break;
            }
        }
    }

    Some(tokens)
}

fn push_token(tokens: &mut Vec<String>, token: &str) {
    let token = token.trim();
    if !token.is_empty() {
        tokens.push(token.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_and_empty() {
        assert!(parse_list(None).is_empty());
        assert!(parse_list(Some("")).is_empty());
        assert!(parse_list(Some("   ")).is_empty());
        assert!(parse_list(Some("[]")).is_empty());
    }

    #[test]
    fn test_bare_comma_separated() {
        assert_eq!(parse_list(Some("Action, Comedy")), vec!["Action", "Comedy"]);
        assert_eq!(parse_list(Some("Action")), vec!["Action"]);
        assert_eq!(parse_list(Some(" Drama ,, Romance, ")), vec!["Drama", "Romance"]);
    }

    #[test]
    fn test_list_literal() {
        assert_eq!(
            parse_list(Some("['Action', 'Slice of Life']")),
            vec!["Action", "Slice of Life"]
        );
        assert_eq!(
            parse_list(Some(r#"["Boys Love", "Sci-Fi"]"#)),
            vec!["Boys Love", "Sci-Fi"]
        );
    }

    #[test]
    fn test_quoted_comma_and_escape() {
        assert_eq!(
            parse_list(Some("['Young Jump, Weekly', 'Shounen']")),
            vec!["Young Jump, Weekly", "Shounen"]
        );
        assert_eq!(parse_list(Some(r"['Bird\'s Eye']")), vec!["Bird's Eye"]);
    }

    #[test]
    fn test_unbracketed_list_contents() {
        assert_eq!(parse_list(Some("'Action', 'Comedy'")), vec!["Action", "Comedy"]);
    }

    #[test]
    fn test_malformed_degrades_to_empty() {
        assert!(parse_list(Some("['Action', 'Comedy'")).is_empty());
        assert!(parse_list(Some("Action]")).is_empty());
        assert!(parse_list(Some("['Action")).is_empty());
        assert!(parse_list(Some("['Action' 'Comedy']")).is_empty());
    }

    #[test]
    fn test_preserves_order_and_duplicates() {
        assert_eq!(
            parse_list(Some("Comedy, Action, Comedy")),
            vec!["Comedy", "Action", "Comedy"]
        );
    }
}
