//! File name sanitization for download destinations.

const NAME_MAX: usize = 255;

/// Makes `name` safe as a single path component: separators, NUL and control
/// characters become `_`, runs of `_` collapse, surrounding dots and spaces
/// are trimmed, and the result is capped at 255 bytes.
pub fn sanitize_file_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let bad = matches!(c, '/' | '\\' | '\0') || c.is_control();
        if bad || c == ' ' {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_and_spaces() {
        assert_eq!(sanitize_file_name("a/b\\c d.txt"), "a_b_c_d.txt");
    }

    #[test]
    fn dots_and_control_chars() {
        assert_eq!(sanitize_file_name("..hidden\x07.txt.."), "hidden_.txt");
        assert_eq!(sanitize_file_name(".."), "");
    }

    #[test]
    fn length_is_capped_on_char_boundary() {
        let long = "é".repeat(200);
        let s = sanitize_file_name(&long);
        assert!(s.len() <= NAME_MAX);
        assert!(s.chars().all(|c| c == 'é'));
    }
}
