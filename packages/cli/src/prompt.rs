use std::io::{self, BufRead, Write};

/// Ask a yes/no question; anything but an explicit yes is a no
pub fn confirm(question: &str, input: &mut dyn BufRead, out: &mut dyn Write) -> io::Result<bool> {
    write!(out, "{} [y/N] ", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes" | "s" | "sim"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(answer: &str) -> bool {
        let mut out = Vec::new();
        confirm("Delete?", &mut Cursor::new(answer), &mut out).unwrap()
    }

    #[test]
    fn test_confirm_answers() {
        assert!(ask("y\n"));
        assert!(ask("YES\n"));
        assert!(ask("sim\n"));
        assert!(!ask("n\n"));
        assert!(!ask("\n"));
        assert!(!ask(""));
    }
}
