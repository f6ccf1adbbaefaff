//! Pure formatting functions for UI output.

use console::style;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a warning message in yellow.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Escape workflow command data (`%`, CR, LF)
pub fn escape_data(text: &str) -> String {
    text.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command property value; also escapes `:` and `,`
pub fn escape_property(text: &str) -> String {
    escape_data(text).replace(':', "%3A").replace(',', "%2C")
}

/// `::level title=...::message`
pub fn workflow_command(level: &str, title: &str, message: &str) -> String {
    format!(
        "::{} title={}::{}",
        level,
        escape_property(title),
        escape_data(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_command_escaping() {
        assert_eq!(
            workflow_command("notice", "Release PR created", "Opened #3"),
            "::notice title=Release PR created::Opened #3"
        );
        assert_eq!(
            workflow_command("error", "a: b, c", "100%\nline two\r"),
            "::error title=a%3A b%2C c::100%25%0Aline two%0D"
        );
    }

    #[test]
    fn test_display_functions_print() {
        display_error("test error");
        display_warning("test warning");
        display_success("test success");
        display_status("test status");
    }
}
