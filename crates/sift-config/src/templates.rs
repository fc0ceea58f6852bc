//! Configuration template for `sift init`.

/// Local configuration template (valid TOML).
const TEMPLATE: &str = include_str!("../templates/config.toml");

/// Returns the configuration template with every setting commented out.
///
/// Lines that are already comments are preserved as-is. Non-comment, non-empty
/// lines get a "# " prefix. Empty lines are preserved.
pub fn config_template() -> String {
    let mut result = String::with_capacity(TEMPLATE.len() + TEMPLATE.lines().count() * 2);
    for line in TEMPLATE.lines() {
        if !line.is_empty() && !line.starts_with('#') {
            result.push_str("# ");
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}
