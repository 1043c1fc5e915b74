// Output comparison

/// Remove every whitespace character
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Pass when the normalized actual output ends with the normalized expected output.
/// Leading output from the submission itself is tolerated.
pub fn compare(actual: &str, expected: &str) -> bool {
    normalize(actual).ends_with(&normalize(expected))
}
