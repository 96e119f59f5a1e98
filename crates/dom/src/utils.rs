//! Utility functions for DOM processing

/// Convert a dataset key to its attribute name (`fooBar` → `data-foo-bar`)
pub fn dataset_attribute_name(key: &str) -> String {
    let mut name = String::with_capacity(key.len() + 6);
    name.push_str("data-");
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

/// Convert an attribute name to its dataset key (`data-foo-bar` → `fooBar`)
pub fn dataset_key(attribute: &str) -> Option<String> {
    let rest = attribute.strip_prefix("data-")?;
    let mut key = String::with_capacity(rest.len());
    let mut upper_next = false;
    for c in rest.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next && c.is_ascii_lowercase() {
            key.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            if upper_next {
                key.push('-');
            }
            key.push(c);
            upper_next = false;
        }
    }
    Some(key)
}

/// Collapse runs of ASCII whitespace and trim (used for `<option>` labels)
pub fn collapse_whitespace(text: &str) -> String {
    text.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format a pixel length the way hosts print them (`12px`, `12.5px`)
pub fn px(value: f64) -> String {
    format!("{}px", value)
}
