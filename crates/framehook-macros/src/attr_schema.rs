//! Attribute schemas for `#[derive(Instance)]`.
//!
//! Defines which keys each field attribute accepts, enabling compile-time
//! validation and helpful error messages.

/// A key accepted inside a field attribute, e.g. `name` in
/// `#[event(name = "Touched")]`. Every key is optional.
#[derive(Debug, Clone, Copy)]
pub struct AttrKey {
    /// The key name.
    pub name: &'static str,
}

impl AttrKey {
    const fn new(name: &'static str) -> Self {
        Self { name }
    }
}

/// Keys accepted by `#[event(...)]`.
static EVENT_KEYS: &[AttrKey] = &[AttrKey::new("name")];

/// Keys accepted by `#[instance_id]`.
static INSTANCE_ID_KEYS: &[AttrKey] = &[];

/// Get the keys an attribute accepts, or `None` if the attribute is not ours.
pub fn get_valid_keys(attr: &str) -> Option<&'static [AttrKey]> {
    match attr {
        "event" => Some(EVENT_KEYS),
        "instance_id" => Some(INSTANCE_ID_KEYS),
        _ => None,
    }
}

/// Check if a key is valid for an attribute.
pub fn is_valid_key(attr: &str, key: &str) -> bool {
    get_valid_keys(attr).is_some_and(|keys| keys.iter().any(|k| k.name == key))
}

/// Get all key names an attribute accepts.
pub fn get_key_names(attr: &str) -> Vec<&'static str> {
    get_valid_keys(attr)
        .map(|keys| keys.iter().map(|k| k.name).collect())
        .unwrap_or_default()
}

/// The event name used when `#[event]` has no `name = "..."`: the field
/// name in PascalCase, so `mouse_button1_down` becomes `MouseButton1Down`.
pub fn default_event_name(field: &str) -> String {
    let field = field.strip_prefix("r#").unwrap_or(field);
    let mut name = String::with_capacity(field.len());
    let mut upper_next = true;

    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            name.extend(c.to_uppercase());
            upper_next = false;
        } else {
            name.push(c);
        }
    }

    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_keys() {
        assert!(is_valid_key("event", "name"));
        assert!(!is_valid_key("event", "nmae"));
        assert!(!is_valid_key("instance_id", "name"));
        assert_eq!(get_key_names("event"), vec!["name"]);
        assert!(get_key_names("serde").is_empty());
        assert!(get_valid_keys("serde").is_none());
    }

    #[test]
    fn test_default_event_name() {
        assert_eq!(default_event_name("touched"), "Touched");
        assert_eq!(default_event_name("mouse_button1_down"), "MouseButton1Down");
        assert_eq!(default_event_name("_changed"), "Changed");
        assert_eq!(default_event_name("r#type"), "Type");
        assert_eq!(default_event_name("Already"), "Already");
    }
}
