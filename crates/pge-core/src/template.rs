//! `{{ name }}` placeholder rendering for bundled project templates

use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder pattern is valid"));

/// Replace every `{{ name }}` in `template` with its value from `values`
///
/// # Errors
/// Returns [`CoreError::Template`] naming the first placeholder without a value
pub fn render(template: &str, values: &[(&str, &str)]) -> CoreResult<String> {
    let mut missing: Option<String> = None;
    let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let name = &caps[1];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => (*value).to_string(),
            None => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(CoreError::Template(name)),
        None => Ok(rendered.into_owned()),
    }
}
