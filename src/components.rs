// src/components.rs

use crate::config::ComponentPolicy;
use crate::error::{PcaError, Result};
use log::debug;

/// Parses a user-supplied component count and checks it against `1..=max_components`.
///
/// # Examples
///
/// ```
/// use pca_workbench::{component_count_prompt_validate, PcaError};
///
/// assert_eq!(component_count_prompt_validate("3", 5).unwrap(), 3);
/// assert!(matches!(component_count_prompt_validate("0", 5), Err(PcaError::OutOfRange { .. })));
/// assert!(matches!(component_count_prompt_validate("abc", 5), Err(PcaError::NotAnInteger { .. })));
/// ```
pub fn component_count_prompt_validate(input_text: &str, max_components: usize) -> Result<usize> {
    let trimmed = input_text.trim();
    let value: i64 = trimmed.parse().map_err(|_| PcaError::NotAnInteger {
        input: input_text.to_string(),
    })?;
    check_range(value, max_components)
}

fn check_range(value: i64, max_components: usize) -> Result<usize> {
    if value < 1 || value as u64 > max_components as u64 {
        return Err(PcaError::OutOfRange {
            value,
            max: max_components,
        });
    }
    Ok(value as usize)
}

/// Decides how many components a run keeps.
///
/// `prompt` is only called under [`ComponentPolicy::Prompted`]; it receives the
/// maximum and returns the user's text, or `None` if they cancelled, in which
/// case this returns `Ok(None)`.
pub fn resolve_component_count<F>(
    policy: ComponentPolicy,
    max_components: usize,
    prompt: F,
) -> Result<Option<usize>>
where
    F: FnOnce(usize) -> Option<String>,
{
    match policy {
        ComponentPolicy::Fixed { components } => {
            let value = i64::try_from(components).unwrap_or(i64::MAX);
            check_range(value, max_components).map(Some)
        }
        ComponentPolicy::Prompted => match prompt(max_components) {
            Some(text) => component_count_prompt_validate(&text, max_components).map(Some),
            None => {
                debug!("Component count prompt cancelled");
                Ok(None)
            }
        },
    }
}
