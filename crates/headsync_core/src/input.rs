//! Events and actions delivered by the host editor.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Small macro for defining an Enum with `variants()` method.
macro_rules! event_enum_with_variants {
    (
      $enum_name:ident {
        $( $variant:ident, )*
      }
    ) => {
          #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
          pub enum $enum_name {
              $( $variant, )*
          }

          impl $enum_name {
              /// Returns the list of all variants in string literal.
              pub fn variants() -> &'static [&'static str] {
                  &[ $( stringify!($variant), )* ]
              }

              pub fn parse(autocmd: &str) -> Option<Self> {
                  match autocmd {
                      $( stringify!($variant) => Some(Self::$variant), )*
                      _ => None
                  }
              }
          }
    };
}

event_enum_with_variants!(AutocmdEventType {
    BufEnter,
    BufWritePost,
});

/// An autocmd event together with its params, `[document_path]`.
pub type AutocmdEvent = (AutocmdEventType, Params);

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("invalid params: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("document path not found in params")]
    MissingDocumentPath,
}

/// Request parameters.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[serde(untagged)]
pub enum Params {
    /// No parameters
    None,
    /// Array of values
    Array(Vec<Value>),
    /// Map of values
    Map(serde_json::Map<String, Value>),
}

impl Params {
    /// Parse incoming `Params` into expected types.
    pub fn parse<D>(self) -> Result<D, InputError>
    where
        D: DeserializeOwned,
    {
        let value: Value = self.into();
        Ok(serde_json::value::from_value(value)?)
    }

    /// Parse autocmd event params, which is `[document_path]`.
    pub fn parse_document_path(self) -> Result<PathBuf, InputError> {
        let params: Vec<PathBuf> = self.parse()?;
        params
            .into_iter()
            .next()
            .ok_or(InputError::MissingDocumentPath)
    }
}

impl From<Params> for Value {
    fn from(params: Params) -> Value {
        match params {
            Params::Array(vec) => Value::Array(vec),
            Params::Map(map) => Value::Object(map),
            Params::None => Value::Null,
        }
    }
}

/// An action initiated by the user, e.g. the manual sync command.
#[derive(Debug, Clone)]
pub struct PluginAction {
    pub method: String,
    pub params: Params,
}

#[derive(Debug, Clone)]
pub enum PluginEvent {
    Autocmd(AutocmdEvent),
    Action(PluginAction),
}

impl PluginEvent {
    /// Autocmds may arrive in rapid bursts and are debounced; user actions
    /// are processed immediately.
    pub fn should_debounce(&self) -> bool {
        matches!(self, Self::Autocmd(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn autocmd_event_type_parses_known_variants() {
        assert_eq!(
            AutocmdEventType::parse("BufWritePost"),
            Some(AutocmdEventType::BufWritePost)
        );
        assert_eq!(AutocmdEventType::parse("BufEnter"), Some(AutocmdEventType::BufEnter));
        assert_eq!(AutocmdEventType::parse("CursorMoved"), None);
        assert_eq!(AutocmdEventType::variants(), ["BufEnter", "BufWritePost"]);
    }

    #[test]
    fn params_parse_document_path() {
        let params = Params::Array(vec![json!("notes/todo.md")]);
        assert_eq!(
            params.parse_document_path().unwrap(),
            PathBuf::from("notes/todo.md")
        );

        let empty = Params::Array(Vec::new());
        assert!(matches!(
            empty.parse_document_path(),
            Err(InputError::MissingDocumentPath)
        ));
    }
}
