use serde::Deserialize;

/// A JSON chat component, as servers send in chat and disconnect payloads.
///
/// Only the pieces needed to flatten a message to plain text are modeled;
/// formatting keys are ignored during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChatComponent {
    pub text: String,
    pub translate: String,
    pub with: Vec<ChatPart>,
    pub extra: Vec<ChatPart>,
}

/// Entries of `with` and `extra` arrays may be bare strings or nested
/// components.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChatPart {
    Text(String),
    Component(ChatComponent),
}

impl ChatComponent {
    pub fn from_json(json: &str) -> Result<ChatComponent, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Flatten the component tree into its visible text.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for part in &self.with {
            part.collect_text(out);
        }
        for part in &self.extra {
            part.collect_text(out);
        }
    }
}

impl ChatPart {
    fn collect_text(&self, out: &mut String) {
        match self {
            ChatPart::Text(text) => out.push_str(text),
            ChatPart::Component(component) => component.collect_text(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_component() {
        let component = ChatComponent::from_json(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(component.plain_text(), "hello");
    }

    #[test]
    fn test_extra_concatenates_in_order() {
        let component = ChatComponent::from_json(
            r#"{"text":"<","extra":[{"text":"Steve"},"> ",{"text":"hi"}]}"#,
        )
        .unwrap();
        assert_eq!(component.plain_text(), "<Steve> hi");
    }

    #[test]
    fn test_with_accepts_bare_strings_and_components() {
        let component = ChatComponent::from_json(
            r#"{"translate":"chat.type.text","with":["Steve",{"text":"hello"}]}"#,
        )
        .unwrap();
        assert_eq!(component.plain_text(), "Stevehello");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let component =
            ChatComponent::from_json(r#"{"text":"ok","color":"red","bold":true}"#).unwrap();
        assert_eq!(component.plain_text(), "ok");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(ChatComponent::from_json("not json").is_err());
    }
}
