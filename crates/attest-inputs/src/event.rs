use crate::priority;
use attest_types::SourceLocation;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Create,
    Set,
    Fetch,
}

impl EventAction {
    pub fn as_str(self) -> &'static str {
        match self {
            EventAction::Create => "create",
            EventAction::Set => "set",
            EventAction::Fetch => "fetch",
        }
    }
}

/// One entry of an input's audit log.
///
/// `value` distinguishes "no value" (`None`) from an explicit null (`Some(Value::Null)`).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    pub action: EventAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    /// Fetch events only: whether the lookup found a value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit: Option<bool>,
    /// Arrival order within the owning input, assigned on append.
    pub sequence: u64,
}

impl Event {
    fn new(action: EventAction) -> Self {
        Self {
            action,
            value: None,
            priority: None,
            provider: None,
            location: None,
            hit: None,
            sequence: 0,
        }
    }

    pub fn create() -> Self {
        Self::new(EventAction::Create)
    }

    pub fn set(value: Value, priority: i32) -> Self {
        Self {
            value: Some(value),
            priority: Some(priority),
            ..Self::new(EventAction::Set)
        }
    }

    pub fn fetch(hit: bool) -> Self {
        Self {
            hit: Some(hit),
            ..Self::new(EventAction::Fetch)
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub(crate) fn effective_priority(&self) -> i32 {
        self.priority.unwrap_or(priority::UNSPECIFIED)
    }

    /// `  action: 'set', value: '42', priority: '25', provider: 'x', file: 'a.rs', line: '3'`
    pub(crate) fn diagnostic_line(&self) -> String {
        let mut fields: Vec<(&str, String)> = vec![("action", self.action.as_str().to_string())];
        if let Some(v) = &self.value {
            let text = match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            fields.push(("value", text));
        }
        if let Some(p) = self.priority {
            fields.push(("priority", p.to_string()));
        }
        if let Some(p) = &self.provider {
            fields.push(("provider", p.clone()));
        }
        if let Some(h) = self.hit {
            fields.push(("hit", h.to_string()));
        }
        if let Some(loc) = &self.location {
            fields.push(("file", loc.path.to_string()));
            fields.push(("line", loc.line.to_string()));
        }

        let rendered: Vec<String> =
            fields.iter().map(|(key, value)| format!("{key}: '{value}'")).collect();
        format!("  {}", rendered.join(", "))
    }
}
