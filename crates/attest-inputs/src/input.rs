use crate::error::InputError;
use crate::event::{Event, EventAction};
use crate::kind::InputType;
use attest_types::SourceLocation;
use serde_json::Value;
use std::fmt;

/// Options accepted when an input is declared or referenced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputOptions {
    pub value: Option<Value>,
    pub input_type: Option<InputType>,
    pub required: bool,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub provider: Option<String>,
}

impl InputOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = Some(input_type);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }
}

/// Resolve an event log without an [`Input`]: the highest-priority set event wins,
/// and among equal priorities the later one.
pub fn resolve(events: &[Event]) -> Option<&Value> {
    let mut winner: Option<&Event> = None;
    for event in events.iter().filter(|e| e.action == EventAction::Set) {
        if winner.is_none_or(|w| event.effective_priority() >= w.effective_priority()) {
            winner = Some(event);
        }
    }
    winner.and_then(|e| e.value.as_ref())
}

#[derive(Clone, Debug)]
pub struct Input {
    name: String,
    input_type: Option<InputType>,
    required: bool,
    title: Option<String>,
    description: Option<String>,
    events: Vec<Event>,
    // index of the winning set event; kept current on every append
    winner: Option<usize>,
}

impl Input {
    /// Declare an input. The create event records the caller's location.
    #[track_caller]
    pub fn new(name: impl Into<String>, options: InputOptions) -> Result<Self, InputError> {
        let location = SourceLocation::caller();
        Self::new_at(name, options, Some(location))
    }

    /// Declare an input whose create event is attributed to `location`, if known.
    pub fn new_at(
        name: impl Into<String>,
        options: InputOptions,
        location: Option<SourceLocation>,
    ) -> Result<Self, InputError> {
        let mut input = Self {
            name: name.into(),
            input_type: None,
            required: false,
            title: None,
            description: None,
            events: Vec::new(),
            winner: None,
        };
        let mut create = Event::create();
        create.location = location.clone();
        create.provider = options.provider.clone();
        input.update(create)?;
        input.apply_options(options, location)?;
        Ok(input)
    }

    /// Merge declaration options into an existing input. A supplied value becomes a set event.
    ///
    /// Nothing is changed when the declaration is rejected: the supplied value must fit the
    /// effective type, and a newly declared type must fit whichever value would then win.
    pub(crate) fn apply_options(
        &mut self,
        options: InputOptions,
        location: Option<SourceLocation>,
    ) -> Result<(), InputError> {
        let input_type = options.input_type.or(self.input_type);
        let set = options.value.map(|value| {
            let mut set =
                Event::set(value, options.priority.unwrap_or(crate::priority::UNSPECIFIED));
            set.location = location;
            set.provider = options.provider;
            set
        });

        if let Some(t) = input_type {
            if let Some(v) = set.as_ref().and_then(|e| e.value.as_ref()) {
                self.check_type(t, v)?;
            }
            let new_wins = set.as_ref().is_some_and(|e| self.would_win(e));
            if options.input_type.is_some() && !new_wins {
                if let Some(current) = self.value() {
                    self.check_type(t, current)?;
                }
            }
        }

        self.input_type = input_type;
        self.required |= options.required;
        if options.title.is_some() {
            self.title = options.title;
        }
        if options.description.is_some() {
            self.description = options.description;
        }
        if let Some(set) = set {
            self.update(set)?;
        }
        Ok(())
    }

    fn check_type(&self, input_type: InputType, value: &Value) -> Result<(), InputError> {
        if input_type.accepts(value) {
            return Ok(());
        }
        Err(InputError::TypeMismatch {
            name: self.name.clone(),
            value: value.clone(),
            input_type,
        })
    }

    fn would_win(&self, event: &Event) -> bool {
        self.winner
            .is_none_or(|w| event.effective_priority() >= self.events[w].effective_priority())
    }

    /// Append an event. Set events whose value does not validate are rejected, not appended.
    pub fn update(&mut self, mut event: Event) -> Result<(), InputError> {
        if event.action == EventAction::Set {
            if let (Some(t), Some(v)) = (self.input_type, &event.value) {
                self.check_type(t, v)?;
            }
        }

        event.sequence = self.events.len() as u64;
        tracing::trace!(
            input = %self.name,
            action = event.action.as_str(),
            priority = ?event.priority,
            provider = ?event.provider,
            sequence = event.sequence,
            "input event"
        );

        if event.action == EventAction::Set && self.would_win(&event) {
            self.winner = Some(self.events.len());
        }
        self.events.push(event);
        Ok(())
    }

    /// Resolved value. `None` means no set event exists, which is not the same as an
    /// explicit null.
    pub fn value(&self) -> Option<&Value> {
        self.winner.and_then(|i| self.events[i].value.as_ref())
    }

    pub fn has_value(&self) -> bool {
        self.winner.is_some()
    }

    /// Strict read: fails when nothing ever set the input.
    pub fn required_value(&self) -> Result<&Value, InputError> {
        self.value().ok_or_else(|| InputError::Required {
            name: self.name.clone(),
        })
    }

    /// Required, and no provider supplied a value.
    pub fn is_unresolved_required(&self) -> bool {
        self.required && !self.has_value()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_type(&self) -> Option<InputType> {
        self.input_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn set_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.action == EventAction::Set)
    }

    /// Header line plus one line per event, in arrival order.
    pub fn diagnostic_string(&self) -> String {
        let mut lines = vec![format!("Input {}, with events:", self.name)];
        lines.extend(self.events.iter().map(Event::diagnostic_line));
        lines.join("\n")
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(v) => write!(f, "Input {} with {v}", self.name),
            None => write!(f, "Input {} with no value", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(value: Value, priority: i32) -> Event {
        Event::set(value, priority)
    }

    #[test]
    fn new_input_has_exactly_one_create_event() {
        let input = Input::new("input", InputOptions::new()).unwrap();
        assert_eq!(input.events().len(), 1);
        assert_eq!(input.events()[0].action, EventAction::Create);
        assert_eq!(input.set_events().count(), 0);
        assert_eq!(input.value(), None);
    }

    #[test]
    fn value_option_adds_a_set_event() {
        let input = Input::new("input", InputOptions::new().value(42)).unwrap();
        let creates = input
            .events()
            .iter()
            .filter(|e| e.action == EventAction::Create)
            .count();
        assert_eq!(creates, 1);
        assert_eq!(input.set_events().count(), 1);
        assert_eq!(input.value(), Some(&json!(42)));
    }

    #[test]
    fn each_update_appends_one_event() {
        let mut input = Input::new("input", InputOptions::new()).unwrap();
        for v in 1..=3 {
            input.update(set(json!(v), 0)).unwrap();
        }
        assert_eq!(input.set_events().count(), 3);
        let seqs: Vec<u64> = input.events().iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3]);
    }

    #[test]
    fn highest_priority_wins_regardless_of_order() {
        let mut input = Input::new("input", InputOptions::new()).unwrap();
        input.update(set(json!(1), 25)).unwrap();
        input.update(set(json!(2), 35)).unwrap();
        input.update(set(json!(3), 15)).unwrap();
        assert_eq!(input.value(), Some(&json!(2)));
    }

    #[test]
    fn ties_go_to_the_later_event() {
        let mut input = Input::new("input", InputOptions::new()).unwrap();
        input.update(set(json!(1), 15)).unwrap();
        input.update(set(json!(2), 25)).unwrap();
        input.update(set(json!(3), 25)).unwrap();
        assert_eq!(input.value(), Some(&json!(3)));
    }

    #[test]
    fn explicit_null_is_a_value() {
        let mut input = Input::new("input", InputOptions::new()).unwrap();
        input.update(set(Value::Null, 5)).unwrap();
        assert!(input.has_value());
        assert_eq!(input.value(), Some(&Value::Null));
    }

    #[test]
    fn mistyped_set_events_are_rejected_and_not_appended() {
        let mut input =
            Input::new("port", InputOptions::new().input_type(InputType::Numeric)).unwrap();
        let err = input.update(set(json!("twenty-two"), 10)).unwrap_err();
        assert!(matches!(err, InputError::TypeMismatch { .. }));
        assert_eq!(input.events().len(), 1);

        input.update(set(json!("22"), 10)).unwrap();
        assert_eq!(input.value(), Some(&json!("22")));
    }

    #[test]
    fn declaring_with_a_mistyped_value_fails() {
        let err = Input::new(
            "flag",
            InputOptions::new().input_type(InputType::Boolean).value("yes"),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "input 'flag' with value '\"yes\"' does not validate to type 'Boolean'"
        );
    }

    #[test]
    fn required_value_is_strict() {
        let mut input = Input::new("token", InputOptions::new().required(true)).unwrap();
        assert!(input.is_unresolved_required());
        assert_eq!(
            input.required_value(),
            Err(InputError::Required {
                name: "token".to_string()
            })
        );
        input.update(set(json!("s3cr3t"), 40)).unwrap();
        assert!(!input.is_unresolved_required());
        assert_eq!(input.required_value(), Ok(&json!("s3cr3t")));
    }

    #[test]
    fn create_event_records_the_caller() {
        let line = line!() + 1;
        let input = Input::new("some_input", InputOptions::new()).unwrap();
        let loc = input.events()[0].location.clone().unwrap();
        assert!(loc.path.as_str().ends_with("input.rs"));
        assert_eq!(loc.line, line);
    }

    #[test]
    fn incremental_winner_agrees_with_pure_resolution() {
        let mut input = Input::new("input", InputOptions::new()).unwrap();
        for (v, p) in [(1, 3), (2, 9), (3, 9), (4, 1)] {
            input.update(set(json!(v), p)).unwrap();
        }
        assert_eq!(input.value(), resolve(input.events()));
    }

    #[test]
    fn diagnostics_list_every_event() {
        let mut input = Input::new("input", InputOptions::new()).unwrap();
        input
            .update(set(json!({"a": 1, "b": 2}), 15).with_provider("unit_test"))
            .unwrap();
        input
            .update(Event::fetch(false).with_provider("alcubierre"))
            .unwrap();
        let mut evt3 = Event::set(json!(12), 0)
            .with_provider("control_dsl")
            .at(SourceLocation::new("/tmp/some/file.rs", 2));
        evt3.priority = None;
        input.update(evt3).unwrap();

        let text = input.diagnostic_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Input input, with events:");

        let shape = regex::Regex::new(r"^\s\s([a-z]+:\s'.+',\s)*?([a-z]+:\s'.+')$").unwrap();
        for line in &lines[1..] {
            assert!(shape.is_match(line), "bad diagnostic line: {line}");
        }
        assert!(lines[1].contains("action: 'create',"));
        assert!(lines[2].contains("action: 'set',"));
        assert!(lines[2].contains("value: '{"));
        assert!(lines[2].contains("provider: 'unit_test'"));
        assert!(lines[2].contains("priority: '15'"));
        assert!(lines[3].contains("hit: 'false'"));
        assert!(lines[4].contains("file: '/tmp/some/file.rs', line: '2'"));
    }

    #[test]
    fn empty_string_values_still_show_in_diagnostics() {
        let mut input = Input::new("banner", InputOptions::new()).unwrap();
        input.update(set(json!(""), 10).with_provider("p")).unwrap();
        assert_eq!(input.value(), Some(&json!("")));

        let text = input.diagnostic_string();
        let line = text.lines().last().unwrap();
        assert_eq!(line, "  action: 'set', value: '', priority: '10', provider: 'p'");
    }

    #[test]
    fn rejected_declarations_leave_the_input_untouched() {
        let mut input = Input::new("port", InputOptions::new()).unwrap();
        input.update(set(json!("abc"), 40)).unwrap();
        let before = input.events().len();

        let err = input
            .apply_options(
                InputOptions::new()
                    .input_type(InputType::Numeric)
                    .title("Port")
                    .required(true)
                    .value("x"),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, InputError::TypeMismatch { .. }));
        assert_eq!(input.input_type(), None);
        assert_eq!(input.title(), None);
        assert!(!input.is_required());
        assert_eq!(input.events().len(), before);
        assert_eq!(input.value(), Some(&json!("abc")));
    }

    #[test]
    fn a_new_type_must_fit_the_resolved_value() {
        let mut input = Input::new("port", InputOptions::new()).unwrap();
        input.update(set(json!("abc"), 40)).unwrap();

        let err = input
            .apply_options(InputOptions::new().input_type(InputType::Numeric), None)
            .unwrap_err();
        assert_eq!(
            err,
            InputError::TypeMismatch {
                name: "port".to_string(),
                value: json!("abc"),
                input_type: InputType::Numeric,
            }
        );
        assert_eq!(input.input_type(), None);

        // a declaration whose own value takes over is judged on that value
        input
            .apply_options(
                InputOptions::new().input_type(InputType::Numeric).value(22).priority(50),
                None,
            )
            .unwrap();
        assert_eq!(input.input_type(), Some(InputType::Numeric));
        assert_eq!(input.value(), Some(&json!(22)));
    }
}
