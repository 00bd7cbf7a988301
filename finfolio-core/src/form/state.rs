//! Field-by-field input state for the "add investment" form.
//!
//! [`FormState`] owns the ordered fields, the focus and the submission latch.
//! It performs no validation: navigation is always allowed and raw text is
//! handed to [`parse_form_data`](super::parse_form_data) once the form is
//! submitted.

use std::collections::HashMap;

/// Label of the application date field.
pub const APPLICATION_DATE: &str = "Application Date";
/// Label of the principal field.
pub const VALUE: &str = "Value";
/// Label of the bank field.
pub const BANK: &str = "Bank";
/// Label of the title field.
pub const TITLE: &str = "Title";
/// Label of the redemption date field.
pub const REDEMPTION_DATE: &str = "Redemption Date";

/// Raw field values keyed by field label.
pub type FieldValues = HashMap<String, String>;

/// `(label, placeholder)` for every field, in display order.
const INVESTMENT_FIELDS: [(&str, &str); 5] = [
    (APPLICATION_DATE, "YYYY/MM/DD"),
    (VALUE, "1000.00"),
    (BANK, "Nubank"),
    (TITLE, "CDB 120% CDI"),
    (REDEMPTION_DATE, "YYYY/MM/DD"),
];

/// A single text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    label: &'static str,
    value: String,
    placeholder: &'static str,
}

impl InputField {
    fn new(
        label: &'static str,
        placeholder: &'static str,
    ) -> Self {
        Self {
            label,
            value: String::new(),
            placeholder,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }
}

/// A discrete input event delivered to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    /// Abandon the form (Esc / Ctrl-C).
    Cancel,
    /// Move to the next field, or submit from the last one (Enter).
    Advance,
    /// Circular forward navigation (Tab).
    NextField,
    /// Circular backward navigation (Shift-Tab).
    PrevField,
    /// Remove the last character of the focused field (Backspace).
    DeleteChar,
    /// Append a character to the focused field.
    AppendChar(char),
    /// The terminal was resized. Carries no form semantics.
    Resize { width: u16, height: u16 },
}

/// What the caller should do after an event has been handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    /// Keep reading events.
    Continue,
    /// The last field was confirmed; the values are ready to be parsed.
    Submitted,
    /// The user abandoned the form. Field values are not authoritative.
    Cancelled,
    /// An event arrived after submission; the session should close.
    Closed,
}

/// Collects the raw text of each form field.
///
/// Invariants:
/// - `fields` is never empty and `focus_index < fields.len()`.
/// - `submitted` never goes back to `false`, and no field changes after it
///   is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    fields: Vec<InputField>,
    focus_index: usize,
    submitted: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    /// Creates the investment form with every field empty and the first
    /// field focused.
    pub fn new() -> Self {
        Self {
            fields: INVESTMENT_FIELDS
                .iter()
                .map(|&(label, placeholder)| InputField::new(label, placeholder))
                .collect(),
            focus_index: 0,
            submitted: false,
        }
    }

    /// Creates an editing form pre-filled with `values`, focused on the field
    /// labelled `focus`.
    ///
    /// Used to reopen a rejected submission so the user can fix one field
    /// without retyping the others. Unknown labels in `values` are ignored; an
    /// unknown `focus` falls back to the first field.
    pub fn with_values(
        values: &FieldValues,
        focus: Option<&str>,
    ) -> Self {
        let mut form = Self::new();
        for field in &mut form.fields {
            if let Some(value) = values.get(field.label) {
                field.value = value.chars().filter(|c| !c.is_control()).collect();
            }
        }
        form.focus_index = focus
            .and_then(|label| form.fields.iter().position(|f| f.label == label))
            .unwrap_or(0);
        form
    }

    /// Applies one event and reports how the session should proceed.
    pub fn handle(
        &mut self,
        event: FormEvent,
    ) -> FormOutcome {
        if self.submitted {
            return FormOutcome::Closed;
        }

        match event {
            FormEvent::Cancel => return FormOutcome::Cancelled,
            FormEvent::Advance => {
                if self.focus_index == self.last_index() {
                    self.submitted = true;
                    return FormOutcome::Submitted;
                }
                self.focus_index += 1;
            }
            FormEvent::NextField => {
                self.focus_index = (self.focus_index + 1) % self.fields.len();
            }
            FormEvent::PrevField => {
                self.focus_index = (self.focus_index + self.fields.len() - 1) % self.fields.len();
            }
            FormEvent::DeleteChar => {
                self.focused_mut().value.pop();
            }
            FormEvent::AppendChar(c) => {
                if !c.is_control() {
                    self.focused_mut().value.push(c);
                }
            }
            FormEvent::Resize { .. } => {}
        }

        FormOutcome::Continue
    }

    /// Raw values keyed by field label.
    pub fn field_values(&self) -> FieldValues {
        self.fields
            .iter()
            .map(|f| (f.label.to_string(), f.value.clone()))
            .collect()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn fields(&self) -> &[InputField] {
        &self.fields
    }

    pub fn focus_index(&self) -> usize {
        self.focus_index
    }

    pub fn focused_field(&self) -> &InputField {
        &self.fields[self.focus_index]
    }

    fn focused_mut(&mut self) -> &mut InputField {
        &mut self.fields[self.focus_index]
    }

    fn last_index(&self) -> usize {
        self.fields.len() - 1
    }
}
