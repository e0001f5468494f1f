//! Generic editable form
//!
//! A form is an ordered list of fields with a cursor. Text-like fields hold
//! what the operator typed; select fields hold the chosen option's id as text
//! so a value can arrive before its option list does.

use crate::api::FormError;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    /// Whole number
    Number,
    /// `YYYY-MM-DD`
    Date,
    /// Foreign-key picker: `(id, label)` pairs
    Select(Vec<(i64, String)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FormField {
    pub fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            value: String::new(),
            kind: FieldKind::Text,
            required: false,
        }
    }

    pub fn number(key: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Number,
            ..Self::text(key, label)
        }
    }

    pub fn date(key: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Date,
            ..Self::text(key, label)
        }
    }

    pub fn select(key: &'static str, label: &'static str) -> Self {
        Self {
            kind: FieldKind::Select(Vec::new()),
            ..Self::text(key, label)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Text shown in the form; selects show the option label
    pub fn display(&self) -> String {
        match &self.kind {
            FieldKind::Select(options) => {
                let id = self.value.parse::<i64>().ok();
                options
                    .iter()
                    .find(|(oid, _)| Some(*oid) == id)
                    .map(|(_, label)| label.clone())
                    .unwrap_or_else(|| {
                        if self.value.is_empty() {
                            String::new()
                        } else if options.is_empty() {
                            "…".to_string()
                        } else {
                            format!("#{}", self.value)
                        }
                    })
            }
            _ => self.value.clone(),
        }
    }

    fn check(&self) -> Result<(), FormError> {
        let value = self.value.trim();
        if value.is_empty() {
            if self.required {
                return Err(FormError::field(
                    self.key,
                    format!("{} is required", self.label),
                ));
            }
            return Ok(());
        }
        match self.kind {
            FieldKind::Number | FieldKind::Select(_) if value.parse::<i64>().is_err() => Err(
                FormError::field(self.key, format!("{} must be a number", self.label)),
            ),
            FieldKind::Date if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() => {
                Err(FormError::field(
                    self.key,
                    format!("{} must be a date (YYYY-MM-DD)", self.label),
                ))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub fields: Vec<FormField>,
    focused: usize,
}

impl FormState {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields, focused: 0 }
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focused = (self.focused + self.fields.len() - 1) % self.fields.len();
        }
    }

    fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.key == key)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.key == key)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        if let Some(field) = self.field_mut(key) {
            field.value = value.into();
        }
    }

    pub fn set_options(&mut self, key: &str, options: Vec<(i64, String)>) {
        if let Some(field) = self.field_mut(key) {
            field.kind = FieldKind::Select(options);
        }
    }

    /// Options of a select field, empty until they have loaded
    pub fn options(&self, key: &str) -> &[(i64, String)] {
        match self.field(key).map(|f| &f.kind) {
            Some(FieldKind::Select(options)) => options,
            _ => &[],
        }
    }

    /// Type a character into the focused text-like field
    pub fn insert_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            if !matches!(field.kind, FieldKind::Select(_)) {
                field.value.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focused) {
            match field.kind {
                FieldKind::Select(_) => field.value.clear(),
                _ => {
                    field.value.pop();
                }
            }
        }
    }

    /// Move the focused select to the next/previous option
    pub fn cycle(&mut self, step: isize) {
        let Some(field) = self.fields.get_mut(self.focused) else {
            return;
        };
        let FieldKind::Select(options) = &field.kind else {
            return;
        };
        if options.is_empty() {
            return;
        }
        let len = options.len() as isize;
        let current = field
            .value
            .parse::<i64>()
            .ok()
            .and_then(|id| options.iter().position(|(oid, _)| *oid == id));
        let next = match current {
            Some(pos) => (pos as isize + step).rem_euclid(len),
            None if step < 0 => len - 1,
            None => 0,
        };
        field.value = options[next as usize].0.to_string();
    }

    /// First failing field, in display order
    pub fn validate(&self) -> Result<(), FormError> {
        self.fields.iter().try_for_each(FormField::check)
    }

    /// Trimmed text, `None` when blank
    pub fn text(&self, key: &str) -> Option<String> {
        self.field(key)
            .map(|f| f.value.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn number(&self, key: &str) -> Option<i64> {
        self.field(key).and_then(|f| f.value.trim().parse().ok())
    }

    /// Move focus onto the field an error refers to
    pub fn focus_field(&mut self, key: &str) {
        if let Some(pos) = self.fields.iter().position(|f| f.key == key) {
            self.focused = pos;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FormState {
        FormState::new(vec![
            FormField::text("name", "Name").required(),
            FormField::number("mileage", "Mileage").required(),
            FormField::date("date", "Date"),
            FormField::select("car_id", "Vehicle").required(),
        ])
    }

    #[test]
    fn required_fields_fail_in_order() {
        let form = sample();
        let err = form.validate().unwrap_err();
        assert_eq!(err.field, Some("name"));
        assert_eq!(err.message, "Name is required");
    }

    #[test]
    fn numeric_and_date_fields_are_checked() {
        let mut form = sample();
        form.set("name", "Clutch");
        form.set("mileage", "12k");
        form.set("car_id", "1");
        assert_eq!(form.validate().unwrap_err().field, Some("mileage"));

        form.set("mileage", "12000");
        form.set("date", "01/02/2024");
        assert_eq!(form.validate().unwrap_err().field, Some("date"));

        form.set("date", "2024-02-01");
        assert!(form.validate().is_ok());
        assert_eq!(form.number("mileage"), Some(12000));
    }

    #[test]
    fn select_cycles_through_options_and_keeps_early_value() {
        let mut form = sample();
        form.set("car_id", "7");
        assert_eq!(form.fields[3].display(), "…");

        form.set_options("car_id", vec![(3, "AUDI".into()), (7, "BMW".into())]);
        assert_eq!(form.fields[3].display(), "BMW");

        form.focus_field("car_id");
        form.cycle(1);
        assert_eq!(form.text("car_id").as_deref(), Some("3"));
        form.cycle(-1);
        assert_eq!(form.text("car_id").as_deref(), Some("7"));
    }

    #[test]
    fn typing_skips_select_fields() {
        let mut form = sample();
        form.insert_char('a');
        assert_eq!(form.text("name").as_deref(), Some("a"));
        form.focus_prev();
        form.insert_char('x');
        assert_eq!(form.text("car_id"), None);
        form.focus_next();
        form.backspace();
        assert_eq!(form.text("name"), None);
    }
}
