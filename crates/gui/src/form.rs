//! Input form generated from the parameter object
//!
//! The form holds only what the widgets edit (text and color buffers).
//! Changes come back as [`FormChange`] values and are applied to the
//! parameters and the scene by [`ParameterForm::apply`].

use shared::{Color, ParamValue, Parameters, COLOR_KEY};

use crate::context::SceneContext;
use crate::update::{apply_color, apply_scale};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Number,
    Color,
}

/// One labelled input bound to a parameter key
#[derive(Debug, Clone, PartialEq)]
pub struct FormInput {
    pub key: String,
    pub kind: InputKind,
    /// Edit buffer of a numeric input
    pub text: String,
    /// Current value of a color input
    pub color: Color,
}

impl FormInput {
    fn from_param(key: &str, value: &ParamValue) -> Self {
        match value {
            ParamValue::Number(v) => Self {
                key: key.to_string(),
                kind: InputKind::Number,
                text: format!("{v}"),
                color: Color::BLACK,
            },
            ParamValue::Color(c) => Self {
                key: key.to_string(),
                kind: InputKind::Color,
                text: c.to_hex(),
                color: *c,
            },
        }
    }
}

/// A widget edit reported by the UI
#[derive(Debug, Clone, PartialEq)]
pub enum FormChange {
    Number { key: String, text: String },
    Color { key: String, color: Color },
}

/// What applying a change did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Rescaled,
    Recolored,
    Ignored,
}

#[derive(Debug, Default)]
pub struct ParameterForm {
    inputs: Vec<FormInput>,
}

impl ParameterForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all inputs with one per parameter, in parameter order
    pub fn rebuild(&mut self, params: &Parameters) {
        self.clear();
        // The parser only admits a color under COLOR_KEY, so the value kind picks the widget
        self.inputs = params
            .iter()
            .map(|(key, value)| FormInput::from_param(key, value))
            .collect();
        tracing::info!("Built parameter form with {} inputs", self.inputs.len());
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    pub fn inputs(&self) -> &[FormInput] {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut [FormInput] {
        &mut self.inputs
    }

    pub fn input(&self, key: &str) -> Option<&FormInput> {
        self.inputs.iter().find(|i| i.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Write a change into `params` and update the model.
    ///
    /// Numeric text that does not parse leaves the parameter untouched; the
    /// text itself stays in the input.
    pub fn apply(
        &mut self,
        change: FormChange,
        params: &mut Parameters,
        ctx: &mut SceneContext,
    ) -> Applied {
        match change {
            FormChange::Number { key, text } => {
                if let Some(input) = self.inputs.iter_mut().find(|i| i.key == key) {
                    input.text = text.clone();
                }
                let value = match text.trim().parse::<f64>() {
                    Ok(v) => v,
                    Err(_) => {
                        tracing::warn!("Ignoring non-numeric input for '{key}': {text:?}");
                        return Applied::Ignored;
                    }
                };
                if let Err(e) = params.set_number(&key, value) {
                    tracing::warn!("Ignoring input: {e}");
                    return Applied::Ignored;
                }
                tracing::debug!("Parameter '{key}' = {value}");
                apply_scale(ctx, params);
                Applied::Rescaled
            }
            FormChange::Color { key, color } => {
                if key != COLOR_KEY {
                    tracing::warn!("Ignoring color input for unknown key '{key}'");
                    return Applied::Ignored;
                }
                if let Some(input) = self.inputs.iter_mut().find(|i| i.key == key) {
                    input.color = color;
                    input.text = color.to_hex();
                }
                params.set_color(color);
                tracing::debug!("Parameter '{key}' = {color}");
                apply_color(ctx, color);
                Applied::Recolored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Viewport;

    fn params() -> Parameters {
        let mut p =
            Parameters::from_json(r#"{"breedte": 50, "Hoogte": 80.5, "Lengte": "120"}"#).unwrap();
        p.ensure_color();
        p
    }

    #[test]
    fn test_rebuild_follows_parameter_order() {
        let mut form = ParameterForm::new();
        form.rebuild(&params());
        let keys: Vec<&str> = form.inputs().iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["breedte", "Hoogte", "Lengte", "kleur"]);
        assert_eq!(form.inputs()[0].text, "50");
        assert_eq!(form.inputs()[1].text, "80.5");
        assert_eq!(form.inputs()[3].kind, InputKind::Color);
        assert_eq!(form.inputs()[3].color, Color::from_u32(0x00aaff));
    }

    #[test]
    fn test_rebuild_replaces_previous_inputs() {
        let mut form = ParameterForm::new();
        form.rebuild(&params());
        form.rebuild(&Parameters::from_json(r#"{"a": 1}"#).unwrap());
        assert_eq!(form.len(), 1);
        assert_eq!(form.inputs()[0].key, "a");
    }

    #[test]
    fn test_unparsable_number_is_ignored() {
        let mut form = ParameterForm::new();
        let mut p = params();
        form.rebuild(&p);
        let mut ctx = SceneContext::new(Viewport::new(100.0, 100.0));

        let applied = form.apply(
            FormChange::Number {
                key: "breedte".into(),
                text: "abc".into(),
            },
            &mut p,
            &mut ctx,
        );
        assert_eq!(applied, Applied::Ignored);
        assert_eq!(p.number("breedte"), Some(50.0));
        assert_eq!(form.input("breedte").unwrap().text, "abc");
    }

    #[test]
    fn test_number_change_updates_only_its_key() {
        let mut form = ParameterForm::new();
        let mut p = params();
        form.rebuild(&p);
        let mut ctx = SceneContext::new(Viewport::new(100.0, 100.0));

        let applied = form.apply(
            FormChange::Number {
                key: "Hoogte".into(),
                text: "75".into(),
            },
            &mut p,
            &mut ctx,
        );
        assert_eq!(applied, Applied::Rescaled);
        assert_eq!(p.number("Hoogte"), Some(75.0));
        assert_eq!(p.number("breedte"), Some(50.0));
        assert_eq!(p.number("Lengte"), Some(120.0));
    }

    #[test]
    fn test_color_change_writes_parameter() {
        let mut form = ParameterForm::new();
        let mut p = params();
        form.rebuild(&p);
        let mut ctx = SceneContext::new(Viewport::new(100.0, 100.0));

        let red = Color::rgb(0xff, 0, 0);
        let applied = form.apply(
            FormChange::Color {
                key: COLOR_KEY.into(),
                color: red,
            },
            &mut p,
            &mut ctx,
        );
        assert_eq!(applied, Applied::Recolored);
        assert_eq!(p.color(), Some(red));
        assert_eq!(form.input(COLOR_KEY).unwrap().text, "#ff0000");
    }
}
