use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::RouteError;
use crate::representor::FieldKind;

/// Path segment below the API base under which form descriptors are served.
pub const FORMS_PATH: &str = "f";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// Describes the body a write operation expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Form {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    fields: Vec<FormField>,
}

impl Form {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            title: None,
            description: None,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_owned());
        self
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    #[must_use]
    pub fn required(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push(FormField {
            name: name.to_owned(),
            kind,
            required: true,
        });
        self
    }

    #[must_use]
    pub fn optional(mut self, name: &str, kind: FieldKind) -> Self {
        self.fields.push(FormField {
            name: name.to_owned(),
            kind,
            required: false,
        });
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Path of this form's descriptor, relative to the API base.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{FORMS_PATH}/{}", urlencoding::encode(&self.id))
    }

    /// Check presence and JSON type of every declared field.
    ///
    /// `null` counts as absent. Keys the form does not declare are left to
    /// deserialization.
    ///
    /// # Errors
    /// [`RouteError::BadRequest`] naming the first offending field.
    pub fn validate(&self, body: &Value) -> Result<(), RouteError> {
        let Some(object) = body.as_object() else {
            return Err(RouteError::bad_request("body must be a JSON object"));
        };
        for field in &self.fields {
            match object.get(&field.name).filter(|v| !v.is_null()) {
                None if field.required => {
                    return Err(RouteError::bad_request(format!(
                        "missing required field '{}'",
                        field.name
                    )));
                }
                Some(value) if !field.kind.accepts(value) => {
                    return Err(RouteError::bad_request(format!(
                        "field '{}' must be of kind {}",
                        field.name,
                        field.kind.as_str()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Validate `body` against an optional form and deserialize it.
pub(crate) fn decode_body<B: DeserializeOwned>(
    form: Option<&Form>,
    body: Option<&Value>,
) -> Result<B, RouteError> {
    let body = body.cloned().unwrap_or(Value::Null);
    if let Some(form) = form {
        form.validate(&body)?;
    }
    serde_json::from_value(body).map_err(|e| RouteError::bad_request(e.to_string()))
}
