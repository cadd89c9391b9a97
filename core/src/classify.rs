//! Argument classification: argument definitions to schema properties and
//! option descriptors.

use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::metadata::{
    CommandMetadata, ItemsSchema, JsonType, OptionDescriptor, OptionSlot, PropertySchema,
};
use crate::source::{ArgumentDef, ArgumentShape, CommandSource, ElementType};

/// Classifies one argument into its schema property and option descriptor.
///
/// Returns `Ok(None)` for help and version meta-arguments, which never
/// become inputs.
///
/// # Errors
///
/// With `strict` set, returns
/// [`UnknownElementType`](SchemaError::UnknownElementType) when the element
/// type is not integer, float, or string.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use tool_schema_core::{ArgumentDef, ElementType, classify};
///
/// let arg = ArgumentDef::option(["--baz"])
///     .with_type(ElementType::Integer)
///     .with_choices([1, 2, 3]);
/// let slot = classify(&arg, false).unwrap().unwrap();
/// assert_eq!(
///     serde_json::to_value(&slot.property).unwrap(),
///     json!({"title": "baz", "description": null, "type": "integer", "enum": [1, 2, 3], "default": null})
/// );
/// assert_eq!(slot.descriptor.flag_name, "--baz");
/// ```
pub fn classify(arg: &ArgumentDef, strict: bool) -> Result<Option<OptionSlot>> {
    if arg.is_meta() {
        return Ok(None);
    }

    let help = arg.help.as_deref().unwrap_or_default();
    let (property, descriptor) = match arg.shape() {
        ArgumentShape::Flag => (
            PropertySchema::new(&arg.dest, arg.help.clone(), JsonType::Boolean),
            if arg.is_positional() {
                OptionDescriptor::positional(help, arg.required)
            } else {
                OptionDescriptor::switch(arg.flag_name(), help, arg.required)
            },
        ),
        ArgumentShape::List { kind, choices } => (
            PropertySchema::array(
                &arg.dest,
                arg.help.clone(),
                ItemsSchema {
                    kind: schema_type(arg, kind, strict)?,
                    choices: choices.map(<[Value]>::to_vec),
                },
            ),
            value_descriptor(arg, help),
        ),
        ArgumentShape::Scalar { kind, choices } => {
            let property =
                PropertySchema::new(&arg.dest, arg.help.clone(), schema_type(arg, kind, strict)?);
            let property = match choices {
                Some(choices) => property.with_choices(choices.to_vec()),
                None => property,
            };
            (property, value_descriptor(arg, help))
        }
    };

    let property = if !arg.required || arg.default.as_value().is_some() {
        property.with_default(Value::from(arg.default.clone()))
    } else {
        property
    };

    Ok(Some(OptionSlot {
        name: arg.dest.clone(),
        property,
        descriptor,
    }))
}

/// Builds the full metadata record for one command node.
///
/// Properties follow argument definition order with meta-arguments skipped;
/// the title is `path` and the description falls back to an empty string.
///
/// # Errors
///
/// Propagates classification errors from [`classify`].
pub fn build_command<S: CommandSource>(
    path: &str,
    node: &S,
    strict: bool,
) -> Result<CommandMetadata> {
    let mut slots = Vec::new();
    for arg in node.arguments() {
        if let Some(slot) = classify(&arg, strict)? {
            slots.push(slot);
        }
    }
    Ok(CommandMetadata::new(
        path,
        node.description().unwrap_or_default(),
        slots,
    ))
}

fn value_descriptor(arg: &ArgumentDef, help: &str) -> OptionDescriptor {
    if arg.is_positional() {
        OptionDescriptor::positional(help, arg.required)
    } else {
        OptionDescriptor::valued(arg.flag_name(), help, arg.required)
    }
}

fn schema_type(arg: &ArgumentDef, kind: &ElementType, strict: bool) -> Result<JsonType> {
    match kind {
        ElementType::Integer => Ok(JsonType::Integer),
        ElementType::Float => Ok(JsonType::Number),
        ElementType::String => Ok(JsonType::String),
        ElementType::Other(type_name) if strict => Err(SchemaError::UnknownElementType {
            dest: arg.dest.clone(),
            type_name: type_name.clone(),
        }),
        ElementType::Other(_) => Ok(JsonType::String),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::metadata::OptionKind;
    use crate::source::Multiplicity;
    use crate::tree::CommandDef;

    fn property_json(arg: &ArgumentDef) -> Value {
        let slot = classify(arg, false).unwrap().unwrap();
        serde_json::to_value(&slot.property).unwrap()
    }

    #[test]
    fn test_required_positional_has_no_default() {
        let arg = ArgumentDef::positional("pos1").with_help("Positional argument 1");
        assert_eq!(
            property_json(&arg),
            json!({"title": "pos1", "description": "Positional argument 1", "type": "string"})
        );
    }

    #[test]
    fn test_required_with_real_default_keeps_it() {
        let arg = ArgumentDef::option(["--opt1"]).mark_required().with_default("x");
        assert_eq!(property_json(&arg)["default"], json!("x"));

        let arg = ArgumentDef::option(["--opt1"]).mark_required().without_default();
        assert!(property_json(&arg).get("default").is_none());
    }

    #[test]
    fn test_optional_without_default_shows_null() {
        let arg = ArgumentDef::option(["--foo"]).without_default();
        assert_eq!(property_json(&arg)["default"], Value::Null);
    }

    #[test]
    fn test_types() {
        let cases = [
            (ArgumentDef::option(["--my-int"]).with_type(ElementType::Integer), "integer"),
            (ArgumentDef::option(["--my-float"]).with_type(ElementType::Float), "number"),
            (ArgumentDef::flag(["--my-bool"]), "boolean"),
            (ArgumentDef::option(["--my-list"]).with_multiplicity(Multiplicity::Append), "array"),
            (ArgumentDef::option(["--my-choice"]).with_choices(["a", "b"]), "string"),
        ];
        for (arg, expected) in cases {
            assert_eq!(property_json(&arg)["type"], json!(expected), "{}", arg.dest);
        }
    }

    #[test]
    fn test_list_choices_go_on_items() {
        let arg = ArgumentDef::option(["--my-choice"])
            .with_choices(["a", "b"])
            .with_multiplicity(Multiplicity::OneOrMore);
        assert_eq!(
            property_json(&arg),
            json!({
                "title": "my_choice",
                "description": null,
                "type": "array",
                "items": {"type": "string", "enum": ["a", "b"]},
                "default": null
            })
        );
    }

    #[test]
    fn test_list_element_types() {
        for (kind, expected) in [(ElementType::Integer, "integer"), (ElementType::Float, "number")] {
            let arg = ArgumentDef::option(["--n"])
                .with_type(kind)
                .with_multiplicity(Multiplicity::OneOrMore);
            assert_eq!(property_json(&arg)["items"], json!({"type": expected}));
        }
    }

    #[test]
    fn test_strict_types() {
        let arg = ArgumentDef::option(["--path"]).with_type(ElementType::Other("path".into()));
        assert_eq!(property_json(&arg)["type"], json!("string"));

        let err = classify(&arg, true).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::UnknownElementType { ref dest, ref type_name } if dest == "path" && type_name == "path"
        ));

        let list = arg.with_multiplicity(Multiplicity::Append);
        assert!(classify(&list, true).is_err());

        let plain = ArgumentDef::option(["--name"]);
        assert!(classify(&plain, true).unwrap().is_some());
    }

    #[test]
    fn test_meta_arguments_are_skipped() {
        assert!(classify(&ArgumentDef::help_flag(), false).unwrap().is_none());
    }

    #[test]
    fn test_descriptors() {
        let pos = classify(&ArgumentDef::positional("pos1"), false).unwrap().unwrap();
        assert_eq!(pos.descriptor.kind, OptionKind::Positional);
        assert_eq!(pos.descriptor.flag_name, "");
        assert!(pos.descriptor.required);

        let foo = classify(&ArgumentDef::option(["-f", "--foo"]).with_help("Foo"), false)
            .unwrap()
            .unwrap();
        assert_eq!(foo.descriptor.kind, OptionKind::Valued);
        assert_eq!(foo.descriptor.flag_name, "--foo");
        assert_eq!(foo.descriptor.description, "Foo");

        let bar = classify(&ArgumentDef::flag(["--bar"]), false).unwrap().unwrap();
        assert!(bar.descriptor.is_flag());
        assert!(!bar.descriptor.is_positional());
        assert_eq!(bar.descriptor.description, "");
    }

    #[test]
    fn test_build_command_required_and_order() {
        let cmd = CommandDef::new("my-cli")
            .with_description("My CLI")
            .with_arg(ArgumentDef::positional("pos1").with_help("Positional 1"))
            .with_arg(ArgumentDef::option(["--opt1"]).mark_required().with_help("Option 1"));

        let metadata = build_command("my-cli", &cmd, false).unwrap();
        assert_eq!(
            metadata.schema().to_json().unwrap(),
            json!({
                "type": "object",
                "title": "my-cli",
                "description": "My CLI",
                "properties": {
                    "pos1": {"title": "pos1", "description": "Positional 1", "type": "string"},
                    "opt1": {"title": "opt1", "description": "Option 1", "type": "string"}
                },
                "required": ["pos1", "opt1"]
            })
        );
    }

    #[test]
    fn test_build_command_without_required_omits_array() {
        let cmd = CommandDef::new("my-cli").with_arg(ArgumentDef::flag(["--bar"]));
        let schema = build_command("my-cli", &cmd, false)
            .unwrap()
            .schema()
            .to_json()
            .unwrap();
        assert!(schema.get("required").is_none());
        assert_eq!(schema["description"], json!(""));
    }
}
