//! [`CommandSource`] for [`clap::Command`].
//!
//! Commands must be built with [`clap::Command::build`] before walking so
//! that generated arguments (help, version) and argument counts are
//! populated.
//!
//! ```
//! use clap::{Arg, ArgAction, Command};
//! use tool_schema_core::{WalkOptions, walk_commands};
//!
//! let mut cmd = Command::new("greet")
//!     .arg(Arg::new("name").required(true))
//!     .arg(Arg::new("loud").long("loud").action(ArgAction::SetTrue));
//! cmd.build();
//!
//! let records = walk_commands(&cmd, &WalkOptions::default()).unwrap();
//! let argv = records[0]
//!     .construct_from_value(&serde_json::json!({"name": "ada", "loud": true}))
//!     .unwrap();
//! assert_eq!(argv, ["greet", "--loud", "ada"]);
//! ```

use clap::builder::ValueParser;
use clap::{Arg, ArgAction, Command, value_parser};
use serde_json::Value;

use crate::source::{
    ArgumentAction, ArgumentDef, CommandSource, DefaultValue, ElementType, Multiplicity,
};

impl CommandSource for Command {
    fn name(&self) -> &str {
        self.get_name()
    }

    fn description(&self) -> Option<String> {
        self.get_about().map(ToString::to_string)
    }

    fn arguments(&self) -> Vec<ArgumentDef> {
        let mut args: Vec<ArgumentDef> = self.get_arguments().map(argument_def).collect();
        let names: Vec<&str> = visible_subcommands(self).map(Command::get_name).collect();
        if !names.is_empty() {
            let dest = self
                .get_subcommand_value_name()
                .map(str::to_lowercase)
                .unwrap_or_else(|| "command".to_string());
            let mut selector = ArgumentDef::positional(&dest).with_choices(names);
            selector.required = self.is_subcommand_required_set();
            args.push(selector);
        }
        args
    }

    fn subcommands(&self) -> Vec<&Self> {
        visible_subcommands(self).collect()
    }

    fn render_help(&self, prog: &str) -> String {
        let mut cmd = self.clone().bin_name(prog.to_string());
        Command::render_help(&mut cmd).to_string()
    }
}

/// Subcommands without clap's generated `help` subcommand.
fn visible_subcommands(cmd: &Command) -> impl Iterator<Item = &Command> {
    let generated_help = !cmd.is_disable_help_subcommand_set();
    cmd.get_subcommands()
        .filter(move |sub| !(generated_help && sub.get_name() == "help"))
}

fn argument_def(arg: &Arg) -> ArgumentDef {
    let mut flags = Vec::new();
    if let Some(short) = arg.get_short() {
        flags.push(format!("-{short}"));
    }
    if let Some(long) = arg.get_long() {
        flags.push(format!("--{long}"));
    }

    let (action, multiplicity) = match arg.get_action() {
        ArgAction::SetTrue | ArgAction::Count => (ArgumentAction::StoreTrue, Multiplicity::Single),
        ArgAction::SetFalse => (ArgumentAction::StoreFalse, Multiplicity::Single),
        ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong => {
            (ArgumentAction::Help, Multiplicity::Single)
        }
        ArgAction::Version => (ArgumentAction::Version, Multiplicity::Single),
        ArgAction::Append => (ArgumentAction::Store, Multiplicity::Append),
        _ => (ArgumentAction::Store, multiplicity(arg)),
    };

    let element_type = element_type(arg.get_value_parser());
    let choices: Vec<Value> = arg
        .get_possible_values()
        .iter()
        .filter(|value| !value.is_hide_set())
        .map(|value| Value::from(value.get_name()))
        .collect();

    ArgumentDef {
        dest: arg.get_id().as_str().to_string(),
        help: arg.get_help().map(ToString::to_string),
        required: arg.is_required_set(),
        default: default_value(arg, &action, &element_type, multiplicity),
        metavar: arg
            .get_value_names()
            .and_then(|names| names.first())
            .map(ToString::to_string),
        choices: (!choices.is_empty()).then_some(choices),
        flags,
        element_type,
        multiplicity,
        action,
    }
}

fn multiplicity(arg: &Arg) -> Multiplicity {
    let Some(range) = arg.get_num_args() else {
        return Multiplicity::Single;
    };
    match (range.min_values(), range.max_values()) {
        (0, 1) => Multiplicity::OptionalSingle,
        (0, max) if max > 1 => Multiplicity::ZeroOrMore,
        (_, max) if max > 1 => Multiplicity::OneOrMore,
        _ => Multiplicity::Single,
    }
}

fn element_type(parser: &ValueParser) -> ElementType {
    let id = parser.type_id();
    let integers: [ValueParser; 10] = [
        value_parser!(i8).into(),
        value_parser!(i16).into(),
        value_parser!(i32).into(),
        value_parser!(i64).into(),
        value_parser!(isize).into(),
        value_parser!(u8).into(),
        value_parser!(u16).into(),
        value_parser!(u32).into(),
        value_parser!(u64).into(),
        value_parser!(usize).into(),
    ];
    let floats: [ValueParser; 2] = [value_parser!(f32).into(), value_parser!(f64).into()];

    if integers.iter().any(|p| p.type_id() == id) {
        ElementType::Integer
    } else if floats.iter().any(|p| p.type_id() == id) {
        ElementType::Float
    } else if ValueParser::string().type_id() == id {
        ElementType::String
    } else if ValueParser::path_buf().type_id() == id {
        ElementType::Other("path".to_string())
    } else if ValueParser::os_string().type_id() == id {
        ElementType::Other("os-string".to_string())
    } else if ValueParser::bool().type_id() == id {
        ElementType::Other("bool".to_string())
    } else {
        ElementType::Other(format!("{id:?}"))
    }
}

fn default_value(
    arg: &Arg,
    action: &ArgumentAction,
    element_type: &ElementType,
    multiplicity: Multiplicity,
) -> DefaultValue {
    let raw: Vec<String> = arg
        .get_default_values()
        .iter()
        .map(|value| value.to_string_lossy().into_owned())
        .collect();

    match action {
        ArgumentAction::Help | ArgumentAction::Version => return DefaultValue::Unset,
        ArgumentAction::StoreTrue => return DefaultValue::Value(Value::Bool(false)),
        ArgumentAction::StoreFalse => return DefaultValue::Value(Value::Bool(true)),
        ArgumentAction::Store => {}
    }

    match (multiplicity, raw.as_slice()) {
        (_, []) => DefaultValue::Unset,
        (Multiplicity::Single | Multiplicity::OptionalSingle, [single]) => {
            DefaultValue::Value(typed_value(single, element_type))
        }
        (_, values) => DefaultValue::Value(Value::Array(
            values.iter().map(|v| typed_value(v, element_type)).collect(),
        )),
    }
}

fn typed_value(raw: &str, element_type: &ElementType) -> Value {
    let parsed = match element_type {
        ElementType::Integer => raw.parse::<i64>().ok().map(Value::from),
        ElementType::Float => raw
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::from(raw))
}
