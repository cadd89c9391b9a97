//! argparse-style help rendering for [`CommandDef`] trees.

use serde_json::Value;

use crate::source::{ArgumentDef, Multiplicity};
use crate::tree::CommandDef;

/// Column at which help text starts.
const HELP_COLUMN: usize = 24;

pub(crate) fn format_help(cmd: &CommandDef, prog: &str) -> String {
    let mut args: Vec<ArgumentDef> = crate::CommandSource::arguments(cmd);
    let selector = subcommand_metavar(cmd);
    let selector_dest = cmd
        .subcommands
        .as_ref()
        .and_then(|group| group.dest.clone());
    if selector_dest.is_none() {
        if let Some(metavar) = &selector {
            // Group without a dest still shows up as a positional in help.
            args.push(ArgumentDef::positional(metavar).with_metavar(metavar));
        }
    }
    let is_selector = |arg: &ArgumentDef| match (&selector_dest, &selector) {
        (Some(dest), _) => arg.is_positional() && arg.dest == *dest,
        (None, Some(group)) => arg.is_positional() && arg.metavar.as_ref() == Some(group),
        (None, None) => false,
    };

    let mut out = String::new();

    let mut usage = vec![format!("usage: {prog}")];
    let (optionals, positionals): (Vec<&ArgumentDef>, Vec<&ArgumentDef>) =
        args.iter().partition(|arg| !arg.is_positional());
    for arg in &optionals {
        let part = option_usage(arg);
        if arg.required {
            usage.push(part);
        } else {
            usage.push(format!("[{part}]"));
        }
    }
    for arg in &positionals {
        if is_selector(*arg) {
            usage.push(format!("{} ...", metavar(arg)));
        } else {
            usage.push(value_usage(arg, &metavar(arg)));
        }
    }
    out.push_str(&usage.join(" "));
    out.push('\n');

    if let Some(description) = &cmd.description {
        out.push('\n');
        out.push_str(description);
        out.push('\n');
    }

    // A titled group is listed in its own section after the options.
    let title = cmd.subcommands.as_ref().and_then(|group| group.title.as_deref());
    let (titled, positionals): (Vec<&ArgumentDef>, Vec<&ArgumentDef>) = positionals
        .into_iter()
        .partition(|arg| title.is_some() && is_selector(*arg));

    if !positionals.is_empty() {
        out.push_str("\npositional arguments:\n");
        for arg in &positionals {
            push_entry(&mut out, &metavar(arg), arg.help.as_deref());
        }
    }

    if !optionals.is_empty() {
        out.push_str("\noptions:\n");
        for arg in &optionals {
            push_entry(&mut out, &option_invocation(arg), arg.help.as_deref());
        }
    }

    if let Some(title) = title.filter(|_| !titled.is_empty()) {
        out.push_str(&format!("\n{title}:\n"));
        for arg in &titled {
            push_entry(&mut out, &metavar(arg), arg.help.as_deref());
        }
    }

    if let Some(epilog) = &cmd.epilog {
        out.push('\n');
        out.push_str(epilog);
        out.push('\n');
    }

    out
}

fn subcommand_metavar(cmd: &CommandDef) -> Option<String> {
    let group = cmd.subcommands.as_ref()?;
    if group.commands.is_empty() {
        return None;
    }
    Some(format!("{{{}}}", group.names().join(",")))
}

fn metavar(arg: &ArgumentDef) -> String {
    if let Some(metavar) = &arg.metavar {
        return metavar.clone();
    }
    if let Some(choices) = arg.choices.as_deref().filter(|c| !c.is_empty()) {
        let rendered: Vec<String> = choices.iter().map(render_choice).collect();
        return format!("{{{}}}", rendered.join(","));
    }
    if arg.is_positional() {
        arg.dest.clone()
    } else {
        arg.dest.to_uppercase()
    }
}

fn render_choice(choice: &Value) -> String {
    match choice {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_usage(arg: &ArgumentDef, metavar: &str) -> String {
    match arg.multiplicity {
        Multiplicity::Single | Multiplicity::Append => metavar.to_string(),
        Multiplicity::OptionalSingle => format!("[{metavar}]"),
        Multiplicity::ZeroOrMore => format!("[{metavar} ...]"),
        Multiplicity::OneOrMore => format!("{metavar} [{metavar} ...]"),
    }
}

fn option_usage(arg: &ArgumentDef) -> String {
    let flag = arg.flags.first().map(String::as_str).unwrap_or_default();
    if arg.is_toggle() || arg.is_meta() {
        flag.to_string()
    } else {
        format!("{flag} {}", value_usage(arg, &metavar(arg)))
    }
}

fn option_invocation(arg: &ArgumentDef) -> String {
    if arg.is_toggle() || arg.is_meta() {
        return arg.flags.join(", ");
    }
    let value = value_usage(arg, &metavar(arg));
    arg.flags
        .iter()
        .map(|flag| format!("{flag} {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn push_entry(out: &mut String, invocation: &str, help: Option<&str>) {
    let line = format!("  {invocation}");
    match help {
        None => {
            out.push_str(&line);
            out.push('\n');
        }
        Some(help) if line.len() + 2 <= HELP_COLUMN => {
            out.push_str(&format!("{line:<width$}{help}\n", width = HELP_COLUMN));
        }
        Some(help) => {
            out.push_str(&line);
            out.push('\n');
            out.push_str(&format!("{:width$}{help}\n", "", width = HELP_COLUMN));
        }
    }
}
