//! Lavendeux Demo Extension
//!
//! A small extension exercising every part of the SDK:
//! - `add(Numeric, Numeric)`: integer when both sides are integral
//! - `next()`: counter kept in host state
//! - `join(Array, [String])`: optional separator, defaults to ", "
//! - `keys(Object) -> Array`
//! - `@usd` and `@hex` decorators

use lavendeux_core::{ArgType, BindingError, Native, State};
use lavendeux_extension::{from_package, CallbackResult, ExtensionRegistry};

const COUNTER_KEY: &str = "next_int";
const DEFAULT_SEPARATOR: &str = ", ";

/// Load the demo bindings into a registry
pub fn load_demo_extension(registry: &mut ExtensionRegistry) -> Result<(), BindingError> {
    registry
        .add_numeric_function("add", add)
        .add_numeric_argument()?
        .add_numeric_argument()?;

    registry.add_integer_function("next", next);

    registry
        .add_string_function("join", join)
        .add_array_argument()?
        .add_optional_argument(ArgType::String)?;

    registry.add_array_function("keys", keys).add_object_argument()?;

    registry.add_numeric_decorator("usd", usd);
    registry.add_integer_decorator("hex", hex);

    Ok(())
}

/// Registry named after this package, with the demo bindings loaded
pub fn demo_extension() -> Result<ExtensionRegistry, BindingError> {
    let mut registry = from_package!();
    load_demo_extension(&mut registry)?;
    Ok(registry)
}

fn add(args: &[Native], _: &mut State) -> CallbackResult {
    match (&args[0], &args[1]) {
        (Native::Int(a), Native::Int(b)) => Ok(a
            .checked_add(*b)
            .map_or_else(|| Native::Float(*a as f64 + *b as f64), Native::Int)),
        (a, b) => Ok(Native::Float(
            a.as_f64().unwrap_or(f64::NAN) + b.as_f64().unwrap_or(f64::NAN),
        )),
    }
}

fn next(_: &[Native], state: &mut State) -> CallbackResult {
    let current = state.get(COUNTER_KEY).and_then(Native::as_i64).unwrap_or(0);
    state.insert(COUNTER_KEY.to_string(), Native::Int(current + 1));
    Ok(Native::Int(current))
}

fn join(args: &[Native], _: &mut State) -> CallbackResult {
    let separator = args.get(1).and_then(Native::as_str).unwrap_or(DEFAULT_SEPARATOR);
    let items = args[0].as_array().unwrap_or_default();
    Ok(Native::Str(
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(separator),
    ))
}

fn keys(args: &[Native], _: &mut State) -> CallbackResult {
    let object = args[0]
        .as_object()
        .ok_or_else(|| format!("expected an object, got {}", args[0].type_name()))?;
    Ok(Native::Array(object.keys().map(|k| Native::Str(k.clone())).collect()))
}

fn usd(args: &[Native], _: &mut State) -> CallbackResult {
    let amount = args[0]
        .as_f64()
        .ok_or_else(|| format!("cannot format {} as currency", args[0].type_name()))?;
    Ok(Native::Str(format!("${:.2}", amount)))
}

fn hex(args: &[Native], _: &mut State) -> CallbackResult {
    let n = args[0]
        .as_i64()
        .ok_or_else(|| format!("cannot format {} as hex", args[0].type_name()))?;
    let text = if n < 0 {
        format!("-0x{:X}", n.unsigned_abs())
    } else {
        format!("0x{:X}", n)
    };
    Ok(Native::Str(text))
}
