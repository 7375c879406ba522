use crate::{
    diagnostics::HelperError,
    runtime::{
        environment::Environment,
        helper::{BlockKind, Blocks, Helper, HelperArgs},
        value::Value,
    },
};

/// Registers every built-in helper into `env`.
pub(crate) fn register(env: &mut Environment) {
    env.register_helper("if", Helper::block(builtin_if));
    env.register_helper("unless", Helper::block(builtin_unless));
    env.register_helper("each", Helper::block(builtin_each));
    env.register_helper("with", Helper::block(builtin_with));
    env.register_helper("-with-dynamic-vars", Helper::block(builtin_with_dynamic_vars));
    env.register_helper("concat", Helper::simple(builtin_concat));
    env.register_helper("-get-dynamic-var", Helper::DynamicVar);
}

fn check_arity(args: &HelperArgs<'_>, expected: usize, name: &str) -> Result<(), HelperError> {
    if args.params.len() != expected {
        return Err(HelperError::new(format!(
            "{} expects {} positional argument{}, got {}",
            name,
            expected,
            if expected == 1 { "" } else { "s" },
            args.params.len()
        )));
    }
    Ok(())
}

fn builtin_if(args: &HelperArgs<'_>, blocks: &mut Blocks) -> Result<(), HelperError> {
    check_arity(args, 1, "if")?;
    if args.param(0).is_truthy() {
        blocks.yield_default(Vec::new());
    } else {
        blocks.yield_inverse(Vec::new());
    }
    Ok(())
}

fn builtin_unless(args: &HelperArgs<'_>, blocks: &mut Blocks) -> Result<(), HelperError> {
    check_arity(args, 1, "unless")?;
    if args.param(0).is_truthy() {
        blocks.yield_inverse(Vec::new());
    } else {
        blocks.yield_default(Vec::new());
    }
    Ok(())
}

/// Yields the default block once per array item with `[item, index]`, or the
/// inverse block when there is nothing to iterate.
fn builtin_each(args: &HelperArgs<'_>, blocks: &mut Blocks) -> Result<(), HelperError> {
    check_arity(args, 1, "each")?;
    let list = args.param(0);
    match list.as_array() {
        Some(items) if !items.is_empty() => {
            for (index, item) in items.iter().enumerate() {
                blocks.yield_default(vec![item.clone(), Value::from(index)]);
            }
        }
        Some(_) => blocks.yield_inverse(Vec::new()),
        None if !list.is_truthy() => blocks.yield_inverse(Vec::new()),
        None => {
            return Err(HelperError::new(format!(
                "each expects an Array, got {}",
                list.type_name()
            )));
        }
    }
    Ok(())
}

fn builtin_with(args: &HelperArgs<'_>, blocks: &mut Blocks) -> Result<(), HelperError> {
    check_arity(args, 1, "with")?;
    let value = args.param(0);
    if value.is_truthy() {
        blocks.yield_default(vec![value]);
    } else {
        blocks.yield_inverse(Vec::new());
    }
    Ok(())
}

fn builtin_with_dynamic_vars(args: &HelperArgs<'_>, blocks: &mut Blocks) -> Result<(), HelperError> {
    blocks.yield_with_dynamic_vars(BlockKind::Default, Vec::new(), args.hash.to_vec());
    Ok(())
}

fn builtin_concat(args: &HelperArgs<'_>) -> Result<Value, HelperError> {
    let out: String = args.params.iter().map(Value::to_string_value).collect();
    Ok(Value::from(out))
}
