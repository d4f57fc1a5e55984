//! Argument binding.
//!
//! Matches tokenized arguments against a command's declared syntax:
//! arity, optional trailing parameters, type unions, and dereferencing of
//! `$name` arguments where a concrete type is expected.

use std::fmt;

use cinder_types::{ANY_TYPE, CinderError, ErrorCode, Result, VARIABLE_TYPE, Value};

/// One declared parameter, parsed from `"number"`, `"number|string"`,
/// `"any"`, or any of those prefixed with `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    optional: bool,
    accepts: Vec<String>,
}

impl ParamSpec {
    /// Parse a single parameter declaration. Type names are case-insensitive
    /// and stored lowercase.
    pub fn parse(decl: &str) -> Result<Self> {
        let decl = decl.trim();
        let (optional, union) = match decl.strip_prefix('?') {
            Some(rest) => (true, rest),
            None => (false, decl),
        };
        let accepts: Vec<String> = union.split('|').map(|t| t.trim().to_lowercase()).collect();
        if accepts.iter().any(String::is_empty) {
            return Err(CinderError::Syntax(format!(
                "empty type name in parameter '{decl}'"
            )));
        }
        Ok(Self { optional, accepts })
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Type names in the union, in declaration order.
    pub fn types(&self) -> &[String] {
        &self.accepts
    }

    pub fn accepts_any(&self) -> bool {
        self.accepts.iter().any(|t| t == ANY_TYPE)
    }

    /// Whether the parameter wants the unresolved reference itself.
    pub fn accepts_variable(&self) -> bool {
        self.accepts.iter().any(|t| t == VARIABLE_TYPE)
    }

    pub fn accepts(&self, type_name: &str) -> bool {
        self.accepts_any() || self.accepts.iter().any(|t| t == type_name)
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            write!(f, "?")?;
        }
        write!(f, "{}", self.accepts.join("|"))
    }
}

/// Parse a full syntax declaration.
///
/// Optional parameters may only be followed by other optional parameters.
pub fn parse_syntax<S: AsRef<str>>(decls: &[S]) -> Result<Vec<ParamSpec>> {
    let mut params = Vec::with_capacity(decls.len());
    let mut seen_optional = false;
    for decl in decls {
        let param = ParamSpec::parse(decl.as_ref())?;
        if seen_optional && !param.is_optional() {
            return Err(CinderError::Syntax(format!(
                "required parameter '{param}' follows an optional one"
            )));
        }
        seen_optional |= param.is_optional();
        params.push(param);
    }
    Ok(params)
}

/// Bind `args` against `syntax`, resolving variables through `lookup`.
///
/// `lookup` receives uppercased variable names. On success the returned
/// values line up positionally with the leading parameters.
pub fn bind<F>(syntax: &[ParamSpec], args: &[Value], lookup: F) -> std::result::Result<Vec<Value>, ErrorCode>
where
    F: Fn(&str) -> Option<Value>,
{
    let mut bound = Vec::with_capacity(args.len());
    for i in 0..syntax.len().max(args.len()) {
        match (syntax.get(i), args.get(i)) {
            (None, _) => return Err(ErrorCode::TooManyArguments),
            (Some(param), None) => {
                if param.is_optional() {
                    break;
                }
                return Err(ErrorCode::TooFewArguments);
            },
            (Some(param), Some(arg)) => bound.push(check_argument(param, arg, &lookup)?),
        }
    }
    Ok(bound)
}

fn check_argument<F>(param: &ParamSpec, arg: &Value, lookup: &F) -> std::result::Result<Value, ErrorCode>
where
    F: Fn(&str) -> Option<Value>,
{
    let value = if arg.is_variable() && !param.accepts_variable() {
        resolve_variable(arg, lookup)?
    } else {
        arg.clone()
    };
    if param.accepts(value.type_name()) {
        Ok(value)
    } else {
        Err(ErrorCode::TypeMismatch)
    }
}

/// Substitute the stored value for a `variable` argument.
pub fn resolve_variable<F>(arg: &Value, lookup: &F) -> std::result::Result<Value, ErrorCode>
where
    F: Fn(&str) -> Option<Value>,
{
    let name = arg.variable_name().ok_or(ErrorCode::UnknownVariable)?;
    lookup(&name.to_uppercase()).ok_or_else(|| {
        log::debug!("unknown variable ${name}");
        ErrorCode::UnknownVariable
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn syntax(decls: &[&str]) -> Vec<ParamSpec> {
        parse_syntax(decls).unwrap()
    }

    fn num(n: f64) -> Value {
        Value::new(n, "number")
    }

    fn text(s: &str) -> Value {
        Value::new(s, "string")
    }

    fn no_vars(_: &str) -> Option<Value> {
        None
    }

    fn env(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn param_parse_plain() {
        let p = ParamSpec::parse("number").unwrap();
        assert!(!p.is_optional());
        assert_eq!(p.types(), ["number"]);
    }

    #[test]
    fn param_parse_optional_union() {
        let p = ParamSpec::parse("?number|string").unwrap();
        assert!(p.is_optional());
        assert!(p.accepts("number"));
        assert!(p.accepts("string"));
        assert!(!p.accepts("word"));
        assert_eq!(p.to_string(), "?number|string");
    }

    #[test]
    fn param_parse_lowercases_type_names() {
        let p = ParamSpec::parse("?Number|STRING").unwrap();
        assert_eq!(p.types(), ["number", "string"]);
        assert!(p.accepts("number"));
        assert_eq!(p.to_string(), "?number|string");
        assert!(ParamSpec::parse("ANY").unwrap().accepts_any());
        assert!(ParamSpec::parse("Variable").unwrap().accepts_variable());
    }

    #[test]
    fn mixed_case_declaration_binds() {
        let bound = bind(&syntax(&["Variable", "NUMBER"]), &[Value::variable("x"), num(2.0)], no_vars).unwrap();
        assert!(bound[0].is_variable());
        assert_eq!(bound[1], num(2.0));
    }

    #[test]
    fn bool_and_symbol_parameters() {
        let flag = Value::new(true, "bool");
        let op = Value::new(">=", "symbol");
        let s = syntax(&["number", "symbol", "number|bool"]);
        assert!(bind(&s, &[num(1.0), op.clone(), flag.clone()], no_vars).is_ok());
        assert_eq!(bind(&s, &[num(1.0), flag.clone(), num(2.0)], no_vars), Err(ErrorCode::TypeMismatch));
        let vars = env(&[("ON", flag.clone())]);
        let bound = bind(&syntax(&["bool"]), &[Value::variable("on")], |n| vars.get(n).cloned()).unwrap();
        assert_eq!(bound[0].as_bool(), Some(true));
    }

    #[test]
    fn param_parse_any() {
        let p = ParamSpec::parse("any").unwrap();
        assert!(p.accepts_any());
        assert!(p.accepts("anything"));
        assert!(!p.accepts_variable());
    }

    #[test]
    fn param_parse_rejects_empty() {
        assert!(ParamSpec::parse("").is_err());
        assert!(ParamSpec::parse("?").is_err());
        assert!(ParamSpec::parse("number|").is_err());
    }

    #[test]
    fn required_after_optional_rejected() {
        let err = parse_syntax(&["?number", "word"]).unwrap_err();
        assert!(matches!(err, CinderError::Syntax(_)));
        assert!(parse_syntax(&["number", "?word", "?any"]).is_ok());
    }

    #[test]
    fn exact_arity_binds() {
        let bound = bind(&syntax(&["number", "string"]), &[num(1.0), text("a")], no_vars).unwrap();
        assert_eq!(bound, vec![num(1.0), text("a")]);
    }

    #[test]
    fn too_many_arguments() {
        let r = bind(&syntax(&["number"]), &[num(1.0), num(2.0)], no_vars);
        assert_eq!(r, Err(ErrorCode::TooManyArguments));
        let r = bind(&[], &[num(1.0)], no_vars);
        assert_eq!(r, Err(ErrorCode::TooManyArguments));
    }

    #[test]
    fn too_few_arguments() {
        let r = bind(&syntax(&["number", "number"]), &[num(1.0)], no_vars);
        assert_eq!(r, Err(ErrorCode::TooFewArguments));
    }

    #[test]
    fn optional_trailing_may_be_omitted() {
        let bound = bind(&syntax(&["number", "?string", "?any"]), &[num(1.0)], no_vars).unwrap();
        assert_eq!(bound.len(), 1);
    }

    #[test]
    fn optional_supplied_is_checked() {
        let r = bind(&syntax(&["?number"]), &[text("x")], no_vars);
        assert_eq!(r, Err(ErrorCode::TypeMismatch));
    }

    #[test]
    fn type_mismatch() {
        let r = bind(&syntax(&["number"]), &[text("five")], no_vars);
        assert_eq!(r, Err(ErrorCode::TypeMismatch));
    }

    #[test]
    fn union_accepts_each_member() {
        let s = syntax(&["number|string"]);
        assert!(bind(&s, &[num(5.0)], no_vars).is_ok());
        assert!(bind(&s, &[text("5")], no_vars).is_ok());
    }

    #[test]
    fn variable_parameter_keeps_reference() {
        let bound = bind(&syntax(&["variable", "number|string"]), &[Value::variable("x"), num(5.0)], no_vars)
            .unwrap();
        assert!(bound[0].is_variable());
        assert_eq!(bound[0].variable_name(), Some("x"));
    }

    #[test]
    fn variable_resolves_for_concrete_parameter() {
        let vars = env(&[("HP", num(10.0))]);
        let bound = bind(&syntax(&["number"]), &[Value::variable("hp")], |n| vars.get(n).cloned()).unwrap();
        assert_eq!(bound, vec![num(10.0)]);
    }

    #[test]
    fn variable_resolves_for_any() {
        let vars = env(&[("NAME", text("bob"))]);
        let bound = bind(&syntax(&["any"]), &[Value::variable("name")], |n| vars.get(n).cloned()).unwrap();
        assert_eq!(bound[0].as_text(), Some("bob"));
    }

    #[test]
    fn unknown_variable() {
        let r = bind(&syntax(&["any"]), &[Value::variable("undefined")], no_vars);
        assert_eq!(r, Err(ErrorCode::UnknownVariable));
    }

    #[test]
    fn resolved_value_is_type_checked() {
        let vars = env(&[("NAME", text("bob"))]);
        let r = bind(&syntax(&["number"]), &[Value::variable("name")], |n| vars.get(n).cloned());
        assert_eq!(r, Err(ErrorCode::TypeMismatch));
    }

    #[test]
    fn resolve_variable_uppercases_lookup() {
        let vars = env(&[("MIXED", num(1.0))]);
        let lookup = |n: &str| vars.get(n).cloned();
        assert_eq!(resolve_variable(&Value::variable("MiXeD"), &lookup), Ok(num(1.0)));
    }

    #[test]
    fn resolve_non_variable_is_unknown() {
        assert_eq!(resolve_variable(&num(1.0), &no_vars), Err(ErrorCode::UnknownVariable));
    }

    #[test]
    fn errors_stop_at_first_bad_argument() {
        // Arity is only reported once earlier arguments bound cleanly.
        let r = bind(&syntax(&["number"]), &[text("x"), num(1.0)], no_vars);
        assert_eq!(r, Err(ErrorCode::TypeMismatch));
    }
}
