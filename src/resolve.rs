use crate::error::ResolutionError;
use crate::mem::NativeAddress;
use fnv::FnvHashMap;
use std::fmt::{Display, Formatter};

/// A deferred, unevaluated callable expression.
///
/// The resolver never evaluates these; it only validates their shape and
/// extracts the referenced symbol. The rendered form is quoted in
/// resolution failures.
#[derive(Clone, Debug)]
pub enum Expr {
    /// A direct call to a named function: `frob()`.
    Call(String),
    /// A plain member access on a named property: `visible`.
    Member(String),
    /// An arithmetic combination of two subexpressions.
    Binary(char, Box<Expr>, Box<Expr>),
    /// A call chained onto the result of another expression: `recv().next()`.
    Chain(Box<Expr>, String),
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Call(name) => write!(f, "{name}()"),
            Expr::Member(name) => write!(f, "{name}"),
            Expr::Binary(op, lhs, rhs) => write!(f, "({lhs} {op} {rhs})"),
            Expr::Chain(receiver, name) => write!(f, "{receiver}.{name}()"),
        }
    }
}

/// One callable known to the host, with its resolved native entry point.
#[derive(Clone, Debug)]
pub struct MethodHandle {
    pub name: String,
    pub entry: NativeAddress,
    /// Informational only; resolution never filters on visibility, since
    /// most detour targets are internal to the host framework.
    pub public: bool,
}

/// A property and its accessors. Either accessor may be absent.
#[derive(Clone, Debug)]
pub struct PropertyHandle {
    pub name: String,
    pub getter: Option<MethodHandle>,
    pub setter: Option<MethodHandle>,
}

/// Host-side metadata lookup.
///
/// Implementations must surface non-public members; lookup is by name at
/// runtime, never compile-time binding.
pub trait Introspect {
    fn function(&self, name: &str) -> Option<&MethodHandle>;
    fn property(&self, name: &str) -> Option<&PropertyHandle>;
}

/// In-memory [`Introspect`] implementation for hosts that register their
/// callables up front.
#[derive(Default)]
pub struct MethodTable {
    functions: FnvHashMap<String, MethodHandle>,
    properties: FnvHashMap<String, PropertyHandle>,
}

impl MethodTable {
    pub fn new() -> MethodTable {
        MethodTable::default()
    }

    pub fn insert_function(&mut self, handle: MethodHandle) {
        self.functions.insert(handle.name.clone(), handle);
    }

    pub fn insert_property(&mut self, handle: PropertyHandle) {
        self.properties.insert(handle.name.clone(), handle);
    }
}

impl Introspect for MethodTable {
    fn function(&self, name: &str) -> Option<&MethodHandle> {
        self.functions.get(name)
    }

    fn property(&self, name: &str) -> Option<&PropertyHandle> {
        self.properties.get(name)
    }
}

/// A validated route from an expression shape to a native entry address.
///
/// Pure metadata lookup: no side effects, and the referenced callable is
/// never invoked.
pub trait AddressResolvable {
    fn resolve(&self, host: &dyn Introspect) -> Result<NativeAddress, ResolutionError>;
}

/// The function named by a single direct call expression.
pub struct DirectFunction<'e>(pub &'e Expr);

/// The read accessor of the property named by a member access expression.
pub struct PropertyGetter<'e>(pub &'e Expr);

/// The write accessor of the property named by a member access expression.
pub struct PropertySetter<'e>(pub &'e Expr);

impl DirectFunction<'_> {
    pub fn handle<'h>(&self, host: &'h dyn Introspect) -> Result<&'h MethodHandle, ResolutionError> {
        let Expr::Call(name) = self.0 else {
            return Err(ResolutionError::NotACall(self.0.to_string()));
        };
        host.function(name)
            .ok_or_else(|| ResolutionError::UnknownFunction(name.clone()))
    }
}

impl AddressResolvable for DirectFunction<'_> {
    fn resolve(&self, host: &dyn Introspect) -> Result<NativeAddress, ResolutionError> {
        self.handle(host).map(|m| m.entry)
    }
}

impl PropertyGetter<'_> {
    pub fn handle<'h>(&self, host: &'h dyn Introspect) -> Result<&'h MethodHandle, ResolutionError> {
        let property = property_of(self.0, host)?;
        property
            .getter
            .as_ref()
            .ok_or_else(|| ResolutionError::MissingGetter(property.name.clone()))
    }
}

impl AddressResolvable for PropertyGetter<'_> {
    fn resolve(&self, host: &dyn Introspect) -> Result<NativeAddress, ResolutionError> {
        self.handle(host).map(|m| m.entry)
    }
}

impl PropertySetter<'_> {
    pub fn handle<'h>(&self, host: &'h dyn Introspect) -> Result<&'h MethodHandle, ResolutionError> {
        let property = property_of(self.0, host)?;
        property
            .setter
            .as_ref()
            .ok_or_else(|| ResolutionError::MissingSetter(property.name.clone()))
    }
}

impl AddressResolvable for PropertySetter<'_> {
    fn resolve(&self, host: &dyn Introspect) -> Result<NativeAddress, ResolutionError> {
        self.handle(host).map(|m| m.entry)
    }
}

fn property_of<'h>(
    expr: &Expr,
    host: &'h dyn Introspect,
) -> Result<&'h PropertyHandle, ResolutionError> {
    let Expr::Member(name) = expr else {
        return Err(ResolutionError::NotAMemberAccess(expr.to_string()));
    };
    host.property(name)
        .ok_or_else(|| ResolutionError::UnknownProperty(name.clone()))
}

/// Entry address of the function called by a single direct call expression.
pub fn resolve_call(
    expr: &Expr,
    host: &dyn Introspect,
) -> Result<NativeAddress, ResolutionError> {
    DirectFunction(expr).resolve(host)
}

/// Entry address of a property's read accessor.
pub fn resolve_getter(
    expr: &Expr,
    host: &dyn Introspect,
) -> Result<NativeAddress, ResolutionError> {
    PropertyGetter(expr).resolve(host)
}

/// Entry address of a property's write accessor.
pub fn resolve_setter(
    expr: &Expr,
    host: &dyn Introspect,
) -> Result<NativeAddress, ResolutionError> {
    PropertySetter(expr).resolve(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> MethodTable {
        let mut table = MethodTable::new();
        table.insert_function(MethodHandle {
            name: "create_dropdown".into(),
            entry: 0x1000,
            public: false,
        });
        table.insert_function(MethodHandle {
            name: "replacement".into(),
            entry: 0x2000,
            public: true,
        });
        table.insert_property(PropertyHandle {
            name: "visible".into(),
            getter: Some(MethodHandle {
                name: "get_visible".into(),
                entry: 0x3000,
                public: false,
            }),
            setter: Some(MethodHandle {
                name: "set_visible".into(),
                entry: 0x3100,
                public: false,
            }),
        });
        table.insert_property(PropertyHandle {
            name: "read_only".into(),
            getter: Some(MethodHandle {
                name: "get_read_only".into(),
                entry: 0x3200,
                public: true,
            }),
            setter: None,
        });
        table
    }

    #[test]
    fn resolves_a_direct_call() {
        let host = host();
        let expr = Expr::Call("replacement".into());
        assert_eq!(resolve_call(&expr, &host).unwrap(), 0x2000);
    }

    #[test]
    fn resolves_non_public_callables() {
        let host = host();
        assert_eq!(
            resolve_call(&Expr::Call("create_dropdown".into()), &host).unwrap(),
            0x1000
        );
        assert_eq!(
            resolve_getter(&Expr::Member("visible".into()), &host).unwrap(),
            0x3000
        );
        assert_eq!(
            resolve_setter(&Expr::Member("visible".into()), &host).unwrap(),
            0x3100
        );
    }

    #[test]
    fn rejects_arithmetic_expressions() {
        let host = host();
        let expr = Expr::Binary(
            '+',
            Box::new(Expr::Call("count".into())),
            Box::new(Expr::Call("offset".into())),
        );
        let err = resolve_call(&expr, &host).unwrap_err();
        assert!(matches!(err, ResolutionError::NotACall(_)));
        // The failure quotes the rendered expression.
        assert!(err.to_string().contains("(count() + offset())"));
    }

    #[test]
    fn rejects_chained_calls() {
        let host = host();
        let expr = Expr::Chain(Box::new(Expr::Call("editor".into())), "toolbar".into());
        assert!(matches!(
            resolve_call(&expr, &host),
            Err(ResolutionError::NotACall(_))
        ));
        assert!(matches!(
            resolve_getter(&expr, &host),
            Err(ResolutionError::NotAMemberAccess(_))
        ));
    }

    #[test]
    fn rejects_shape_mismatches() {
        let host = host();
        // A member access is not a call, and a call is not a member access.
        assert!(matches!(
            resolve_call(&Expr::Member("visible".into()), &host),
            Err(ResolutionError::NotACall(_))
        ));
        assert!(matches!(
            resolve_getter(&Expr::Call("replacement".into()), &host),
            Err(ResolutionError::NotAMemberAccess(_))
        ));
        assert!(matches!(
            resolve_setter(&Expr::Call("replacement".into()), &host),
            Err(ResolutionError::NotAMemberAccess(_))
        ));
    }

    #[test]
    fn rejects_unknown_symbols() {
        let host = host();
        assert!(matches!(
            resolve_call(&Expr::Call("missing".into()), &host),
            Err(ResolutionError::UnknownFunction(_))
        ));
        assert!(matches!(
            resolve_getter(&Expr::Member("missing".into()), &host),
            Err(ResolutionError::UnknownProperty(_))
        ));
    }

    #[test]
    fn rejects_missing_accessors() {
        let host = host();
        let expr = Expr::Member("read_only".into());
        assert_eq!(resolve_getter(&expr, &host).unwrap(), 0x3200);
        assert!(matches!(
            resolve_setter(&expr, &host),
            Err(ResolutionError::MissingSetter(_))
        ));
    }

    #[test]
    fn resolution_is_a_pure_lookup() {
        let host = host();
        let expr = Expr::Call("replacement".into());
        let first = resolve_call(&expr, &host).unwrap();
        assert_eq!(resolve_call(&expr, &host).unwrap(), first);
    }

    #[test]
    fn handles_carry_names_for_diagnostics() {
        let host = host();
        let handle = DirectFunction(&Expr::Call("create_dropdown".into()))
            .handle(&host)
            .unwrap();
        assert_eq!(handle.name, "create_dropdown");
        assert!(!handle.public);

        let accessor = PropertySetter(&Expr::Member("visible".into()))
            .handle(&host)
            .unwrap();
        assert_eq!(accessor.name, "set_visible");
    }
}
