//! Positional argument binding and typed handlers.
//!
//! A [`Handler`] pairs a user function with a [`Signature`]: the kinds of
//! its fixed positional parameters and, optionally, the element kind of a
//! trailing variadic parameter. The signature is built once when the
//! handler is registered; [`bind`] then converts positional tokens against
//! it and the handler's dispatcher hands the typed values to the function.
//!
//! # Examples
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use command_tree_core::{Argument, Command, Handler};
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//!
//! let cp = Command::new("cp")
//!     .with_arg(Argument::required("dest", "Destination"))
//!     .handler(Handler::variadic1(move |_ctx, _inv, dest: String, sources: Vec<String>| {
//!         sink.borrow_mut().push(format!("{} <- {}", dest, sources.join(",")));
//!         Ok(())
//!     }));
//!
//! cp.execute_with_args(["out", "a.txt", "b.txt"]).unwrap();
//! assert_eq!(seen.borrow().as_slice(), ["out <- a.txt,b.txt"]);
//! ```

use std::fmt;

use tracing::debug;

use crate::command::Argument;
use crate::context::Context;
use crate::error::{BoxError, Error, Result};
use crate::resolve::Invocation;
use crate::value::{ArgValue, ConversionError, Value, ValueKind, convert};

/// Parameter description of a handler: fixed slots plus an optional
/// variadic tail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    fixed: Vec<ValueKind>,
    variadic: Option<ValueKind>,
}

impl Signature {
    pub fn new(fixed: Vec<ValueKind>, variadic: Option<ValueKind>) -> Self {
        Self { fixed, variadic }
    }

    /// Kinds of the fixed parameters, in order.
    pub fn fixed(&self) -> &[ValueKind] {
        &self.fixed
    }

    /// Element kind of the trailing variadic parameter.
    pub fn variadic(&self) -> Option<ValueKind> {
        self.variadic
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }
}

/// Converted positional values ready for dispatch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    /// One value per fixed parameter.
    pub fixed: Vec<Value>,
    /// Values collected by the variadic parameter.
    pub rest: Vec<Value>,
}

type HandlerFn = dyn Fn(&Context, &Invocation<'_>, BoundArgs) -> std::result::Result<(), BoxError>;

/// A command body with typed positional parameters.
///
/// Constructors are named by shape: `fixedN` takes N typed parameters,
/// `variadicN` takes N typed parameters followed by a `Vec<T>` that
/// collects the remaining tokens.
pub struct Handler {
    signature: Signature,
    call: Box<HandlerFn>,
}

macro_rules! fixed_handler {
    ($(#[$doc:meta])* $name:ident => $($param:ident),+) => {
        $(#[$doc])*
        pub fn $name<$($param,)+ F>(f: F) -> Self
        where
            $($param: ArgValue,)+
            F: Fn(&Context, &Invocation<'_>, $($param),+) -> std::result::Result<(), BoxError>
                + 'static,
        {
            let signature = Signature::new(vec![$(<$param as ArgValue>::KIND),+], None);
            Self::from_parts(signature, move |ctx, invocation, args| {
                let mut fixed = args.fixed.into_iter();
                f(ctx, invocation, $(take::<$param>(&mut fixed)?),+)
            })
        }
    };
}

macro_rules! variadic_handler {
    ($(#[$doc:meta])* $name:ident => $($param:ident),*) => {
        $(#[$doc])*
        pub fn $name<$($param,)* V, F>(f: F) -> Self
        where
            $($param: ArgValue,)*
            V: ArgValue,
            F: Fn(&Context, &Invocation<'_>, $($param,)* Vec<V>)
                -> std::result::Result<(), BoxError>
                + 'static,
        {
            let signature = Signature::new(
                vec![$(<$param as ArgValue>::KIND),*],
                Some(<V as ArgValue>::KIND),
            );
            Self::from_parts(signature, move |ctx, invocation, args| {
                let BoundArgs { fixed, rest } = args;
                #[allow(unused_mut, unused_variables)]
                let mut fixed = fixed.into_iter();
                let rest = rest
                    .into_iter()
                    .map(extract::<V>)
                    .collect::<std::result::Result<Vec<V>, BoxError>>()?;
                f(ctx, invocation, $(take::<$param>(&mut fixed)?,)* rest)
            })
        }
    };
}

impl Handler {
    /// A handler without positional parameters.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Context, &Invocation<'_>) -> std::result::Result<(), BoxError> + 'static,
    {
        Self::from_parts(Signature::default(), move |ctx, invocation, _args| {
            f(ctx, invocation)
        })
    }

    fn from_parts<F>(signature: Signature, call: F) -> Self
    where
        F: Fn(&Context, &Invocation<'_>, BoundArgs) -> std::result::Result<(), BoxError>
            + 'static,
    {
        Self {
            signature,
            call: Box::new(call),
        }
    }

    fixed_handler!(
        /// A handler with one typed parameter.
        fixed1 => A
    );
    fixed_handler!(
        /// A handler with two typed parameters.
        fixed2 => A, B
    );
    fixed_handler!(fixed3 => A, B, C);
    fixed_handler!(fixed4 => A, B, C, D);

    variadic_handler!(
        /// A handler whose only parameter collects every positional token.
        variadic0 =>
    );
    variadic_handler!(
        /// One typed parameter followed by a variadic tail.
        variadic1 => A
    );
    variadic_handler!(variadic2 => A, B);
    variadic_handler!(variadic3 => A, B, C);

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn call(
        &self,
        ctx: &Context,
        invocation: &Invocation<'_>,
        args: BoundArgs,
    ) -> std::result::Result<(), BoxError> {
        (self.call)(ctx, invocation, args)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

fn take<T: ArgValue>(
    values: &mut std::vec::IntoIter<Value>,
) -> std::result::Result<T, BoxError> {
    let value = values
        .next()
        .ok_or_else(|| format!("no bound value for {} parameter", T::KIND))?;
    extract(value)
}

fn extract<T: ArgValue>(value: Value) -> std::result::Result<T, BoxError> {
    let kind = value.kind();
    T::from_value(value)
        .ok_or_else(|| format!("bound {kind} value to a {} parameter", T::KIND).into())
}

/// Binds positional `tokens` to `signature`.
///
/// - Fixed parameter `i` takes token `i`, converted to its kind. A missing
///   token yields the zero value unless declaration `i` is required.
/// - Declarations past the fixed parameters are never enforced.
/// - A variadic tail collects every remaining token; none is fine.
/// - Without a variadic tail, more tokens than declarations is an error.
///
/// # Errors
///
/// [`Error::TooManyArguments`], [`Error::MissingArgument`] or
/// [`Error::InvalidArgument`].
pub fn bind(
    declared: &[Argument],
    signature: &Signature,
    tokens: &[String],
    command: &str,
) -> Result<BoundArgs> {
    if !signature.is_variadic() && tokens.len() > declared.len() {
        return Err(Error::TooManyArguments {
            expected: declared.len(),
            actual: tokens.len(),
            command: command.to_string(),
        });
    }

    // Only positions with a fixed parameter are enforced.
    let checked = declared.len().min(signature.fixed().len());
    if let Some(missing) = declared
        .iter()
        .take(checked)
        .skip(tokens.len())
        .find(|arg| arg.required)
    {
        return Err(Error::MissingArgument {
            argument: missing.name.clone(),
            command: command.to_string(),
        });
    }

    let mut fixed = Vec::with_capacity(signature.fixed().len());
    for (idx, kind) in signature.fixed().iter().copied().enumerate() {
        let value = match tokens.get(idx) {
            Some(token) => convert(token, kind)
                .map_err(|source| invalid_argument(declared, idx, command, source))?,
            None => Value::zero(kind),
        };
        fixed.push(value);
    }

    let rest = match signature.variadic() {
        Some(kind) => tokens
            .iter()
            .enumerate()
            .skip(signature.fixed().len())
            .map(|(idx, token)| {
                convert(token, kind)
                    .map_err(|source| invalid_argument(declared, idx, command, source))
            })
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    debug!(
        command,
        fixed = fixed.len(),
        variadic = rest.len(),
        "Bound positional arguments"
    );
    Ok(BoundArgs { fixed, rest })
}

fn invalid_argument(
    declared: &[Argument],
    idx: usize,
    command: &str,
    source: ConversionError,
) -> Error {
    let argument = declared
        .get(idx)
        .map(|arg| arg.name.clone())
        .unwrap_or_else(|| format!("#{}", idx + 1));
    Error::InvalidArgument {
        argument,
        command: command.to_string(),
        source,
    }
}
