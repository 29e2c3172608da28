//! # Step Decorator Module / 步骤装饰器模块
//!
//! Wraps callables so that each invocation runs inside a step, without the callable's
//! body touching the tracker. Works the same for free functions, fixture factories,
//! closures and methods (wrapped through their `Type::method` path, with the
//! receiver passed as the first argument).
//!
//! 包装可调用对象，使每次调用都在一个步骤中运行，而无需可调用对象的函数体接触跟踪器。
//! 对自由函数、fixture 工厂、闭包和方法（通过 `Type::method` 路径包装，
//! 接收者作为第一个参数传递）的处理方式相同。

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;

use crate::core::tracker::Tracker;

/// Name used when neither an explicit title nor a declared name is available.
pub const FALLBACK_STEP_NAME: &str = "step";

/// Longest title taken from a doc string, in characters.
const MAX_DOC_TITLE: usize = 64;

/// A callable invocable with its arguments packed in a tuple.
///
/// Implemented for every `Fn` of up to six arguments, so wrapping never changes how
/// arguments are passed or what is returned.
pub trait StepFn<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_step_fn {
    ($($arg:ident),*) => {
        impl<Func, Out, $($arg),*> StepFn<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Out,
        {
            type Output = Out;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Out {
                (self)($($arg),*)
            }
        }
    };
}

impl_step_fn!();
impl_step_fn!(A1);
impl_step_fn!(A1, A2);
impl_step_fn!(A1, A2, A3);
impl_step_fn!(A1, A2, A3, A4);
impl_step_fn!(A1, A2, A3, A4, A5);
impl_step_fn!(A1, A2, A3, A4, A5, A6);

/// Derives a step name from a callable's type name.
///
/// Function items yield their declared name (`crate::module::login` -> `login`), methods
/// their method name (also on generic types, `Wrapper<T>::get` -> `get`), closures the name
/// of the function that defines them. Anything else (function pointers, trait objects)
/// yields [`FALLBACK_STEP_NAME`].
///
/// 从可调用对象的类型名推导步骤名称。
pub fn declared_name(type_name: &str) -> Cow<'_, str> {
    match without_generics(type_name) {
        Cow::Borrowed(path) => Cow::Borrowed(last_segment(path)),
        Cow::Owned(path) => Cow::Owned(last_segment(&path).to_string()),
    }
}

/// Drops every balanced `<...>` group, so only the outer path remains.
fn without_generics(type_name: &str) -> Cow<'_, str> {
    if !type_name.contains('<') {
        return Cow::Borrowed(type_name);
    }
    let mut path = String::with_capacity(type_name.len());
    let mut depth = 0usize;
    for c in type_name.chars() {
        match c {
            '<' => depth += 1,
            '>' if depth > 0 => depth -= 1,
            c if depth == 0 => path.push(c),
            _ => {}
        }
    }
    Cow::Owned(path)
}

fn last_segment(path: &str) -> &str {
    if path.contains(['(', ' ', '&', '*', '[']) {
        return FALLBACK_STEP_NAME;
    }
    path.rsplit("::")
        .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .unwrap_or(FALLBACK_STEP_NAME)
}

/// Takes a short title from the leading fragment of a doc string:
/// the first non-empty line, cut at the first sentence end, at most 64 characters.
///
/// 从文档字符串的开头片段中提取简短标题。
pub fn title_from_doc(doc: &str) -> Option<String> {
    let line = doc.lines().map(str::trim).find(|line| !line.is_empty())?;
    let sentence = match line.find(". ") {
        Some(end) => &line[..end],
        None => line.strip_suffix('.').unwrap_or(line),
    };
    let title: String = sentence.chars().take(MAX_DOC_TITLE).collect();
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_string())
}

/// A callable whose every invocation is bracketed by a step.
/// 每次调用都被一个步骤包围的可调用对象。
#[derive(Clone)]
pub struct Stepped<F> {
    name: Cow<'static, str>,
    func: F,
}

impl<F> fmt::Debug for Stepped<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stepped")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Stepped<F> {
    /// Wraps `func`, naming the step after the callable's declared name.
    pub fn new(func: F) -> Self {
        Self {
            name: declared_name(type_name::<F>()),
            func,
        }
    }

    /// Wraps `func` under an explicit step name.
    pub fn named(name: impl Into<Cow<'static, str>>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }

    /// Wraps `func`, naming the step from the leading fragment of `doc`.
    /// Falls back to the declared name when `doc` has no usable text.
    pub fn documented(doc: &str, func: F) -> Self {
        match title_from_doc(doc) {
            Some(title) => Self::named(title, func),
            None => Self::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gives back the unwrapped callable.
    pub fn into_inner(self) -> F {
        self.func
    }

    /// Invokes the callable inside a step. The step passes unless the callable panics.
    pub fn call<Args>(&self, tracker: &Tracker, args: Args) -> F::Output
    where
        F: StepFn<Args>,
    {
        tracker.step(self.name.clone(), || self.func.invoke(args))
    }

    /// Invokes a fallible callable inside a step; `Err` fails (or skips) the step.
    pub fn try_call<Args, T, E>(&self, tracker: &Tracker, args: Args) -> Result<T, E>
    where
        F: StepFn<Args, Output = Result<T, E>>,
        E: 'static,
    {
        tracker.try_step(self.name.clone(), || self.func.invoke(args))
    }

    /// Binds the wrapper to a tracker, producing a plain callable over tuple arguments.
    pub fn bind<'a, Args>(&'a self, tracker: &'a Tracker) -> impl Fn(Args) -> F::Output + 'a
    where
        F: StepFn<Args>,
    {
        move |args| self.call(tracker, args)
    }
}

/// Support items for [`step_fn!`](crate::step_fn). Not part of the public API.
#[doc(hidden)]
pub mod __private {
    use crate::core::models::Status;
    use crate::core::tracker::outcome_of;

    pub struct Classified<'a, R>(pub &'a R);

    pub trait ResultStatus {
        fn status(&self) -> Status;
    }

    impl<T, E: 'static> ResultStatus for Classified<'_, Result<T, E>> {
        fn status(&self) -> Status {
            outcome_of(self.0)
        }
    }

    pub trait PlainStatus {
        fn status(&self) -> Status;
    }

    impl<R> PlainStatus for &Classified<'_, R> {
        fn status(&self) -> Status {
            Status::Passed
        }
    }
}

/// Declares a function (or a `&self` / `&mut self` method) whose body runs inside a step.
///
/// The step is named by a `#[step("title")]` attribute, placed anywhere among the item's
/// attributes, or else by the function's declared name. The first parameter after the
/// receiver must be the tracker. Functions returning `Result` are classified like
/// [`Tracker::try_step`], all others like [`Tracker::step`].
///
/// ```
/// use step_report::{step_fn, Tracker};
///
/// step_fn! {
///     #[step("add numbers")]
///     fn add(tracker: &Tracker, a: i32, b: i32) -> i32 {
///         a + b
///     }
/// }
///
/// step_fn! {
///     /// Named `check` in the report.
///     fn check(tracker: &Tracker, value: i32) -> Result<i32, String> {
///         if value > 0 { Ok(value) } else { Err("negative".into()) }
///     }
/// }
/// # let _ = (add, check);
/// ```
#[macro_export]
macro_rules! step_fn {
    (@titled ($title:expr)
        $(#[$attr:meta])*
        $vis:vis fn $name:ident (&mut $recv:ident, $tracker:ident : $tty:ty $(, $arg:ident : $aty:ty)* $(,)?)
        $(-> $ret:ty)? $body:block
    ) => {
        $(#[$attr])*
        $vis fn $name(&mut $recv, $tracker: $tty $(, $arg: $aty)*) $(-> $ret)? {
            $crate::step_fn!(@body $tracker, $title, $(-> $ret)? $body)
        }
    };
    (@titled ($title:expr)
        $(#[$attr:meta])*
        $vis:vis fn $name:ident (&$recv:ident, $tracker:ident : $tty:ty $(, $arg:ident : $aty:ty)* $(,)?)
        $(-> $ret:ty)? $body:block
    ) => {
        $(#[$attr])*
        $vis fn $name(&$recv, $tracker: $tty $(, $arg: $aty)*) $(-> $ret)? {
            $crate::step_fn!(@body $tracker, $title, $(-> $ret)? $body)
        }
    };
    (@titled ($title:expr)
        $(#[$attr:meta])*
        $vis:vis fn $name:ident ($tracker:ident : $tty:ty $(, $arg:ident : $aty:ty)* $(,)?)
        $(-> $ret:ty)? $body:block
    ) => {
        $(#[$attr])*
        $vis fn $name($tracker: $tty $(, $arg: $aty)*) $(-> $ret)? {
            $crate::step_fn!(@body $tracker, $title, $(-> $ret)? $body)
        }
    };
    (@body $tracker:ident, $title:expr, $body:block) => {
        $crate::step_fn!(@body $tracker, $title, -> () $body)
    };
    (@body $tracker:ident, $title:expr, -> $ret:ty $body:block) => {{
        let (__output, __guard) = $tracker.enter($title, || -> $ret { $body });
        let __status = {
            #[allow(unused_imports)]
            use $crate::core::decorator::__private::{PlainStatus as _, ResultStatus as _};
            (&$crate::core::decorator::__private::Classified(&__output)).status()
        };
        __guard.finish(__status);
        __output
    }};
    // Attribute scan: `#[step(..)]` is taken out, every other attribute is kept in order.
    (@attrs [$($kept:tt)*] [$($title:tt)*] #[step($found:expr)] $($rest:tt)*) => {
        $crate::step_fn!(@attrs [$($kept)*] [($found)] $($rest)*);
    };
    (@attrs [$($kept:tt)*] [$($title:tt)*] #[$attr:meta] $($rest:tt)*) => {
        $crate::step_fn!(@attrs [$($kept)* #[$attr]] [$($title)*] $($rest)*);
    };
    (@attrs [$($kept:tt)*] [] $vis:vis fn $name:ident $($rest:tt)*) => {
        $crate::step_fn!(@titled (stringify!($name)) $($kept)* $vis fn $name $($rest)*);
    };
    (@attrs [$($kept:tt)*] [($title:expr)] $vis:vis fn $name:ident $($rest:tt)*) => {
        $crate::step_fn!(@titled ($title) $($kept)* $vis fn $name $($rest)*);
    };
    (#[$($attr:tt)*] $($rest:tt)*) => {
        $crate::step_fn!(@attrs [] [] #[$($attr)*] $($rest)*);
    };
    ($vis:vis fn $($rest:tt)*) => {
        $crate::step_fn!(@attrs [] [] $vis fn $($rest)*);
    };
}
