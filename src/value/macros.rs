pub use super::Value;

#[macro_export]
macro_rules! value {
    (str $it:expr) => {
        $crate::Value::Str($it.into())
    };

    (int $it:expr) => {
        $crate::Value::Int($it)
    };

    (float $it:expr) => {
        $crate::Value::Float($it)
    };

    (bool $it:expr) => {
        $crate::Value::Bool($it)
    };

    (list $($it:expr),* $(,)?) => {
        $crate::Value::List(::im::vector![$($it),*])
    };

    (nil) => {
        $crate::Value::Nil
    };

    ($it:expr) => {
        $crate::Value::from($it)
    };
}

/// Builds `CallArgs`: positional values first, then `name => value` pairs.
///
/// ```ignore
/// call_args![1, 2; "c" => 4]
/// ```
#[macro_export]
macro_rules! call_args {
    ($($pos:expr),* $(,)? $(; $($name:literal => $named:expr),* $(,)?)?) => {{
        #[allow(unused_mut)]
        let mut args = $crate::init::CallArgs::new();
        $( args = args.arg($pos); )*
        $($( args = args.kwarg($name, $named); )*)?
        args
    }};
}
