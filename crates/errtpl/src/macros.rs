/// Build a [`Params`](crate::Params) map.
///
/// Keys are anything `String::from` accepts; values are anything that
/// implements `serde::Serialize`.
///
/// ```
/// use errtpl::params;
///
/// let p = params! { "user" => "ada", "attempts" => 3 };
/// assert_eq!(p["attempts"], 3);
///
/// let empty = params! {};
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::Params::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut __params = $crate::Params::new();
        $(
            __params.insert(::std::string::String::from($key), $crate::to_param(&$value));
        )+
        __params
    }};
}

/// Return early with an error value if a condition is false.
///
/// The error is converted with `.into()`, so the enclosing function may
/// return any error type that has `From<ErrorValue>`.
///
/// ```ignore
/// ensure!(user_id > 0, ERR_BAD_USER);
/// ensure!(user_id > 0, ERR_BAD_USER, params! { "id" => user_id });
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $handle:expr $(,)?) => {
        if !$cond {
            return ::std::result::Result::Err($handle.error().into());
        }
    };
    ($cond:expr, $handle:expr, $params:expr $(,)?) => {
        if !$cond {
            return ::std::result::Result::Err($handle.error_with($params).into());
        }
    };
}

/// Return early with an error value.
///
/// ```ignore
/// bail!(ERR_NOT_FOUND, params! { "path" => path });
/// ```
#[macro_export]
macro_rules! bail {
    ($handle:expr $(,)?) => {
        return ::std::result::Result::Err($handle.error().into())
    };
    ($handle:expr, $params:expr $(,)?) => {
        return ::std::result::Result::Err($handle.error_with($params).into())
    };
}
