// Variadic front ends: parameters as `spec => value` pairs, message as format arguments
//
//     lll_print!("?0:at $0?1|:$1||:: %m", ["%s" => file!(), "%d" => line!()], "failed: {}", err);

/// Build a `ParamTable` from `spec => value` pairs
#[macro_export]
macro_rules! params {
    () => {
        $crate::ParamTable::new()
    };
    ($($spec:expr => $value:expr),+ $(,)?) => {
        $crate::ParamTable::from_pairs([$(($spec, $crate::Value::from($value))),+])
    };
}

/// Render a line into a `String`
#[macro_export]
macro_rules! lll_render {
    ($template:expr, [$($spec:expr => $value:expr),* $(,)?], $($arg:tt)+) => {
        $crate::render($template, &$crate::params!($($spec => $value),*), format_args!($($arg)+))
    };
    ($template:expr, $($arg:tt)+) => {
        $crate::render($template, &$crate::ParamTable::new(), format_args!($($arg)+))
    };
}

/// Render a line to an `io::Write`
#[macro_export]
macro_rules! lll_fprint {
    ($stream:expr, $template:expr, [$($spec:expr => $value:expr),* $(,)?], $($arg:tt)+) => {
        $crate::fprint(
            $stream,
            $template,
            &$crate::params!($($spec => $value),*),
            format_args!($($arg)+),
        )
    };
    ($stream:expr, $template:expr, $($arg:tt)+) => {
        $crate::fprint($stream, $template, &$crate::ParamTable::new(), format_args!($($arg)+))
    };
}

/// Render a line to standard output
#[macro_export]
macro_rules! lll_print {
    ($template:expr, [$($spec:expr => $value:expr),* $(,)?], $($arg:tt)+) => {
        $crate::print($template, &$crate::params!($($spec => $value),*), format_args!($($arg)+))
    };
    ($template:expr, $($arg:tt)+) => {
        $crate::print($template, &$crate::ParamTable::new(), format_args!($($arg)+))
    };
}

/// Append a line to the file at a path
#[macro_export]
macro_rules! lll_pprint {
    ($path:expr, $template:expr, [$($spec:expr => $value:expr),* $(,)?], $($arg:tt)+) => {
        $crate::pprint(
            $path,
            $template,
            &$crate::params!($($spec => $value),*),
            format_args!($($arg)+),
        )
    };
    ($path:expr, $template:expr, $($arg:tt)+) => {
        $crate::pprint($path, $template, &$crate::ParamTable::new(), format_args!($($arg)+))
    };
}

/// Log through a `Logger` at a level
#[macro_export]
macro_rules! lll_log {
    ($logger:expr, $level:expr, [$($spec:expr => $value:expr),* $(,)?], $($arg:tt)+) => {
        $logger.log($level, &$crate::params!($($spec => $value),*), format_args!($($arg)+))
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, &$crate::ParamTable::new(), format_args!($($arg)+))
    };
}
