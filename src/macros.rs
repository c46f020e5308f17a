// src/macros.rs
//! Small string helpers used across log lines, paths and options.

/// `String` from anything `String: From` accepts; no argument gives an empty string.
#[macro_export]
macro_rules! s {
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Concatenate string slices into one owned `String`, left to right.
#[macro_export]
macro_rules! join {
    ($first:expr $(, $rest:expr)+ $(,)?) => {{
        let mut out = ::std::string::String::from($first);
        $( out.push_str($rest); )+
        out
    }};
}
