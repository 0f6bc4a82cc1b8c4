#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a `Vec<String>` from string literals.
#[macro_export]
macro_rules! tokens {
    ($($word:expr),* $(,)?) => {
        vec![ $(::std::string::String::from($word)),* ]
    };
}
