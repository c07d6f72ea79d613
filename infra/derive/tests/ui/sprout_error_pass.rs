use sprout_derive::sprout_error;
use std::borrow::Cow;

#[sprout_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<Vec<u8>, DemoError> {
    std::fs::read("missing.bin").context("reading fixture")
}

fn main() {
    let _ = read();
    let _: DemoError = "boom".into();
}
