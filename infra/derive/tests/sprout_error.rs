use sprout_derive::sprout_error;
use std::borrow::Cow;

#[sprout_error]
pub enum ProbeError {
    #[error("I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Rejected{}: {message}", format_context(.context))]
    Rejected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal probe error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn not_found() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::NotFound, "gone")
}

#[test]
fn sprout_error_ui() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/sprout_error_pass.rs");
}

#[test]
fn context_wraps_source_errors() {
    let res: Result<(), std::io::Error> = Err(not_found());
    let err = res.context("loading registry").unwrap_err();

    assert!(matches!(err, ProbeError::Io { context: Some(ref c), .. } if c == "loading registry"));
    assert_eq!(err.to_string(), "I/O failure (loading registry): gone");
}

#[test]
fn context_overrides_existing_error() {
    let res: Result<(), ProbeError> =
        Err(ProbeError::Rejected { message: "nope".into(), context: None });
    let err = res.context("validating input").unwrap_err();

    assert_eq!(err.to_string(), "Rejected (validating input): nope");
}

#[test]
fn question_mark_converts_source() {
    fn inner() -> Result<(), ProbeError> {
        Err(not_found())?;
        Ok(())
    }

    let err = inner().unwrap_err();
    assert!(matches!(err, ProbeError::Io { context: None, .. }));
    assert_eq!(err.to_string(), "I/O failure: gone");
}

#[test]
fn strings_convert_into_internal() {
    let borrowed: ProbeError = "static fault".into();
    let owned: ProbeError = String::from("owned fault").into();

    assert_eq!(borrowed.to_string(), "Internal probe error: static fault");
    assert_eq!(owned.to_string(), "Internal probe error: owned fault");
}
