#[cfg(not(any(feature = "cli")))]
fn main() {}

#[cfg(feature = "cli")]
fn main() -> nlsym::prelude::NlResult<()> {
    nlsym::cli::init(&nlsym::prelude::Config::new())
}
