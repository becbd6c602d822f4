pub use crate::core::{
    config::{Commands, Config},
    error::{Error, NlResult},
    filename::{nl_filename, nl_filename_for_address, nl_filename_for_bank},
    image::{Address, Image, ImageInfo, ImageSize},
    page::Page,
    symbols::{Bank, Offset, Symbol, RAM_BANK, REGISTER_BANK},
    table::Table,
};
