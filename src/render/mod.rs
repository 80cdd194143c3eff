pub mod markup;
pub mod office;
pub mod pdf;
pub mod spreadsheet;
pub mod template;
