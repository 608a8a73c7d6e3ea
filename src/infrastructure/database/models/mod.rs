pub mod page_model;

pub use page_model::{NewPageModel, PageModel};
