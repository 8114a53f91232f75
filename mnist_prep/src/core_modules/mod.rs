pub mod binarizer;
pub mod dataset;
pub mod flattener;
pub mod loader;
pub mod reader;
pub mod resizer;
pub mod serializer;
